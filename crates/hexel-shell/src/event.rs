//! Publish/subscribe event bus and the deferred-call queue.
//!
//! Both live on the single UI thread; the bus asserts that, the deferred
//! queue is the one structure other threads are allowed to touch.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::shell::Shell;

/// The closed set of notifications the shell can broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    SettingsChanged,
    FileLoaded,
    FileDropped,
    WindowClosing,
    CloseApplication,
    OpenWindowRequest,
}

/// Payload shapes actually carried by events, as a closed union.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum EventPayload {
    #[default]
    None,
    Path(PathBuf),
    Window(String),
}

impl EventPayload {
    pub fn path(&self) -> Option<&Path> {
        match self {
            EventPayload::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn window(&self) -> Option<&str> {
        match self {
            EventPayload::Window(name) => Some(name),
            _ => None,
        }
    }
}

/// Opaque identity used only for bulk unsubscription. Never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OwnerToken(u64);

impl OwnerToken {
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        OwnerToken(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type Handler = Rc<RefCell<dyn FnMut(&EventPayload) -> Option<EventPayload>>>;

struct Subscription {
    kind: EventKind,
    owner: OwnerToken,
    handler: Handler,
}

struct EventManagerInner {
    ui_thread: ThreadId,
    subscriptions: RefCell<Vec<Subscription>>,
}

/// Synchronous pub/sub bus. Cheap to clone; clones share the subscriber
/// list.
///
/// Dispatch policy: `post` snapshots the matching subscribers before
/// delivering, so a handler that unsubscribes itself still finishes the
/// current pass, and a handler that posts recursively runs the nested
/// dispatch depth-first against a fresh snapshot. Panics in handlers are
/// not caught.
#[derive(Clone)]
pub struct EventManager {
    inner: Rc<EventManagerInner>,
}

impl Default for EventManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EventManager {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(EventManagerInner {
                ui_thread: thread::current().id(),
                subscriptions: RefCell::new(Vec::new()),
            }),
        }
    }

    fn assert_ui_thread(&self) {
        let current = thread::current().id();
        assert_eq!(
            current, self.inner.ui_thread,
            "event bus accessed from a non-UI thread"
        );
    }

    pub fn subscribe<F>(&self, kind: EventKind, owner: OwnerToken, handler: F)
    where
        F: FnMut(&EventPayload) -> Option<EventPayload> + 'static,
    {
        self.assert_ui_thread();
        self.inner.subscriptions.borrow_mut().push(Subscription {
            kind,
            owner,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    /// Remove every handler `owner` registered for `kind`.
    pub fn unsubscribe(&self, kind: EventKind, owner: OwnerToken) {
        self.assert_ui_thread();
        self.inner
            .subscriptions
            .borrow_mut()
            .retain(|sub| !(sub.kind == kind && sub.owner == owner));
    }

    /// Remove every handler registered under `owner`, regardless of kind.
    pub fn unsubscribe_all(&self, owner: OwnerToken) {
        self.assert_ui_thread();
        self.inner
            .subscriptions
            .borrow_mut()
            .retain(|sub| sub.owner != owner);
    }

    /// Deliver `payload` to every current subscriber of `kind`, in
    /// subscription order, on the calling thread. Returns the `Some`
    /// responses in delivery order.
    pub fn post(&self, kind: EventKind, payload: EventPayload) -> Vec<EventPayload> {
        self.assert_ui_thread();
        let snapshot: Vec<Handler> = self
            .inner
            .subscriptions
            .borrow()
            .iter()
            .filter(|sub| sub.kind == kind)
            .map(|sub| Rc::clone(&sub.handler))
            .collect();

        let mut responses = Vec::new();
        for handler in snapshot {
            if let Some(response) = (handler.borrow_mut())(&payload) {
                responses.push(response);
            }
        }
        responses
    }
}

/// A zero-argument action queued for the start of the next frame.
pub type DeferredCall = Box<dyn FnOnce(&mut Shell) + Send + 'static>;

/// Append-only queue of deferred calls, drained by the orchestrator once
/// per frame. The one sanctioned way to schedule a UI-thread mutation from
/// outside the draw pass, so it is the one lock in the shell.
#[derive(Clone, Default)]
pub struct DeferredQueue {
    inner: Arc<Mutex<Vec<DeferredCall>>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defer<F>(&self, call: F)
    where
        F: FnOnce(&mut Shell) + Send + 'static,
    {
        self.inner.lock().push(Box::new(call));
    }

    /// Take the whole queue, leaving it empty. Calls enqueued after this
    /// point (including from the taken calls themselves) land in the next
    /// frame's batch.
    pub(crate) fn take(&self) -> Vec<DeferredCall> {
        std::mem::take(&mut *self.inner.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    fn log_handler(
        log: &Rc<RefCell<Vec<&'static str>>>,
        tag: &'static str,
    ) -> impl FnMut(&EventPayload) -> Option<EventPayload> + 'static {
        let log = Rc::clone(log);
        move |_| {
            log.borrow_mut().push(tag);
            None
        }
    }

    #[test]
    fn post_invokes_subscribers_in_subscription_order() {
        let events = EventManager::new();
        let owner = OwnerToken::next();
        let log = Rc::new(RefCell::new(Vec::new()));

        events.subscribe(EventKind::FileLoaded, owner, log_handler(&log, "first"));
        events.subscribe(EventKind::FileLoaded, owner, log_handler(&log, "second"));
        events.subscribe(EventKind::FileDropped, owner, log_handler(&log, "other"));

        events.post(EventKind::FileLoaded, EventPayload::None);
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn handlers_receive_the_posted_payload() {
        let events = EventManager::new();
        let owner = OwnerToken::next();
        let seen = Rc::new(RefCell::new(None));
        let seen_in = Rc::clone(&seen);

        events.subscribe(EventKind::FileDropped, owner, move |payload| {
            *seen_in.borrow_mut() = payload.path().map(|p| p.to_path_buf());
            None
        });

        events.post(
            EventKind::FileDropped,
            EventPayload::Path("/tmp/dump.bin".into()),
        );
        assert_eq!(seen.borrow().as_deref(), Some("/tmp/dump.bin".as_ref()));
    }

    #[test]
    fn responses_come_back_in_delivery_order() {
        let events = EventManager::new();
        let owner = OwnerToken::next();

        events.subscribe(EventKind::OpenWindowRequest, owner, |_| None);
        events.subscribe(EventKind::OpenWindowRequest, owner, |_| {
            Some(EventPayload::Window("a".into()))
        });
        events.subscribe(EventKind::OpenWindowRequest, owner, |_| {
            Some(EventPayload::Window("b".into()))
        });

        let responses = events.post(EventKind::OpenWindowRequest, EventPayload::None);
        assert_eq!(
            responses,
            vec![
                EventPayload::Window("a".into()),
                EventPayload::Window("b".into())
            ]
        );
    }

    #[test]
    fn unsubscribe_removes_only_that_kind() {
        let events = EventManager::new();
        let owner = OwnerToken::next();
        let log = Rc::new(RefCell::new(Vec::new()));

        events.subscribe(EventKind::FileLoaded, owner, log_handler(&log, "loaded"));
        events.subscribe(EventKind::FileDropped, owner, log_handler(&log, "dropped"));
        events.unsubscribe(EventKind::FileLoaded, owner);

        events.post(EventKind::FileLoaded, EventPayload::None);
        events.post(EventKind::FileDropped, EventPayload::None);
        assert_eq!(*log.borrow(), vec!["dropped"]);
    }

    #[test]
    fn unsubscribe_all_removes_that_owner_and_no_others() {
        let events = EventManager::new();
        let gone = OwnerToken::next();
        let kept = OwnerToken::next();
        let log = Rc::new(RefCell::new(Vec::new()));

        events.subscribe(EventKind::FileLoaded, gone, log_handler(&log, "gone-a"));
        events.subscribe(EventKind::SettingsChanged, gone, log_handler(&log, "gone-b"));
        events.subscribe(EventKind::FileLoaded, kept, log_handler(&log, "kept"));

        events.unsubscribe_all(gone);

        events.post(EventKind::FileLoaded, EventPayload::None);
        events.post(EventKind::SettingsChanged, EventPayload::None);
        assert_eq!(*log.borrow(), vec!["kept"]);
    }

    #[test]
    fn self_unsubscribe_still_finishes_the_current_pass() {
        let events = EventManager::new();
        let owner = OwnerToken::next();
        let log = Rc::new(RefCell::new(Vec::new()));

        let bus = events.clone();
        let log_in = Rc::clone(&log);
        events.subscribe(EventKind::FileLoaded, owner, move |_| {
            log_in.borrow_mut().push("self");
            bus.unsubscribe_all(owner);
            None
        });
        events.subscribe(EventKind::FileLoaded, owner, log_handler(&log, "after"));

        events.post(EventKind::FileLoaded, EventPayload::None);
        assert_eq!(*log.borrow(), vec!["self", "after"]);

        log.borrow_mut().clear();
        events.post(EventKind::FileLoaded, EventPayload::None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn nested_post_runs_depth_first() {
        let events = EventManager::new();
        let owner = OwnerToken::next();
        let log = Rc::new(RefCell::new(Vec::new()));

        let bus = events.clone();
        let log_in = Rc::clone(&log);
        events.subscribe(EventKind::FileDropped, owner, move |payload| {
            log_in.borrow_mut().push("drop-begin");
            bus.post(EventKind::FileLoaded, payload.clone());
            log_in.borrow_mut().push("drop-end");
            None
        });
        events.subscribe(EventKind::FileLoaded, owner, log_handler(&log, "loaded"));

        events.post(EventKind::FileDropped, EventPayload::None);
        assert_eq!(*log.borrow(), vec!["drop-begin", "loaded", "drop-end"]);
    }

    #[test]
    fn deferred_queue_take_leaves_it_empty() {
        let queue = DeferredQueue::new();
        queue.defer(|_| {});
        queue.defer(|_| {});
        assert!(!queue.is_empty());
        assert_eq!(queue.take().len(), 2);
        assert!(queue.is_empty());
    }
}
