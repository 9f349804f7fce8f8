//! The per-frame shell state: service handles, the view registry, and the
//! headless frame phases (deferred drain, shortcut routing).

use tracing::debug;

use crate::event::{DeferredQueue, EventManager};
use crate::recent::RecentFiles;
use crate::settings::SettingsStore;
use crate::shortcut::ShortcutSlot;
use crate::view::ViewRegistry;

/// Cheap-clone bundle of the handles a view (or plugin code) gets while
/// drawing. All single-owner state; the handles just share it.
#[derive(Clone)]
pub struct ShellServices {
    pub events: EventManager,
    pub settings: SettingsStore,
    pub deferred: DeferredQueue,
    pub recent: RecentFiles,
}

/// What a plugin sees during initialization: enough to register views and
/// settings, nothing more.
pub struct ShellRegistrar<'a> {
    pub views: &'a mut ViewRegistry,
    pub events: &'a EventManager,
    pub settings: &'a SettingsStore,
    pub deferred: &'a DeferredQueue,
}

/// Everything the orchestrator owns between frames, minus the rendering
/// backend. Constructed once at startup; torn down once at shutdown.
pub struct Shell {
    pub services: ShellServices,
    pub views: ViewRegistry,
    pub shortcut: ShortcutSlot,
    /// Global UI scale, computed once at startup and applied uniformly to
    /// window size and per-view size constraints. Never re-derived.
    pub ui_scale: f32,
}

impl Shell {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            services: ShellServices {
                events: EventManager::new(),
                settings,
                deferred: DeferredQueue::new(),
                recent: RecentFiles::new(),
            },
            views: ViewRegistry::new(),
            shortcut: ShortcutSlot::default(),
            ui_scale: 1.0,
        }
    }

    pub fn events(&self) -> &EventManager {
        &self.services.events
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.services.settings
    }

    pub fn recent(&self) -> &RecentFiles {
        &self.services.recent
    }

    pub fn deferred(&self) -> &DeferredQueue {
        &self.services.deferred
    }

    pub fn registrar(&mut self) -> ShellRegistrar<'_> {
        ShellRegistrar {
            views: &mut self.views,
            events: &self.services.events,
            settings: &self.services.settings,
            deferred: &self.services.deferred,
        }
    }

    /// Drain and execute the deferred-call queue, FIFO. Calls enqueued
    /// while draining run next frame. Runs once at the start of every
    /// frame.
    pub fn run_deferred(&mut self) {
        for call in self.services.deferred.take() {
            call(self);
        }
    }

    /// Offer the pending chord to every open view in registry order; the
    /// first view that claims it consumes it. The slot is empty afterwards
    /// whether or not anyone claimed. Returns true when a view claimed.
    pub fn route_shortcut(&mut self) -> bool {
        let Some(chord) = self.shortcut.take() else {
            return false;
        };
        for view in self.views.entries_mut() {
            if view.is_open() && view.handle_shortcut(chord) {
                return true;
            }
        }
        false
    }

    /// Whether any view is both available and open (otherwise the welcome
    /// surface shows).
    pub fn any_view_active(&self) -> bool {
        self.views
            .entries()
            .any(|view| view.is_open() && view.is_available())
    }

    /// Open the view with the given display name, if one exists.
    pub fn open_view_by_name(&mut self, name: &str) -> bool {
        for view in self.views.entries_mut() {
            if view.name() == name {
                view.set_open(true);
                return true;
            }
        }
        debug!(name, "no view claims this window request");
        false
    }
}
