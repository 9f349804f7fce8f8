//! The pluggable-view trait and the ordered registry that owns views.

use egui::{Ui, Vec2};
use tracing::{trace, warn};

use crate::shell::ShellServices;
use crate::shortcut::KeyChord;

/// A self-contained unit of UI content managed by the shell.
///
/// Identity is the display name; it must be unique within the registry.
/// That is a caller invariant: duplicates are a configuration error the
/// registry only warns about.
pub trait View {
    /// Display name, also the window title and the ledger key.
    fn name(&self) -> &str;

    /// Whether the view can be shown at all right now (e.g. "a file is
    /// open"). Unavailable views are neither drawn nor offered shortcuts.
    fn is_available(&self) -> bool {
        true
    }

    fn is_open(&self) -> bool;

    fn set_open(&mut self, open: bool);

    /// Preferred minimum size in unscaled units; the orchestrator applies
    /// the global UI scale before handing it to the toolkit.
    fn min_size(&self) -> Vec2 {
        Vec2::new(480.0, 360.0)
    }

    fn max_size(&self) -> Vec2 {
        Vec2::INFINITY
    }

    /// Draw the view's content. The orchestrator has already opened a
    /// window with this view's size constraints.
    fn draw(&mut self, ui: &mut Ui, services: &ShellServices);

    /// Optional contribution to the menu bar, drawn every frame.
    fn draw_menu(&mut self, _ui: &mut Ui, _services: &ShellServices) {}

    /// Offered the current chord once per frame while open; return true to
    /// consume it.
    fn handle_shortcut(&mut self, _chord: KeyChord) -> bool {
        false
    }

    /// Whether the generic "toggle visibility" menu lists this view.
    fn show_in_view_menu(&self) -> bool {
        true
    }
}

/// Ordered collection of views. Insertion order is the draw and menu order.
#[derive(Default)]
pub struct ViewRegistry {
    views: Vec<Box<dyn View>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a view. Does not enforce name uniqueness.
    pub fn register(&mut self, view: Box<dyn View>) {
        if self.views.iter().any(|v| v.name() == view.name()) {
            warn!(name = view.name(), "duplicate view name registered");
        }
        trace!(name = view.name(), "view registered");
        self.views.push(view);
    }

    pub fn entries(&self) -> impl Iterator<Item = &dyn View> {
        self.views.iter().map(|view| view.as_ref())
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn View>> {
        self.views.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Drop every view, in registry order.
    pub fn clear_and_destroy(&mut self) {
        for view in self.views.drain(..) {
            trace!(name = view.name(), "destroying view");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    /// Minimal view for registry and routing tests. Claimed shortcuts are
    /// appended to the shared `handled` log under this view's name.
    pub struct StubView {
        pub name: String,
        pub open: bool,
        pub available: bool,
        pub claims: Option<KeyChord>,
        pub handled: Rc<RefCell<Vec<String>>>,
    }

    impl StubView {
        pub fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                open: true,
                available: true,
                claims: None,
                handled: Rc::new(RefCell::new(Vec::new())),
            }
        }

        pub fn claiming(name: &str, chord: KeyChord, handled: &Rc<RefCell<Vec<String>>>) -> Self {
            let mut view = Self::new(name);
            view.claims = Some(chord);
            view.handled = Rc::clone(handled);
            view
        }
    }

    impl View for StubView {
        fn name(&self) -> &str {
            &self.name
        }

        fn is_available(&self) -> bool {
            self.available
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn set_open(&mut self, open: bool) {
            self.open = open;
        }

        fn draw(&mut self, _ui: &mut Ui, _services: &ShellServices) {}

        fn handle_shortcut(&mut self, chord: KeyChord) -> bool {
            if self.claims == Some(chord) {
                self.handled.borrow_mut().push(self.name.clone());
                true
            } else {
                false
            }
        }
    }
}
