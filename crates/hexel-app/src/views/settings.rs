//! The settings window. Opened via the welcome surface or an
//! `OpenWindowRequest`, never listed in the view menu.

use eframe::egui::{Ui, Vec2};
use hexel_shell::{EventKind, EventPayload, ShellServices, View};

pub struct SettingsView {
    open: bool,
}

impl SettingsView {
    pub fn new() -> Self {
        Self { open: false }
    }
}

impl View for SettingsView {
    fn name(&self) -> &str {
        "Settings"
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    fn min_size(&self) -> Vec2 {
        Vec2::new(420.0, 320.0)
    }

    fn draw(&mut self, ui: &mut Ui, services: &ShellServices) {
        if services.settings.draw_entries(ui) {
            services
                .events
                .post(EventKind::SettingsChanged, EventPayload::None);
        }
    }

    fn show_in_view_menu(&self) -> bool {
        false
    }
}
