//! Example Hexel plugin. Contributes a plain-text scratch pad view and a
//! settings entry. Build it and drop the resulting library into the
//! `plugins/` directory next to the `hexel` executable.

use egui::{Ui, Vec2};
use hexel_plugin_sdk::declare_hexel_plugin;
use hexel_shell::{ShellRegistrar, ShellServices, View};
use serde_json::json;

struct ScratchPadView {
    open: bool,
    text: String,
}

impl View for ScratchPadView {
    fn name(&self) -> &str {
        "Scratch Pad"
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    fn min_size(&self) -> Vec2 {
        Vec2::new(320.0, 240.0)
    }

    fn draw(&mut self, ui: &mut Ui, services: &ShellServices) {
        let wrap = services
            .settings
            .read("Scratch Pad", "Word wrap")
            .as_bool()
            .unwrap_or(true);
        let editor = egui::TextEdit::multiline(&mut self.text).desired_width(f32::INFINITY);
        let editor = if wrap {
            editor
        } else {
            editor.code_editor()
        };
        ui.add_sized(ui.available_size(), editor);
    }
}

fn setup(registrar: &mut ShellRegistrar<'_>) {
    registrar
        .settings
        .add("Scratch Pad", "Word wrap", json!(true), |ui, value| {
            let mut wrap = value.as_bool().unwrap_or(true);
            let changed = ui.checkbox(&mut wrap, "Wrap long lines").changed();
            if changed {
                *value = json!(wrap);
            }
            changed
        });
    registrar.views.register(Box::new(ScratchPadView {
        open: false,
        text: String::new(),
    }));
}

declare_hexel_plugin!("Scratch Pad", "A plain-text scratch pad view", setup);
