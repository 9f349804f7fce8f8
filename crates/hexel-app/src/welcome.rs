//! The welcome surface shown while no view is active.

use eframe::egui::{RichText, Ui};
use hexel_shell::{EventKind, EventPayload, ShellServices};

pub const DOCS_URL: &str = "https://github.com/hexel-studio/hexel/wiki";
pub const ISSUES_URL: &str = "https://github.com/hexel-studio/hexel/issues";
const RELEASES_URL: &str = "https://github.com/hexel-studio/hexel/releases";
const PLUGIN_GUIDE_URL: &str = "https://github.com/hexel-studio/hexel/wiki/Plugin-Development";

pub fn draw(ui: &mut Ui, services: &ShellServices) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui| {
        ui.heading(RichText::new("Welcome to Hexel Studio").strong().size(28.0));
    });
    ui.add_space(24.0);

    ui.columns(2, |columns| {
        draw_start_column(&mut columns[0], services);
        draw_customize_column(&mut columns[1], services);
    });
}

fn draw_start_column(ui: &mut Ui, services: &ShellServices) {
    ui.label(RichText::new("Start").strong());
    if ui.link("Open File…").clicked() {
        services.events.post(
            EventKind::OpenWindowRequest,
            EventPayload::Window("Open File".into()),
        );
    }
    if ui.link("Open Project…").clicked() {
        services.events.post(
            EventKind::OpenWindowRequest,
            EventPayload::Window("Open Project".into()),
        );
    }

    ui.add_space(16.0);
    ui.label(RichText::new("Recent").strong());
    if services.recent.is_empty() {
        ui.weak("Nothing opened yet");
    }
    for path in services.recent.entries() {
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let response = ui.link(label).on_hover_text(path.display().to_string());
        if response.clicked() {
            services
                .events
                .post(EventKind::FileDropped, EventPayload::Path(path.clone()));
            // The click may reorder the list; stop iterating the stale copy.
            break;
        }
    }

    ui.add_space(16.0);
    ui.label(RichText::new("Help").strong());
    ui.hyperlink_to("Documentation", DOCS_URL);
    ui.hyperlink_to("Report an issue", ISSUES_URL);
}

fn draw_customize_column(ui: &mut Ui, services: &ShellServices) {
    ui.label(RichText::new("Customize").strong());
    if ui.link("Settings").clicked() {
        services.events.post(
            EventKind::OpenWindowRequest,
            EventPayload::Window("Settings".into()),
        );
    }
    ui.weak("Change the preferences of Hexel Studio");

    ui.add_space(16.0);
    ui.label(RichText::new("Learn").strong());
    ui.hyperlink_to("Latest release notes", RELEASES_URL);
    ui.hyperlink_to("Writing plugins", PLUGIN_GUIDE_URL);
}
