//! The application window: owns the shell, the plugin handler, and the
//! per-frame orchestration.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use eframe::egui::{self, Context, ViewportCommand};
use serde_json::json;
use tracing::{debug, info, warn};

use hexel_plugin_host::{default_plugin_dir, PluginHandler};
use hexel_shell::{
    layout, EventKind, EventPayload, KeyChord, OwnerToken, Shell, SettingsStore, SETTINGS_FILE,
};

use crate::views::{FileInfoView, SettingsView};
use crate::welcome;
use crate::Cli;

const COLOR_THEMES: [&str; 2] = ["Dark", "Light"];

pub struct ShellWindow {
    // Field order is drop order: the shell (and with it every
    // plugin-registered view, settings callback, and subscription) must be
    // gone before the plugin libraries unmap.
    shell: Shell,
    plugins: PluginHandler,
    owner: OwnerToken,
    layout_path: PathBuf,
    close_requested: Rc<Cell<bool>>,
    fps_visible: bool,
    frame_stats: FrameStats,
}

impl ShellWindow {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        args: Cli,
        config_dir: PathBuf,
        ui_scale: f32,
    ) -> Self {
        let settings = SettingsStore::new(config_dir.join(SETTINGS_FILE));
        let mut shell = Shell::new(settings);
        shell.ui_scale = ui_scale;

        let owner = OwnerToken::next();
        let close_requested = Rc::new(Cell::new(false));
        let current_file: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));

        register_interface_settings(&shell);
        shell.views.register(Box::new(SettingsView::new()));
        shell
            .views
            .register(Box::new(FileInfoView::new(Rc::clone(&current_file))));

        // Event wiring, all under this window's owner token.
        {
            let ctx = cc.egui_ctx.clone();
            let settings = shell.settings().clone();
            shell
                .events()
                .subscribe(EventKind::SettingsChanged, owner, move |_| {
                    apply_theme(&ctx, &settings);
                    None
                });
        }
        {
            let recent = shell.recent().clone();
            let settings = shell.settings().clone();
            let current = Rc::clone(&current_file);
            shell
                .events()
                .subscribe(EventKind::FileLoaded, owner, move |payload| {
                    if let Some(path) = payload.path() {
                        recent.touch(path);
                        recent.sync_to(&settings);
                        *current.borrow_mut() = Some(path.to_path_buf());
                    }
                    None
                });
        }
        {
            // No domain view owns file loading in the bare shell, so a
            // dropped file becomes a loaded file directly.
            let events = shell.events().clone();
            shell
                .events()
                .subscribe(EventKind::FileDropped, owner, move |payload| {
                    if let Some(path) = payload.path() {
                        events.post(EventKind::FileLoaded, EventPayload::Path(path.to_path_buf()));
                    }
                    None
                });
        }
        {
            let flag = Rc::clone(&close_requested);
            shell
                .events()
                .subscribe(EventKind::CloseApplication, owner, move |_| {
                    flag.set(true);
                    None
                });
        }
        {
            let deferred = shell.deferred().clone();
            shell
                .events()
                .subscribe(EventKind::OpenWindowRequest, owner, move |payload| {
                    if let Some(name) = payload.window() {
                        let name = name.to_string();
                        deferred.defer(move |shell| {
                            shell.open_view_by_name(&name);
                        });
                    }
                    None
                });
        }

        // Plugins contribute their views and settings before the store is
        // loaded, so persisted values win over plugin defaults too.
        let mut plugins = PluginHandler::new();
        if !args.no_plugins {
            match args.plugins_dir.clone().or_else(default_plugin_dir) {
                Some(dir) => {
                    if let Err(err) = plugins.load(&dir) {
                        warn!(error = %err, "plugin loading skipped");
                    }
                    let mut registrar = shell.registrar();
                    plugins.initialize_all(&mut registrar);
                }
                None => debug!("no plugin directory resolved"),
            }
        }

        shell.settings().load();
        shell
            .events()
            .post(EventKind::SettingsChanged, EventPayload::None);
        let recent = shell.recent().clone();
        recent.load_from(shell.settings());

        let layout_path = config_dir.join(layout::LAYOUT_FILE);
        layout::load_ledger(&layout_path, &mut shell.views);

        for file in &args.files {
            shell
                .events()
                .post(EventKind::FileDropped, EventPayload::Path(file.clone()));
        }

        info!(
            views = shell.views.len(),
            plugins = plugins.len(),
            "shell initialized"
        );

        Self {
            shell,
            plugins,
            owner,
            layout_path,
            close_requested,
            fps_visible: false,
            frame_stats: FrameStats::new(),
        }
    }

    fn poll_input(&mut self, ctx: &Context) {
        let (chord, dropped, closing) = ctx.input(|input| {
            let mut chord = None;
            for event in &input.raw.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    modifiers,
                    ..
                } = event
                {
                    chord = Some(KeyChord::new(*key, *modifiers));
                }
            }
            // Only a single dropped file is meaningful to the shell.
            let dropped = match input.raw.dropped_files.as_slice() {
                [file] => file.path.clone(),
                _ => None,
            };
            (chord, dropped, input.viewport().close_requested())
        });

        if let Some(chord) = chord {
            // Ctrl+Comma belongs to the shell itself; everything else is
            // offered to the views.
            if chord.matches(egui::Key::Comma, egui::Modifiers::CTRL) {
                self.shell.events().post(
                    EventKind::OpenWindowRequest,
                    EventPayload::Window("Settings".into()),
                );
            } else {
                self.shell.shortcut.record(chord);
            }
        }
        if let Some(path) = dropped {
            self.shell
                .events()
                .post(EventKind::FileDropped, EventPayload::Path(path));
        }
        if closing {
            self.shell
                .events()
                .post(EventKind::WindowClosing, EventPayload::None);
        }
    }

    fn draw_menu_bar(&mut self, ctx: &Context) {
        let fps = self.frame_stats.fps();
        let fps_visible = &mut self.fps_visible;
        let Shell {
            views, services, ..
        } = &mut self.shell;

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open File…").clicked() {
                        services.events.post(
                            EventKind::OpenWindowRequest,
                            EventPayload::Window("Open File".into()),
                        );
                        ui.close_menu();
                    }
                    if ui.button("Open Project…").clicked() {
                        services.events.post(
                            EventKind::OpenWindowRequest,
                            EventPayload::Window("Open Project".into()),
                        );
                        ui.close_menu();
                    }
                    ui.menu_button("Open Recent", |ui| {
                        if services.recent.is_empty() {
                            ui.weak("No recent files");
                        }
                        for path in services.recent.entries() {
                            let label = path
                                .file_name()
                                .map(|name| name.to_string_lossy().into_owned())
                                .unwrap_or_else(|| path.display().to_string());
                            let response =
                                ui.button(label).on_hover_text(path.display().to_string());
                            if response.clicked() {
                                services
                                    .events
                                    .post(EventKind::FileDropped, EventPayload::Path(path.clone()));
                                ui.close_menu();
                                break;
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Quit").clicked() {
                        services
                            .events
                            .post(EventKind::CloseApplication, EventPayload::None);
                        ui.close_menu();
                    }
                });

                ui.menu_button("View", |ui| {
                    for view in views.entries_mut() {
                        if !view.show_in_view_menu() {
                            continue;
                        }
                        let mut open = view.is_open();
                        if ui.checkbox(&mut open, view.name()).changed() {
                            view.set_open(open);
                        }
                    }
                    ui.separator();
                    ui.checkbox(fps_visible, "Display FPS");
                });

                for view in views.entries_mut() {
                    view.draw_menu(ui, services);
                }

                ui.menu_button("Help", |ui| {
                    if ui.button("Documentation").clicked() {
                        ui.ctx().open_url(egui::OpenUrl::new_tab(welcome::DOCS_URL));
                        ui.close_menu();
                    }
                    if ui.button("Report an issue").clicked() {
                        ui.ctx()
                            .open_url(egui::OpenUrl::new_tab(welcome::ISSUES_URL));
                        ui.close_menu();
                    }
                });

                if *fps_visible {
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("{fps:.0} FPS"));
                    });
                }
            });
        });
    }

    fn draw_views(&mut self, ctx: &Context) {
        let ui_scale = self.shell.ui_scale;
        let Shell {
            views, services, ..
        } = &mut self.shell;

        for view in views.entries_mut() {
            if !view.is_available() || !view.is_open() {
                continue;
            }
            let min = view.min_size() * ui_scale;
            let max = view.max_size() * ui_scale;
            let mut open = true;
            egui::Window::new(view.name())
                .open(&mut open)
                .resize(|resize| resize.min_size(min).max_size(max))
                .show(ctx, |ui| view.draw(ui, services));
            if !open {
                view.set_open(false);
            }
        }
    }
}

impl eframe::App for ShellWindow {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.frame_stats.tick();

        self.poll_input(ctx);
        self.shell.run_deferred();

        // Panels claim screen space before floating windows.
        self.draw_menu_bar(ctx);
        self.draw_views(ctx);

        // Offer the pending chord after views have drawn, once per frame.
        self.shell.route_shortcut();

        let any_active = self.shell.any_view_active();
        egui::CentralPanel::default().show(ctx, |ui| {
            if !any_active {
                welcome::draw(ui, &self.shell.services);
            }
        });

        if self.close_requested.get() {
            ctx.send_viewport_cmd(ViewportCommand::Close);
        }

        ctx.request_repaint();
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        // Teardown in strict reverse order of construction. The plugin
        // libraries are not unloaded here: the settings store and event bus
        // still hold plugin-registered closures until the window is dropped,
        // and the struct's field order unmaps the libraries after them. The
        // windowing backend itself is eframe's to tear down after this
        // returns.
        if let Err(err) = self.shell.settings().store() {
            warn!(error = %err, "failed to persist settings");
        }
        if let Err(err) = layout::store_ledger(&self.layout_path, &self.shell.views) {
            warn!(error = %err, "failed to persist the view layout");
        }
        self.shell.views.clear_and_destroy();
        self.shell.events().unsubscribe_all(self.owner);
    }
}

fn register_interface_settings(shell: &Shell) {
    shell
        .settings()
        .add("Interface", "Color theme", json!(0), |ui, value| {
            let mut selection = value.as_u64().unwrap_or(0) as usize;
            selection = selection.min(COLOR_THEMES.len() - 1);
            let mut changed = false;
            egui::ComboBox::from_id_source("interface_color_theme")
                .selected_text(COLOR_THEMES[selection])
                .show_ui(ui, |ui| {
                    for (index, label) in COLOR_THEMES.iter().enumerate() {
                        changed |= ui.selectable_value(&mut selection, index, *label).changed();
                    }
                });
            if changed {
                *value = json!(selection);
            }
            changed
        });

    shell
        .settings()
        .add("Interface", "UI scale", json!(1.0), |ui, value| {
            let mut scale = value.as_f64().unwrap_or(1.0) as f32;
            let changed = ui
                .add(egui::Slider::new(&mut scale, 0.5..=2.0).text("takes effect at next launch"))
                .changed();
            if changed {
                *value = json!(scale);
            }
            changed
        });
}

fn apply_theme(ctx: &Context, settings: &SettingsStore) {
    let selection = settings.read("Interface", "Color theme").as_u64();
    let visuals = match selection {
        Some(1) => egui::Visuals::light(),
        _ => egui::Visuals::dark(),
    };
    ctx.set_visuals(visuals);
}

/// Exponentially-smoothed frames-per-second counter for the menu bar.
struct FrameStats {
    last: Instant,
    fps: f32,
}

impl FrameStats {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        let now = Instant::now();
        let delta = (now - self.last).as_secs_f32().max(1e-6);
        self.last = now;
        let instantaneous = 1.0 / delta;
        self.fps = if self.fps == 0.0 {
            instantaneous
        } else {
            self.fps * 0.9 + instantaneous * 0.1
        };
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
