//! Hexel Studio desktop entry point.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui::ViewportBuilder;
use eframe::NativeOptions;
use tracing_subscriber::EnvFilter;

mod views;
mod welcome;
mod window;

use window::ShellWindow;

#[derive(Debug, Parser)]
#[command(author, version, about = "Hexel Studio - extensible binary inspection shell")]
struct Cli {
    /// Files to open once the shell is up.
    files: Vec<PathBuf>,

    /// Directory scanned for plugin modules. Defaults to `plugins/` next to
    /// the executable.
    #[arg(long)]
    plugins_dir: Option<PathBuf>,

    /// Skip plugin loading entirely.
    #[arg(long)]
    no_plugins: bool,

    /// Directory holding `settings.json` and `layout.ini`. Defaults to the
    /// per-user config directory.
    #[arg(long)]
    settings_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Cli::parse();

    let config_dir = match &args.settings_dir {
        Some(dir) => dir.clone(),
        None => hexel_shell::config_dir().context("resolving the config directory")?,
    };
    let ui_scale = peek_ui_scale(&config_dir.join(hexel_shell::SETTINGS_FILE));

    let native_options = NativeOptions {
        viewport: ViewportBuilder::default()
            .with_title("Hexel Studio")
            .with_inner_size([1280.0 * ui_scale, 720.0 * ui_scale])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hexel Studio",
        native_options,
        Box::new(move |cc| Box::new(ShellWindow::new(cc, args, config_dir, ui_scale))),
    )
    .map_err(|err| anyhow!("windowing backend failed: {err}"))
}

/// Reads the UI scale ahead of window creation. The settings store proper is
/// loaded later, once every contributor has registered its entries, but the
/// native window size has to be decided before that.
fn peek_ui_scale(path: &Path) -> f32 {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return 1.0;
    };
    serde_json::from_str::<serde_json::Value>(&contents)
        .ok()
        .and_then(|values| values.get("Interface")?.get("UI scale")?.as_f64())
        .map(|scale| (scale as f32).clamp(0.5, 2.0))
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::peek_ui_scale;

    #[test]
    fn ui_scale_defaults_when_settings_are_missing_or_broken() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(peek_ui_scale(&path), 1.0);

        std::fs::write(&path, "not json").unwrap();
        assert_eq!(peek_ui_scale(&path), 1.0);
    }

    #[test]
    fn ui_scale_is_read_and_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, r#"{"Interface":{"UI scale":1.5}}"#).unwrap();
        assert_eq!(peek_ui_scale(&path), 1.5);

        std::fs::write(&path, r#"{"Interface":{"UI scale":9.0}}"#).unwrap();
        assert_eq!(peek_ui_scale(&path), 2.0);
    }
}
