//! View-visibility ledger: a `[Views]` section inside the generic
//! line-oriented layout file, one `<ViewName>=<0|1>` line per registered
//! view.
//!
//! Separate from the settings store by design. Unknown view names read
//! back from disk are skipped, so the file stays forward compatible with
//! removed views.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::view::ViewRegistry;

/// File name of the layout file inside the config directory.
pub const LAYOUT_FILE: &str = "layout.ini";
const SECTION_HEADER: &str = "[Views]";

/// Default ledger location inside the config dir.
pub fn layout_path() -> Result<std::path::PathBuf> {
    Ok(crate::settings::config_dir()?.join(LAYOUT_FILE))
}

/// Parse the `[Views]` section out of a layout file's contents. Malformed
/// lines are skipped.
pub fn read_view_states(contents: &str) -> Vec<(String, bool)> {
    let mut states = Vec::new();
    let mut in_section = false;
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_section = trimmed == SECTION_HEADER;
            continue;
        }
        if !in_section || trimmed.is_empty() {
            continue;
        }
        let Some((name, flag)) = trimmed.rsplit_once('=') else {
            continue;
        };
        let open = match flag {
            "0" => false,
            "1" => true,
            _ => continue,
        };
        states.push((name.to_string(), open));
    }
    states
}

/// Apply recorded open/closed flags to the registry. Views absent from the
/// record keep their built-in initial state; recorded names no view claims
/// are ignored.
pub fn apply_view_states(contents: &str, registry: &mut ViewRegistry) {
    for (name, open) in read_view_states(contents) {
        for view in registry.entries_mut() {
            if view.name() == name {
                view.set_open(open);
            }
        }
    }
}

/// Rewrite the `[Views]` section for the given registry (registry order,
/// one line per view), preserving every other line of the file.
pub fn write_view_states(existing: &str, registry: &ViewRegistry) -> String {
    let mut section = String::from(SECTION_HEADER);
    section.push('\n');
    for view in registry.entries() {
        section.push_str(view.name());
        section.push('=');
        section.push(if view.is_open() { '1' } else { '0' });
        section.push('\n');
    }

    let mut out = String::new();
    let mut in_section = false;
    let mut replaced = false;
    for line in existing.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            if trimmed == SECTION_HEADER {
                in_section = true;
                replaced = true;
                out.push_str(&section);
                continue;
            }
            in_section = false;
        }
        if !in_section {
            out.push_str(line);
            out.push('\n');
        }
    }
    if !replaced {
        out.push_str(&section);
    }
    out
}

/// Load the ledger file and apply it. Missing or unreadable files mean
/// "keep defaults".
pub fn load_ledger(path: &Path, registry: &mut ViewRegistry) {
    match fs::read_to_string(path) {
        Ok(contents) => apply_view_states(&contents, registry),
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no layout file; keeping default view states");
        }
    }
}

/// Rewrite the ledger section of the file on disk.
pub fn store_ledger(path: &Path, registry: &ViewRegistry) -> Result<()> {
    let existing = fs::read_to_string(path).unwrap_or_default();
    let updated = write_view_states(&existing, registry);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create layout directory")?;
    }
    fs::write(path, updated).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
