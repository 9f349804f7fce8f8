//! Persisted category/key/value settings store with per-setting UI
//! callbacks.

use std::cell::RefCell;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use egui::Ui;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

const APP_DIR_NAME: &str = "HexelStudio";

/// File name of the settings store inside the config directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Per-user configuration directory, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("config directory unavailable")?;
    let dir = base.join(APP_DIR_NAME);
    if !dir.exists() {
        fs::create_dir_all(&dir).context("create config directory")?;
    }
    Ok(dir)
}

/// Draws one setting and may mutate its value; returns true when it did.
/// Posting `SettingsChanged` afterwards is the caller's job, not the
/// store's.
pub type SettingRender = Box<dyn FnMut(&mut Ui, &mut Value) -> bool>;

struct SettingEntry {
    category: String,
    name: String,
    render: SettingRender,
}

struct StoreInner {
    path: PathBuf,
    values: IndexMap<String, IndexMap<String, Value>>,
    entries: Vec<SettingEntry>,
}

/// Cheap-clone handle to the settings store. Single-threaded; constructed
/// once at startup and handed to whoever needs it.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Rc<RefCell<StoreInner>>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                path,
                values: IndexMap::new(),
                entries: Vec::new(),
            })),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.inner.borrow().path.clone()
    }

    /// Register a setting with its UI callback. The default only takes
    /// effect when no value for the key exists yet, so values loaded from
    /// disk (or written by an earlier registration) win.
    pub fn add<F>(&self, category: &str, name: &str, default: Value, render: F)
    where
        F: FnMut(&mut Ui, &mut Value) -> bool + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        inner
            .values
            .entry(category.to_string())
            .or_default()
            .entry(name.to_string())
            .or_insert(default);
        inner.entries.push(SettingEntry {
            category: category.to_string(),
            name: name.to_string(),
            render: Box::new(render),
        });
    }

    /// Set a value with no associated UI callback (non-UI state such as the
    /// recent-files list).
    pub fn write(&self, category: &str, key: &str, value: Value) {
        self.inner
            .borrow_mut()
            .values
            .entry(category.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Read a value; `Value::Null` when absent.
    pub fn read(&self, category: &str, key: &str) -> Value {
        self.inner
            .borrow()
            .values
            .get(category)
            .and_then(|keys| keys.get(key))
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Merge the persisted file into the in-memory store. Loaded values win
    /// over registered defaults. A missing or malformed file means "use
    /// defaults" and never fails.
    pub fn load(&self) {
        let path = self.inner.borrow().path.clone();
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                debug!(path = %path.display(), error = %err, "no settings file; using defaults");
                return;
            }
        };
        let loaded: IndexMap<String, IndexMap<String, Value>> =
            match serde_json::from_str(&contents) {
                Ok(loaded) => loaded,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "malformed settings file; using defaults");
                    return;
                }
            };

        let mut inner = self.inner.borrow_mut();
        for (category, keys) in loaded {
            let target = inner.values.entry(category).or_default();
            for (key, value) in keys {
                target.insert(key, value);
            }
        }
    }

    /// Write the full store to its file.
    pub fn store(&self) -> Result<()> {
        let inner = self.inner.borrow();
        if let Some(parent) = inner.path.parent() {
            fs::create_dir_all(parent).context("create settings directory")?;
        }
        let json = serde_json::to_string_pretty(&inner.values)?;
        let mut file = fs::File::create(&inner.path)
            .with_context(|| format!("create {}", inner.path.display()))?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Invoke every registered render callback once, grouped by category in
    /// registration order. Returns true when any callback reported a
    /// mutation. Callbacks may call back into the store; no borrow is held
    /// across an invocation.
    pub fn draw_entries(&self, ui: &mut Ui) -> bool {
        let count = self.inner.borrow().entries.len();
        let mut changed_any = false;
        let mut last_category: Option<String> = None;

        for index in 0..count {
            let (category, name, mut render, mut value) = {
                let mut inner = self.inner.borrow_mut();
                let category = inner.entries[index].category.clone();
                let name = inner.entries[index].name.clone();
                let render = std::mem::replace(
                    &mut inner.entries[index].render,
                    Box::new(|_: &mut Ui, _: &mut Value| false) as SettingRender,
                );
                let value = inner
                    .values
                    .get(&category)
                    .and_then(|keys| keys.get(&name))
                    .cloned()
                    .unwrap_or(Value::Null);
                (category, name, render, value)
            };

            if last_category.as_deref() != Some(category.as_str()) {
                ui.heading(&category);
                last_category = Some(category.clone());
            }

            let changed = ui
                .horizontal(|ui| {
                    ui.label(&name);
                    render(ui, &mut value)
                })
                .inner;

            let mut inner = self.inner.borrow_mut();
            if changed {
                inner
                    .values
                    .entry(category)
                    .or_default()
                    .insert(name, value);
                changed_any = true;
            }
            inner.entries[index].render = render;
        }
        changed_any
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn read_absent_key_is_null() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        assert_eq!(store.read("Interface", "Color theme"), Value::Null);
    }

    #[test]
    fn write_then_read_round_trips_in_memory() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        store.write("Hexel", "RecentFiles", json!(["/tmp/a", "/tmp/b"]));
        assert_eq!(
            store.read("Hexel", "RecentFiles"),
            json!(["/tmp/a", "/tmp/b"])
        );
    }

    #[test]
    fn store_then_load_reproduces_every_pair() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let store = SettingsStore::new(path.clone());
        store.write("Interface", "Color theme", json!(1));
        store.write("Interface", "UI scale", json!(1.5));
        store.write("Hexel", "RecentFiles", json!(["/tmp/a"]));
        store.store().unwrap();

        let fresh = SettingsStore::new(path);
        fresh.load();
        assert_eq!(fresh.read("Interface", "Color theme"), json!(1));
        assert_eq!(fresh.read("Interface", "UI scale"), json!(1.5));
        assert_eq!(fresh.read("Hexel", "RecentFiles"), json!(["/tmp/a"]));
    }

    #[test]
    fn loaded_values_win_over_registered_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"Interface": {"Color theme": 1}}"#).unwrap();

        let store = SettingsStore::new(path);
        store.add("Interface", "Color theme", json!(0), |_, _| false);
        store.load();
        assert_eq!(store.read("Interface", "Color theme"), json!(1));
    }

    #[test]
    fn defaults_apply_when_file_is_missing_or_malformed() {
        let dir = tempfile::tempdir().unwrap();

        let missing = SettingsStore::new(dir.path().join("absent.json"));
        missing.add("Interface", "Color theme", json!(0), |_, _| false);
        missing.load();
        assert_eq!(missing.read("Interface", "Color theme"), json!(0));

        let garbled_path = dir.path().join("garbled.json");
        fs::write(&garbled_path, "not json at all").unwrap();
        let garbled = SettingsStore::new(garbled_path);
        garbled.add("Interface", "Color theme", json!(0), |_, _| false);
        garbled.load();
        assert_eq!(garbled.read("Interface", "Color theme"), json!(0));
    }

    #[test]
    fn draw_entries_runs_every_callback_and_records_mutations() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        let calls = Rc::new(RefCell::new(Vec::new()));

        let calls_one = Rc::clone(&calls);
        store.add("A", "one", json!(0), move |_, _| {
            calls_one.borrow_mut().push("one");
            false
        });
        // This callback reenters the store while its own entry is drawn.
        let calls_two = Rc::clone(&calls);
        let reentrant = store.clone();
        store.add("A", "two", json!(0), move |_, value| {
            calls_two.borrow_mut().push("two");
            assert_eq!(reentrant.read("A", "one"), json!(0));
            *value = json!(7);
            true
        });

        let ctx = egui::Context::default();
        let mut changed = false;
        ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                changed = store.draw_entries(ui);
            });
        });

        assert!(changed);
        assert_eq!(*calls.borrow(), vec!["one", "two"]);
        assert_eq!(store.read("A", "two"), json!(7));
    }

    #[test]
    fn unknown_categories_round_trip_unscathed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"SomePlugin": {"Knob": 42}}"#).unwrap();

        let store = SettingsStore::new(path.clone());
        store.load();
        store.store().unwrap();

        let fresh = SettingsStore::new(path);
        fresh.load();
        assert_eq!(fresh.read("SomePlugin", "Knob"), json!(42));
    }
}
