//! Most-recently-used file list, mirrored into a reserved settings key.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;

use crate::settings::SettingsStore;

/// Reserved settings entry holding the recent-files list.
pub const RECENT_FILES_CATEGORY: &str = "Hexel";
pub const RECENT_FILES_KEY: &str = "RecentFiles";

const MAX_ENTRIES: usize = 5;

/// Cheap-clone handle to the MRU list: most recent first, deduplicated by
/// exact path equality, capped at [`MAX_ENTRIES`].
#[derive(Clone, Default)]
pub struct RecentFiles {
    entries: Rc<RefCell<Vec<PathBuf>>>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a use of `path`: moves it to the front, evicting the oldest
    /// entry past the cap.
    pub fn touch<P: AsRef<Path>>(&self, path: P) {
        let path = path.as_ref().to_path_buf();
        let mut entries = self.entries.borrow_mut();
        entries.retain(|entry| entry != &path);
        entries.insert(0, path);
        entries.truncate(MAX_ENTRIES);
    }

    pub fn entries(&self) -> Vec<PathBuf> {
        self.entries.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Mirror the list into the reserved settings key.
    pub fn sync_to(&self, settings: &SettingsStore) {
        let paths: Vec<Value> = self
            .entries
            .borrow()
            .iter()
            .map(|path| Value::String(path.to_string_lossy().into_owned()))
            .collect();
        settings.write(RECENT_FILES_CATEGORY, RECENT_FILES_KEY, Value::Array(paths));
    }

    /// Prime the list from the reserved settings key. Non-string entries
    /// are skipped.
    pub fn load_from(&self, settings: &SettingsStore) {
        let Value::Array(paths) = settings.read(RECENT_FILES_CATEGORY, RECENT_FILES_KEY) else {
            return;
        };
        let mut entries = self.entries.borrow_mut();
        entries.clear();
        entries.extend(
            paths
                .iter()
                .filter_map(|value| value.as_str())
                .take(MAX_ENTRIES)
                .map(PathBuf::from),
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn paths(recents: &RecentFiles) -> Vec<String> {
        recents
            .entries()
            .iter()
            .map(|path| path.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn dedup_keeps_most_recent_position() {
        let recents = RecentFiles::new();
        for name in ["a", "b", "a"] {
            recents.touch(name);
        }
        assert_eq!(paths(&recents), vec!["a", "b"]);
    }

    #[test]
    fn long_sequence_yields_capped_mru_prefix() {
        let recents = RecentFiles::new();
        for name in ["a", "b", "a", "c", "d", "e", "f"] {
            recents.touch(name);
        }
        assert_eq!(paths(&recents), vec!["f", "e", "d", "c", "a"]);
    }

    #[test]
    fn settings_mirror_round_trips() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        let recents = RecentFiles::new();
        recents.touch("/tmp/one.bin");
        recents.touch("/tmp/two.bin");
        recents.sync_to(&store);

        assert_eq!(
            store.read(RECENT_FILES_CATEGORY, RECENT_FILES_KEY),
            json!(["/tmp/two.bin", "/tmp/one.bin"])
        );

        let restored = RecentFiles::new();
        restored.load_from(&store);
        assert_eq!(paths(&restored), vec!["/tmp/two.bin", "/tmp/one.bin"]);
    }

    #[test]
    fn load_from_missing_key_leaves_list_untouched() {
        let store = SettingsStore::new(PathBuf::from("/nonexistent/settings.json"));
        let recents = RecentFiles::new();
        recents.touch("/tmp/kept.bin");
        recents.load_from(&store);
        assert_eq!(paths(&recents), vec!["/tmp/kept.bin"]);
    }
}
