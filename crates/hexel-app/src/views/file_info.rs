//! A small built-in view showing metadata about the current file. Only
//! available once a file has been loaded.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use eframe::egui::{Key, Modifiers, Ui, Vec2};
use hexel_shell::{KeyChord, ShellServices, View};

pub struct FileInfoView {
    open: bool,
    current: Rc<RefCell<Option<PathBuf>>>,
    /// Metadata is cached per path; `Ctrl+R` forces a re-stat.
    cached: Option<FileFacts>,
}

struct FileFacts {
    path: PathBuf,
    size: Option<u64>,
}

impl FileInfoView {
    pub fn new(current: Rc<RefCell<Option<PathBuf>>>) -> Self {
        Self {
            open: true,
            current,
            cached: None,
        }
    }

    fn refresh(&mut self, path: &Path) {
        self.cached = Some(FileFacts {
            path: path.to_path_buf(),
            size: fs::metadata(path).ok().map(|meta| meta.len()),
        });
    }
}

impl View for FileInfoView {
    fn name(&self) -> &str {
        "File Info"
    }

    fn is_available(&self) -> bool {
        self.current.borrow().is_some()
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    fn min_size(&self) -> Vec2 {
        Vec2::new(320.0, 160.0)
    }

    fn draw(&mut self, ui: &mut Ui, _services: &ShellServices) {
        let Some(path) = self.current.borrow().clone() else {
            return;
        };
        let stale = self
            .cached
            .as_ref()
            .map_or(true, |facts| facts.path != path);
        if stale {
            self.refresh(&path);
        }
        let Some(facts) = &self.cached else {
            return;
        };

        ui.monospace(facts.path.display().to_string());
        match facts.size {
            Some(size) => ui.label(format!("{size} bytes")),
            None => ui.label("size unknown"),
        };
        ui.add_space(8.0);
        ui.weak("Ctrl+R re-reads the file metadata");
    }

    fn handle_shortcut(&mut self, chord: KeyChord) -> bool {
        if !chord.matches(Key::R, Modifiers::CTRL) {
            return false;
        }
        let current = self.current.borrow().clone();
        if let Some(path) = current {
            self.refresh(&path);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_with_file(contents: &[u8]) -> (tempfile::TempDir, FileInfoView) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dump.bin");
        fs::write(&path, contents).unwrap();
        let current = Rc::new(RefCell::new(Some(path)));
        (dir, FileInfoView::new(current))
    }

    #[test]
    fn ctrl_r_restats_the_current_file_and_is_consumed() {
        let (_dir, mut view) = view_with_file(b"abcd");
        assert!(view.handle_shortcut(KeyChord::ctrl(Key::R)));
        assert_eq!(view.cached.as_ref().unwrap().size, Some(4));
    }

    #[test]
    fn other_chords_are_not_claimed() {
        let (_dir, mut view) = view_with_file(b"abcd");
        assert!(!view.handle_shortcut(KeyChord::plain(Key::R)));
        assert!(!view.handle_shortcut(KeyChord::ctrl(Key::G)));
        assert!(view.cached.is_none());
    }

    #[test]
    fn availability_tracks_the_current_file() {
        let current: Rc<RefCell<Option<PathBuf>>> = Rc::new(RefCell::new(None));
        let view = FileInfoView::new(Rc::clone(&current));
        assert!(!view.is_available());

        *current.borrow_mut() = Some(PathBuf::from("/tmp/dump.bin"));
        assert!(view.is_available());
    }
}
