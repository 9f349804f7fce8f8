//! Keyboard chord type and the single-slot shortcut buffer.

use egui::{Key, Modifiers};

/// A key plus the modifier state it was pressed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyChord {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers == modifiers
    }
}

/// Single-producer/single-consumer slot holding the most recent unconsumed
/// chord. Recording overwrites (last chord wins); the orchestrator drains
/// it once per frame.
#[derive(Debug, Default)]
pub struct ShortcutSlot {
    current: Option<KeyChord>,
}

impl ShortcutSlot {
    pub fn record(&mut self, chord: KeyChord) {
        self.current = Some(chord);
    }

    pub fn take(&mut self) -> Option<KeyChord> {
        self.current.take()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}
