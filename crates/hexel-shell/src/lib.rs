//! Core shell services for Hexel Studio: the event bus and deferred-call
//! queue, the view registry, the persisted settings store, the
//! view-visibility ledger, the recent-files list, and the per-frame shell
//! state the window orchestrator drives.
//!
//! Everything here is single-threaded by design; the deferred-call queue
//! is the one structure other threads may touch. Widget drawing and the
//! windowing backend live in the application crate.

mod event;
pub mod layout;
mod recent;
mod settings;
mod shell;
mod shortcut;
mod view;

pub use event::{DeferredCall, DeferredQueue, EventKind, EventManager, EventPayload, OwnerToken};
pub use recent::{RecentFiles, RECENT_FILES_CATEGORY, RECENT_FILES_KEY};
pub use settings::{config_dir, SettingRender, SettingsStore, SETTINGS_FILE};
pub use shell::{Shell, ShellRegistrar, ShellServices};
pub use shortcut::{KeyChord, ShortcutSlot};
pub use view::{View, ViewRegistry};
