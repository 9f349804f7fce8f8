//! Views the shell ships with.

mod file_info;
mod settings;

pub use file_info::FileInfoView;
pub use settings::SettingsView;
