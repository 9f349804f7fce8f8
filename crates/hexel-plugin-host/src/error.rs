use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or managing plugin modules.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error("cannot access plugin directory {}: {source}", .path.display())]
    DirectoryAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load plugin library: {0}")]
    LibraryLoad(#[from] libloading::Error),
    #[error("plugin {} does not export `{symbol}`", .path.display())]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
    },
    #[error("plugin {} targets ABI v{found}, host requires v{expected}", .path.display())]
    AbiMismatch {
        path: PathBuf,
        found: u32,
        expected: u32,
    },
}
