//! Dynamic plugin loading for Hexel Studio.
//!
//! The handler owns the loaded library handles and the descriptor list.
//! A module must stay mapped for as long as anything it registered (a
//! view, a settings callback, a subscription) may still be alive; the
//! application drops all shell state before the handler, so the library
//! drop glue is the last code to run. A plugin entry point that panics is
//! not isolated from the host process; that is a documented property of
//! this design, not something the handler papers over.

mod error;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::{debug, info, warn};

use hexel_plugin_sdk::{
    PluginAbiFn, PluginEntryFn, HEXEL_PLUGIN_ABI_VERSION, PLUGIN_ABI_SYMBOL, PLUGIN_ENTRY_SYMBOL,
};
use hexel_shell::ShellRegistrar;

pub use error::PluginError;

/// A loaded plugin module: its library handle, resolved entry point, and
/// lifecycle state. The function pointer stays valid for as long as the
/// `Library` is held alongside it.
pub struct Plugin {
    path: PathBuf,
    abi_version: u32,
    entry: PluginEntryFn,
    initialized: bool,
    _library: Library,
}

impl Plugin {
    fn open(path: &Path) -> Result<Self, PluginError> {
        let library = unsafe { Library::new(path) }?;

        let abi = unsafe { library.get::<PluginAbiFn>(PLUGIN_ABI_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|_| PluginError::MissingSymbol {
                path: path.to_path_buf(),
                symbol: "hexel_plugin_abi_version",
            })?;
        let abi_version = unsafe { abi() };
        if abi_version != HEXEL_PLUGIN_ABI_VERSION {
            return Err(PluginError::AbiMismatch {
                path: path.to_path_buf(),
                found: abi_version,
                expected: HEXEL_PLUGIN_ABI_VERSION,
            });
        }

        let entry = unsafe { library.get::<PluginEntryFn>(PLUGIN_ENTRY_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|_| PluginError::MissingSymbol {
                path: path.to_path_buf(),
                symbol: "hexel_plugin_entrypoint",
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            abi_version,
            entry,
            initialized: false,
            _library: library,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn abi_version(&self) -> u32 {
        self.abi_version
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Invoke the entry point and run the returned module's setup against
    /// the registrar. Called exactly once; a second call is a no-op.
    pub fn initialize(&mut self, registrar: &mut ShellRegistrar<'_>) {
        if self.initialized {
            warn!(plugin = %self.path.display(), "plugin already initialized; ignoring");
            return;
        }
        self.initialized = true;

        let export = unsafe { (self.entry)() };
        let mut module = export.into_module();
        info!(
            plugin = %self.path.display(),
            name = module.name(),
            "initializing plugin"
        );
        module.initialize(registrar);
    }
}

/// Owns every loaded plugin, in discovery order.
#[derive(Default)]
pub struct PluginHandler {
    plugins: Vec<Plugin>,
}

impl PluginHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dir` for loadable modules. An unreadable directory fails the
    /// whole operation; an individual module that fails to open, lacks the
    /// entry symbols, or targets another ABI is skipped with a warning.
    pub fn load(&mut self, dir: &Path) -> Result<(), PluginError> {
        let entries = fs::read_dir(dir).map_err(|source| PluginError::DirectoryAccess {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            if !is_module_candidate(&path) {
                continue;
            }
            match Plugin::open(&path) {
                Ok(plugin) => {
                    debug!(module = %path.display(), abi = plugin.abi_version(), "plugin module loaded");
                    self.plugins.push(plugin);
                }
                Err(err) => {
                    warn!(module = %path.display(), error = %err, "skipping plugin module");
                }
            }
        }
        Ok(())
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Initialize every loaded plugin, in discovery order.
    pub fn initialize_all(&mut self, registrar: &mut ShellRegistrar<'_>) {
        for plugin in &mut self.plugins {
            plugin.initialize(registrar);
        }
    }

    /// Release every module handle. Must only run after every object a
    /// plugin registered has been dropped, including settings callbacks and
    /// subscriptions, so no destructor code lives in an unmapped module.
    /// Dropping the handler itself has the same effect.
    pub fn unload(&mut self) {
        for plugin in self.plugins.drain(..) {
            debug!(plugin = %plugin.path.display(), "unloading plugin module");
        }
    }
}

/// Default plugin directory: `plugins/` next to the running executable.
pub fn default_plugin_dir() -> Option<PathBuf> {
    let exe = env::current_exe().ok()?;
    Some(exe.parent()?.join("plugins"))
}

fn is_module_candidate(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .map(|ext| ext == env::consts::DLL_EXTENSION)
            .unwrap_or(false)
}
