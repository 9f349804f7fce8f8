//! Hexel Plugin SDK
//! =================
//!
//! The minimal, versioned contract between Hexel Studio and a dynamically
//! loaded plugin module. A plugin exports exactly two symbols, both
//! emitted by [`declare_hexel_plugin!`]:
//!
//! - `hexel_plugin_abi_version() -> u32`, checked against
//!   [`HEXEL_PLUGIN_ABI_VERSION`] before anything else is touched;
//! - `hexel_plugin_entrypoint() -> PluginExport`, the one lifecycle entry
//!   point, invoked exactly once by the host. The returned module's setup
//!   function receives a [`ShellRegistrar`] and registers the plugin's
//!   views and settings through it.
//!
//! The export crosses the library boundary as a Rust type, so plugins must
//! be built with the same compiler and crate versions as the host; the ABI
//! version gate turns a mismatch into a skipped module instead of
//! undefined behavior. A stable cross-toolchain ABI is out of scope.

use hexel_shell::ShellRegistrar;

/// Bumped on any breaking change to the entry-point contract.
pub const HEXEL_PLUGIN_ABI_VERSION: u32 = 1;

/// NUL-terminated symbol names the host resolves.
pub const PLUGIN_ENTRY_SYMBOL: &[u8] = b"hexel_plugin_entrypoint\0";
pub const PLUGIN_ABI_SYMBOL: &[u8] = b"hexel_plugin_abi_version\0";

pub type PluginEntryFn = unsafe extern "C" fn() -> PluginExport;
pub type PluginAbiFn = unsafe extern "C" fn() -> u32;

type SetupFn = Box<dyn FnOnce(&mut ShellRegistrar<'_>)>;

/// A plugin's metadata plus its one-shot setup function.
pub struct PluginModule {
    name: String,
    description: String,
    setup: Option<SetupFn>,
}

impl PluginModule {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            setup: None,
        }
    }

    /// Attach the setup function the host runs during plugin
    /// initialization.
    pub fn on_initialize<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut ShellRegistrar<'_>) + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the setup function. A second call is a no-op.
    pub fn initialize(&mut self, registrar: &mut ShellRegistrar<'_>) {
        if let Some(setup) = self.setup.take() {
            setup(registrar);
        }
    }
}

/// What `hexel_plugin_entrypoint` hands back to the host.
pub struct PluginExport {
    module: PluginModule,
}

impl PluginExport {
    pub fn new(module: PluginModule) -> Self {
        Self { module }
    }

    pub fn module(&self) -> &PluginModule {
        &self.module
    }

    pub fn into_module(self) -> PluginModule {
        self.module
    }
}

/// Declare the exported symbols for a dynamic Hexel plugin.
///
/// # Example
///
/// ```ignore
/// use hexel_plugin_sdk::declare_hexel_plugin;
/// use hexel_shell::ShellRegistrar;
///
/// fn setup(registrar: &mut ShellRegistrar<'_>) {
///     // registrar.views.register(...), registrar.settings.add(...)
/// }
///
/// declare_hexel_plugin!("My Plugin", "What it contributes", setup);
/// ```
#[macro_export]
macro_rules! declare_hexel_plugin {
    ($name:expr, $description:expr, $setup:expr) => {
        #[no_mangle]
        pub extern "C" fn hexel_plugin_abi_version() -> u32 {
            $crate::HEXEL_PLUGIN_ABI_VERSION
        }

        #[no_mangle]
        #[allow(improper_ctypes_definitions)]
        pub extern "C" fn hexel_plugin_entrypoint() -> $crate::PluginExport {
            $crate::PluginExport::new(
                $crate::PluginModule::new($name, $description).on_initialize($setup),
            )
        }
    };
}
