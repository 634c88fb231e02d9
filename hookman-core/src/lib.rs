// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Hookman
//!
//! A manager for native plugins that implement a declared set of hooks.
//!
//! # Architecture
//!
//! A host application declares its hooks in a [`HookSpecs`]. Each hook maps to
//! a C symbol, `{project}_v{version}_{hook}`, that a plugin exports from its
//! shared library to implement it.
//!
//! Plugins are shipped as `.hmplugin` archives:
//!
//! ```text
//! my_plugin-linux64.hmplugin
//! ├── assets/plugin.toml
//! ├── assets/README.md
//! └── artifacts/libmy_plugin.so
//! ```
//!
//! [`HookMan`] installs archives into its plugin directories, lists what is
//! installed, reports hooks implemented by more than one plugin, and binds
//! every implemented hook into a [`HookCaller`].
//!
//! # Example
//!
//! ```rust,ignore
//! use hookman::{HookMan, HookSpecs};
//! use std::path::PathBuf;
//!
//! let specs = HookSpecs::from_file("hooks.toml".as_ref())?;
//! let plugins_dir = PathBuf::from("/opt/acme/plugins");
//! let hookman = HookMan::new(specs, vec![plugins_dir.clone()]);
//!
//! hookman.install_plugin("my_plugin-linux64.hmplugin".as_ref(), &plugins_dir)?;
//!
//! let caller = hookman.get_hook_caller(&[])?;
//! if let Some(hook) = caller.get("friction_factor") {
//!     let f: extern "C" fn(i32, f64) -> f64 = unsafe { hook.as_fn() };
//!     println!("{}", f(1, 2.0));
//! }
//! ```

pub mod caller;
pub mod config;
pub mod discovery;
pub mod error;
pub mod generator;
pub mod loader;
pub mod manager;
pub mod plugin;
pub mod specs;

// Re-exports
pub use caller::{HookCaller, HookFunction};
pub use config::HookmanConfig;
pub use discovery::{find_config_files, plugin_name_from_archive};
pub use error::{HookmanError, HookmanResult};
pub use generator::{
    generate_hook_specs_header, generate_plugin_template, package_plugin, PluginTemplate,
};
pub use loader::{LoadedLibrary, NativeLoader, PluginLoader};
pub use manager::HookMan;
pub use plugin::{shared_library_filename, ConflictStatus, PluginConfig, PluginInfo};
pub use specs::{HookArg, HookSpec, HookSpecs};

/// Plugin archive extension
pub const PLUGIN_FILE_EXTENSION: &str = "hmplugin";

/// Plugin config filename, stored under [`ASSETS_DIR_NAME`]
pub const PLUGIN_CONFIG_FILENAME: &str = "plugin.toml";

/// Directory holding the plugin config and readme
pub const ASSETS_DIR_NAME: &str = "assets";

/// Directory holding the plugin shared library
pub const ARTIFACTS_DIR_NAME: &str = "artifacts";

/// Platform tags appended to archive names, stripped on install
pub const PLATFORM_TAGS: &[&str] = &["-linux64", "-win64", "-macos64"];

/// Platform tag for archives built on this host
pub fn current_platform_tag() -> &'static str {
    if cfg!(windows) {
        "-win64"
    } else if cfg!(target_os = "macos") {
        "-macos64"
    } else {
        "-linux64"
    }
}

/// Archive-relative path of the plugin config (always `/`-separated)
pub(crate) fn config_archive_path() -> String {
    format!("{}/{}", ASSETS_DIR_NAME, PLUGIN_CONFIG_FILENAME)
}
