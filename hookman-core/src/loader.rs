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

//! Native plugin loading
//!
//! Resolves exported hook symbols from plugin shared libraries.

use crate::error::{HookmanError, HookmanResult};
use libloading::Library;
use std::ffi::c_void;
use std::path::Path;

/// A loaded plugin library
///
/// The library stays mapped while this value is alive; addresses returned by
/// [`LoadedLibrary::symbol_address`] are only valid for that long.
pub trait LoadedLibrary: Send + Sync {
    /// Address of an exported symbol, or `None` if the library doesn't export it
    fn symbol_address(&self, name: &str) -> Option<usize>;
}

/// Loads plugin shared libraries
pub trait PluginLoader: Send + Sync {
    /// Load the library at `path`
    fn load(&self, path: &Path) -> HookmanResult<Box<dyn LoadedLibrary>>;
}

/// Loader backed by the platform dynamic linker
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl PluginLoader for NativeLoader {
    fn load(&self, path: &Path) -> HookmanResult<Box<dyn LoadedLibrary>> {
        // Running a plugin's initializers is the point of loading it.
        let library = unsafe { Library::new(path) }
            .map_err(|e| HookmanError::LoadFailed(format!("{}: {}", path.display(), e)))?;
        tracing::debug!("Loaded plugin library {}", path.display());
        Ok(Box::new(NativeLibrary { library }))
    }
}

struct NativeLibrary {
    library: Library,
}

impl LoadedLibrary for NativeLibrary {
    fn symbol_address(&self, name: &str) -> Option<usize> {
        // The symbol is only inspected as an address, never called here.
        let symbol = unsafe { self.library.get::<*const c_void>(name.as_bytes()) }.ok()?;
        let address = *symbol as usize;
        (address != 0).then_some(address)
    }
}

/// Check whether `library` exports `full_hook_name`
pub fn is_implemented(library: &dyn LoadedLibrary, full_hook_name: &str) -> bool {
    library.symbol_address(full_hook_name).is_some()
}

/// Address of the function implementing `full_hook_name`
pub fn function_address(library: &dyn LoadedLibrary, full_hook_name: &str) -> Option<usize> {
    library.symbol_address(full_hook_name)
}
