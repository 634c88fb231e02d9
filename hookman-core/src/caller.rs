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

//! Hook caller
//!
//! Holds the function bound to every implemented hook, together with the
//! libraries those functions live in.

use crate::loader::LoadedLibrary;
use std::collections::HashMap;
use std::fmt;

/// A hook bound to the function a plugin exports for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFunction {
    /// Hook name
    pub hook: String,
    /// Plugin providing the implementation
    pub plugin: String,
    address: usize,
}

impl HookFunction {
    pub(crate) fn new(hook: impl Into<String>, plugin: impl Into<String>, address: usize) -> Self {
        Self {
            hook: hook.into(),
            plugin: plugin.into(),
            address,
        }
    }

    /// Raw address of the function
    pub fn address(&self) -> usize {
        self.address
    }

    /// Reinterpret the function as the function pointer type `F`.
    ///
    /// # Safety
    ///
    /// `F` must be an `extern "C" fn` matching the hook's declared signature,
    /// and the result must not be used after the [`HookCaller`] it came from is
    /// dropped.
    ///
    /// # Panics
    ///
    /// If `F` is not pointer-sized.
    pub unsafe fn as_fn<F: Copy>(&self) -> F {
        assert_eq!(
            std::mem::size_of::<F>(),
            std::mem::size_of::<usize>(),
            "hook function type must be a function pointer"
        );
        std::mem::transmute_copy::<usize, F>(&self.address)
    }
}

/// Bound hook implementations
#[derive(Default)]
pub struct HookCaller {
    functions: HashMap<String, HookFunction>,
    libraries: Vec<Box<dyn LoadedLibrary>>,
}

impl HookCaller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a library loaded for the lifetime of the caller
    pub(crate) fn retain_library(&mut self, library: Box<dyn LoadedLibrary>) {
        self.libraries.push(library);
    }

    /// Bind a hook, replacing any previous binding
    pub(crate) fn bind(&mut self, function: HookFunction) {
        tracing::debug!(
            "Binding hook '{}' to plugin '{}'",
            function.hook,
            function.plugin
        );
        self.functions.insert(function.hook.clone(), function);
    }

    /// Function bound to `hook`, if any plugin implements it
    pub fn get(&self, hook: &str) -> Option<&HookFunction> {
        self.functions.get(&hook.to_lowercase())
    }

    pub fn is_bound(&self, hook: &str) -> bool {
        self.get(hook).is_some()
    }

    /// Bound hook names, sorted
    pub fn hooks(&self) -> Vec<&str> {
        let mut hooks: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        hooks.sort_unstable();
        hooks
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Number of plugin libraries held loaded
    pub fn library_count(&self) -> usize {
        self.libraries.len()
    }
}

impl fmt::Debug for HookCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookCaller")
            .field("functions", &self.functions)
            .field("libraries", &self.libraries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    extern "C" fn double_it(value: i32) -> i32 {
        value * 2
    }

    #[test]
    fn test_bind_and_lookup() {
        let mut caller = HookCaller::new();
        assert!(caller.is_empty());

        caller.bind(HookFunction::new("friction_factor", "pipe", 0x10));
        caller.bind(HookFunction::new("env_temperature", "env", 0x20));

        assert_eq!(caller.len(), 2);
        assert!(caller.is_bound("FRICTION_FACTOR"));
        assert_eq!(caller.get("env_temperature").unwrap().plugin, "env");
        assert_eq!(caller.hooks(), vec!["env_temperature", "friction_factor"]);
        assert!(caller.get("missing").is_none());
    }

    #[test]
    fn test_as_fn_calls_through_address() {
        let address = double_it as extern "C" fn(i32) -> i32 as usize;
        let function = HookFunction::new("double_it", "test", address);

        let f: extern "C" fn(i32) -> i32 = unsafe { function.as_fn() };
        assert_eq!(f(21), 42);
    }
}
