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

//! Integration tests for the plugin lifecycle: scaffold, package, install,
//! inspect, bind, remove.

use hookman::{
    generate_plugin_template, package_plugin, shared_library_filename, HookMan, HookSpecs,
    HookmanError, HookmanResult, LoadedLibrary, PluginLoader, PluginTemplate,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::TempDir;

const SPECS: &str = r#"
project_name = "acme"
version = "2"

[[hooks]]
name = "friction_factor"
doc = "Friction factor of a pipe section"
returns = "double"
args = [{ name = "section", type = "int" }, { name = "v", type = "double" }]

[[hooks]]
name = "env_temperature"
doc = "Environment temperature"
args = [{ name = "t", type = "double*" }]
"#;

extern "C" fn friction_factor(section: i32, v: f64) -> f64 {
    section as f64 * v
}

/// Resolves every symbol of a library to a function defined in this test
struct StaticLoader {
    exports: HashMap<String, Vec<(&'static str, usize)>>,
}

struct StaticLibrary {
    symbols: Vec<(&'static str, usize)>,
}

impl LoadedLibrary for StaticLibrary {
    fn symbol_address(&self, name: &str) -> Option<usize> {
        self.symbols
            .iter()
            .find(|(symbol, _)| *symbol == name)
            .map(|(_, address)| *address)
    }
}

impl PluginLoader for StaticLoader {
    fn load(&self, path: &Path) -> HookmanResult<Box<dyn LoadedLibrary>> {
        let file_name = path.file_name().unwrap().to_string_lossy().into_owned();
        let symbols = self
            .exports
            .get(&file_name)
            .cloned()
            .ok_or_else(|| HookmanError::LoadFailed(file_name))?;
        Ok(Box::new(StaticLibrary { symbols }))
    }
}

fn build_plugin(specs: &HookSpecs, workspace: &Path, name: &str) -> PathBuf {
    let dir = generate_plugin_template(specs, &PluginTemplate::new(name), workspace).unwrap();
    std::fs::write(
        dir.join("artifacts").join(shared_library_filename(name)),
        b"not really a library",
    )
    .unwrap();
    package_plugin(&dir, &workspace.join("dist")).unwrap()
}

#[test]
fn test_full_lifecycle() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("workspace");
    let plugins_dir = temp_dir.path().join("plugins");
    std::fs::create_dir_all(&plugins_dir).unwrap();

    let specs = HookSpecs::from_str(SPECS).unwrap();

    let friction = friction_factor as extern "C" fn(i32, f64) -> f64 as usize;
    let mut exports = HashMap::new();
    exports.insert(
        shared_library_filename("pipe"),
        vec![("acme_v2_friction_factor", friction)],
    );
    exports.insert(
        shared_library_filename("rival"),
        vec![("acme_v2_friction_factor", friction)],
    );
    exports.insert(shared_library_filename("weather"), vec![]);

    let hookman = HookMan::with_loader(
        specs.clone(),
        vec![plugins_dir.clone()],
        Box::new(StaticLoader { exports }),
    );

    for name in ["pipe", "rival", "weather"] {
        let package = build_plugin(&specs, &workspace, name);
        let installed = hookman.install_plugin(&package, &plugins_dir).unwrap();
        assert_eq!(installed, plugins_dir.join(name));
    }

    let plugins = hookman.get_plugins_available(&[]).unwrap();
    let names: Vec<_> = plugins.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["pipe", "rival", "weather"]);

    let status = hookman.get_status(&[]).unwrap();
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].hook, "friction_factor");
    assert_eq!(status[0].plugins, vec!["pipe", "rival"]);

    let err = hookman.get_hook_caller(&[]).unwrap_err();
    assert!(matches!(err, HookmanError::ConflictBetweenPlugins(_)));

    let caller = hookman.get_hook_caller(&["rival"]).unwrap();
    let hook = caller.get("friction_factor").unwrap();
    assert_eq!(hook.plugin, "pipe");
    let f: extern "C" fn(i32, f64) -> f64 = unsafe { hook.as_fn() };
    assert_eq!(f(3, 0.5), 1.5);
    assert!(!caller.is_bound("env_temperature"));

    hookman.remove_plugin("rival").unwrap();
    assert!(hookman.get_status(&[]).unwrap().is_empty());
    assert_eq!(hookman.get_hook_caller(&[]).unwrap().len(), 1);
}

#[test]
fn test_install_rejects_unknown_destination() {
    let temp_dir = TempDir::new().unwrap();
    let plugins_dir = temp_dir.path().join("plugins");
    let elsewhere = temp_dir.path().join("elsewhere");
    std::fs::create_dir_all(&elsewhere).unwrap();

    let specs = HookSpecs::from_str(SPECS).unwrap();
    let package = build_plugin(&specs, &temp_dir.path().join("workspace"), "pipe");

    let hookman = HookMan::new(specs, vec![plugins_dir]);
    let err = hookman.install_plugin(&package, &elsewhere).unwrap_err();
    assert!(matches!(err, HookmanError::InvalidDestinationPath(_)));
    assert!(!elsewhere.join("pipe").exists());
}
