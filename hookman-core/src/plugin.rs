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

//! Plugin config, plugin information and conflict reporting
//!
//! Every plugin carries an `assets/plugin.toml`:
//!
//! ```toml
//! [plugin]
//! name = "pipe_friction"
//! version = "1.0.0"
//! author = "Jane Doe"
//! email = "jane@example.com"
//! shared_lib_name = "pipe_friction"
//! ```

use crate::error::{HookmanError, HookmanResult};
use crate::loader::{self, LoadedLibrary, PluginLoader};
use crate::{config_archive_path, ARTIFACTS_DIR_NAME};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use zip::ZipArchive;

/// Parsed `plugin.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    pub plugin: PluginMetadata,
}

/// Plugin metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginMetadata {
    /// Plugin name, unique within the plugin directories
    pub name: String,

    /// Plugin version (semver)
    pub version: String,

    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub email: String,

    /// Library name without platform prefix/suffix
    pub shared_lib_name: String,

    #[serde(default)]
    pub description: Option<String>,
}

impl PluginConfig {
    /// Load config from a file
    pub fn from_file(path: &Path) -> HookmanResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HookmanError::ConfigNotFound(format!("{}: {}", path.display(), e)))?;
        content.parse()
    }

    /// Validate the config
    pub fn validate(&self) -> HookmanResult<()> {
        let name = &self.plugin.name;
        if name.is_empty() {
            return Err(HookmanError::InvalidConfig(
                "Plugin name cannot be empty".into(),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(HookmanError::InvalidConfig(
                "Plugin name can only contain alphanumeric characters, hyphens, and underscores"
                    .into(),
            ));
        }

        semver::Version::parse(&self.plugin.version)?;

        let lib = &self.plugin.shared_lib_name;
        if lib.is_empty() || lib.contains(['/', '\\']) || lib.contains("..") {
            return Err(HookmanError::InvalidConfig(format!(
                "Invalid shared_lib_name: '{}'",
                lib
            )));
        }

        Ok(())
    }

    /// Serialize back to TOML
    pub fn to_toml(&self) -> HookmanResult<String> {
        Ok(toml::to_string(self)?)
    }

    /// File name of the shared library on this platform
    pub fn shared_library_filename(&self) -> String {
        shared_library_filename(&self.plugin.shared_lib_name)
    }
}

impl FromStr for PluginConfig {
    type Err = HookmanError;

    /// Parse config from string
    fn from_str(content: &str) -> HookmanResult<Self> {
        let config: PluginConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }
}

/// Platform file name of a shared library: `libfoo.so`, `libfoo.dylib` or `foo.dll`
pub fn shared_library_filename(shared_lib_name: &str) -> String {
    libloading::library_filename(shared_lib_name)
        .to_string_lossy()
        .into_owned()
}

/// Everything known about an installed plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: Option<String>,
    /// Path of `assets/plugin.toml`
    pub config_location: PathBuf,
    /// Plugin root folder
    pub location: PathBuf,
    /// Path of the shared library under `artifacts/`
    pub shared_lib_path: PathBuf,
    /// Hooks exported by the shared library, sorted by name
    pub hooks_implemented: Vec<String>,
}

impl PluginInfo {
    /// Read the plugin whose config lives at `config_location` and probe its
    /// library for the hooks in `hooks_available` (hook name -> symbol).
    pub fn load(
        config_location: &Path,
        hooks_available: &BTreeMap<String, String>,
        loader: &dyn PluginLoader,
    ) -> HookmanResult<Self> {
        let config = PluginConfig::from_file(config_location)?;
        Self::from_config(config, config_location, hooks_available, loader).map(|(info, _)| info)
    }

    /// Like [`PluginInfo::load`], also handing back the opened library.
    pub(crate) fn from_config(
        config: PluginConfig,
        config_location: &Path,
        hooks_available: &BTreeMap<String, String>,
        loader: &dyn PluginLoader,
    ) -> HookmanResult<(Self, Box<dyn LoadedLibrary>)> {
        let location = plugin_root(config_location)?;
        let shared_lib_path = location
            .join(ARTIFACTS_DIR_NAME)
            .join(config.shared_library_filename());

        let library = loader.load(&shared_lib_path)?;
        let hooks_implemented = hooks_available
            .iter()
            .filter(|(_, full_name)| loader::is_implemented(library.as_ref(), full_name))
            .map(|(hook, _)| hook.clone())
            .collect();

        let metadata = config.plugin;
        let info = Self {
            name: metadata.name,
            version: metadata.version,
            author: metadata.author,
            email: metadata.email,
            description: metadata.description,
            config_location: config_location.to_path_buf(),
            location,
            shared_lib_path,
            hooks_implemented,
        };
        Ok((info, library))
    }

    /// Check that a plugin archive has a valid config and ships its library.
    pub fn validate_plugin_file<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> HookmanResult<PluginConfig> {
        let config_path = config_archive_path();

        let content = {
            let mut entry = archive.by_name(&config_path).map_err(|_| {
                HookmanError::InvalidPluginFile(format!("{} not found in plugin file", config_path))
            })?;
            let mut content = String::new();
            entry.read_to_string(&mut content)?;
            content
        };
        let config: PluginConfig = content.parse()?;

        let lib_path = format!("{}/{}", ARTIFACTS_DIR_NAME, config.shared_library_filename());
        if !archive.file_names().any(|name| name == lib_path) {
            return Err(HookmanError::InvalidPluginFile(format!(
                "{} not found in plugin file",
                lib_path
            )));
        }

        Ok(config)
    }
}

/// `<root>/assets/plugin.toml` -> `<root>`
fn plugin_root(config_location: &Path) -> HookmanResult<PathBuf> {
    config_location
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            HookmanError::InvalidConfig(format!(
                "Config is not inside a plugin folder: {}",
                config_location.display()
            ))
        })
}

/// A hook implemented by more than one plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictStatus {
    pub hook: String,
    pub plugins: Vec<String>,
}

impl std::fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hook '{}' is implemented by: {}",
            self.hook,
            self.plugins.join(", ")
        )
    }
}
