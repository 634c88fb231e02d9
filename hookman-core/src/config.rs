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

//! Hookman configuration
//!
//! Loaded from `hookman.toml`:
//!
//! ```toml
//! specs_file = "hooks.toml"
//! plugin_dirs = ["/opt/acme/plugins", "plugins"]
//! ignored_plugins = ["experimental_solver"]
//! ```

use crate::error::{HookmanError, HookmanResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config filename
pub const CONFIG_FILENAME: &str = "hookman.toml";

/// Hookman configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookmanConfig {
    /// Hook specs file (TOML)
    pub specs_file: Option<PathBuf>,
    /// Directories plugins are installed into and discovered from
    pub plugin_dirs: Vec<PathBuf>,
    /// Plugins left out of listing, status and hook binding
    pub ignored_plugins: Vec<String>,
}

impl Default for HookmanConfig {
    fn default() -> Self {
        let plugins_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hookman")
            .join("plugins");

        Self {
            specs_file: None,
            plugin_dirs: vec![plugins_dir],
            ignored_plugins: Vec::new(),
        }
    }
}

impl HookmanConfig {
    /// Load configuration from a file.
    ///
    /// Relative paths in the file are resolved against the file's directory.
    pub fn load(path: &Path) -> HookmanResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HookmanError::ConfigNotFound(format!("{}: {}", path.display(), e)))?;
        let mut config: HookmanConfig = toml::from_str(&content)?;

        if let Some(base) = path.parent() {
            config.specs_file = config.specs_file.map(|p| base.join(p));
            config.plugin_dirs = config.plugin_dirs.iter().map(|p| base.join(p)).collect();
        }

        Ok(config)
    }

    /// Load `path` if given, else `./hookman.toml` if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> HookmanResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILENAME);
                if local.is_file() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Ignored plugin names as string slices
    pub fn ignored(&self) -> Vec<&str> {
        self.ignored_plugins.iter().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = HookmanConfig::default();
        assert!(config.specs_file.is_none());
        assert_eq!(config.plugin_dirs.len(), 1);
        assert!(config.plugin_dirs[0].ends_with("hookman/plugins"));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(
            &path,
            r#"
specs_file = "hooks.toml"
plugin_dirs = ["plugins", "/abs/plugins"]
ignored_plugins = ["legacy"]
"#,
        )
        .unwrap();

        let config = HookmanConfig::load(&path).unwrap();
        assert_eq!(config.specs_file, Some(temp_dir.path().join("hooks.toml")));
        assert_eq!(
            config.plugin_dirs,
            vec![temp_dir.path().join("plugins"), PathBuf::from("/abs/plugins")]
        );
        assert_eq!(config.ignored(), vec!["legacy"]);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "ignored_plugins = [\"a\"]\n").unwrap();

        let config = HookmanConfig::load(&path).unwrap();
        assert_eq!(config.plugin_dirs.len(), 1);
        assert!(config.specs_file.is_none());
    }

    #[test]
    fn test_load_missing_file() {
        let err = HookmanConfig::load(Path::new("/nonexistent/hookman.toml")).unwrap_err();
        assert!(matches!(err, HookmanError::ConfigNotFound(_)));
    }

    #[test]
    fn test_load_or_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILENAME);
        std::fs::write(&path, "plugin_dirs = [\"plugins\"]\n").unwrap();

        let config = HookmanConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.plugin_dirs, vec![temp_dir.path().join("plugins")]);

        let missing = temp_dir.path().join("missing.toml");
        let err = HookmanConfig::load_or_default(Some(&missing)).unwrap_err();
        assert!(matches!(err, HookmanError::ConfigNotFound(_)));

        // The crate directory holds no hookman.toml
        assert!(HookmanConfig::load_or_default(None).is_ok());
    }
}
