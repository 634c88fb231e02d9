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

//! Plugin discovery
//!
//! Locates installed plugins under the configured plugin directories.

use crate::error::HookmanResult;
use crate::{ASSETS_DIR_NAME, PLATFORM_TAGS, PLUGIN_CONFIG_FILENAME};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Find `<dir>/<plugin>/assets/plugin.toml` in every plugin directory.
///
/// Directories that don't exist are skipped. Results are sorted within each
/// directory and directories keep the order they were given in.
pub fn find_config_files(plugin_dirs: &[PathBuf]) -> HookmanResult<Vec<PathBuf>> {
    let mut config_files = Vec::new();

    for dir in plugin_dirs {
        if !dir.is_dir() {
            tracing::debug!("Skipping missing plugin directory {}", dir.display());
            continue;
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(dir).min_depth(3).max_depth(3) {
            let entry = entry?;
            if is_plugin_config(dir, entry.path()) {
                found.push(entry.into_path());
            }
        }
        found.sort();

        tracing::debug!("Found {} plugin(s) in {}", found.len(), dir.display());
        config_files.extend(found);
    }

    Ok(config_files)
}

fn is_plugin_config(dir: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(dir) else {
        return false;
    };
    let parts: Vec<_> = relative.iter().collect();
    parts.len() == 3
        && parts[1] == ASSETS_DIR_NAME
        && parts[2] == PLUGIN_CONFIG_FILENAME
        && path.is_file()
}

/// Plugin folder name for an archive: file stem without its platform tag.
///
/// `pipe_friction-linux64.hmplugin` -> `pipe_friction`
pub fn plugin_name_from_archive(plugin_file: &Path) -> String {
    let stem = plugin_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    PLATFORM_TAGS
        .iter()
        .find_map(|tag| stem.strip_suffix(tag))
        .map(str::to_string)
        .unwrap_or(stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_plugin(dir: &Path, name: &str) -> PathBuf {
        let assets = dir.join(name).join(ASSETS_DIR_NAME);
        std::fs::create_dir_all(&assets).unwrap();
        let config = assets.join(PLUGIN_CONFIG_FILENAME);
        std::fs::write(&config, "").unwrap();
        config
    }

    #[test]
    fn test_find_config_files() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("first");
        let second = temp_dir.path().join("second");
        let missing = temp_dir.path().join("missing");

        let b = make_plugin(&first, "b_plugin");
        let a = make_plugin(&first, "a_plugin");
        let c = make_plugin(&second, "c_plugin");

        // Not a plugin layout
        std::fs::create_dir_all(first.join("stray")).unwrap();
        std::fs::write(first.join("stray").join(PLUGIN_CONFIG_FILENAME), "").unwrap();
        std::fs::create_dir_all(first.join("deep").join("x").join(ASSETS_DIR_NAME)).unwrap();
        std::fs::write(
            first.join("deep").join("x").join(ASSETS_DIR_NAME).join(PLUGIN_CONFIG_FILENAME),
            "",
        )
        .unwrap();

        let found = find_config_files(&[second.clone(), missing, first.clone()]).unwrap();
        assert_eq!(found, vec![c, a, b]);
    }

    #[test]
    fn test_plugin_name_from_archive() {
        assert_eq!(
            plugin_name_from_archive(Path::new("/tmp/pipe_friction-linux64.hmplugin")),
            "pipe_friction"
        );
        assert_eq!(
            plugin_name_from_archive(Path::new("pipe_friction-win64.hmplugin")),
            "pipe_friction"
        );
        assert_eq!(
            plugin_name_from_archive(Path::new("pipe_friction-macos64.hmplugin")),
            "pipe_friction"
        );
        assert_eq!(
            plugin_name_from_archive(Path::new("pipe_friction.hmplugin")),
            "pipe_friction"
        );
        assert_eq!(
            plugin_name_from_archive(Path::new("linux64-tools.hmplugin")),
            "linux64-tools"
        );
    }
}
