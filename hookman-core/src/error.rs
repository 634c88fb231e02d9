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

//! Hookman error types

use thiserror::Error;

/// Result type for hookman operations
pub type HookmanResult<T> = Result<T, HookmanError>;

/// Errors that can occur while managing plugins
#[derive(Debug, Error)]
pub enum HookmanError {
    // Spec errors
    #[error("Invalid hook spec: {0}")]
    InvalidHookSpec(String),

    #[error("Hook specs parse error: {0}")]
    SpecsParseError(String),

    // Plugin config errors
    #[error("Plugin config not found: {0}")]
    ConfigNotFound(String),

    #[error("Invalid plugin config: {0}")]
    InvalidConfig(String),

    #[error("Plugin config parse error: {0}")]
    ConfigParseError(String),

    #[error("Invalid plugin file: {0}")]
    InvalidPluginFile(String),

    // Installation errors
    #[error("Invalid destination path: {0}")]
    InvalidDestinationPath(String),

    #[error("Plugin already installed: {0}")]
    PluginAlreadyInstalled(String),

    #[error("Plugin not found: {0}")]
    PluginNotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    // Runtime errors
    #[error("Conflict between plugins: {0}")]
    ConflictBetweenPlugins(String),

    #[error("Plugin load failed: {0}")]
    LoadFailed(String),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<toml::de::Error> for HookmanError {
    fn from(e: toml::de::Error) -> Self {
        HookmanError::ConfigParseError(e.to_string())
    }
}

impl From<toml::ser::Error> for HookmanError {
    fn from(e: toml::ser::Error) -> Self {
        HookmanError::SerializationError(e.to_string())
    }
}

impl From<zip::result::ZipError> for HookmanError {
    fn from(e: zip::result::ZipError) -> Self {
        HookmanError::ArchiveError(e.to_string())
    }
}

impl From<semver::Error> for HookmanError {
    fn from(e: semver::Error) -> Self {
        HookmanError::InvalidConfig(format!("Invalid version: {}", e))
    }
}

impl From<walkdir::Error> for HookmanError {
    fn from(e: walkdir::Error) -> Self {
        HookmanError::IoError(e.into())
    }
}
