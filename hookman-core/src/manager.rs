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

//! Hookman - main entry point for plugin operations
//!
//! Installs plugin archives, lists installed plugins, reports conflicts and
//! binds hook implementations.

use crate::caller::{HookCaller, HookFunction};
use crate::discovery::{find_config_files, plugin_name_from_archive};
use crate::error::{HookmanError, HookmanResult};
use crate::loader::{self, LoadedLibrary, NativeLoader, PluginLoader};
use crate::plugin::{ConflictStatus, PluginConfig, PluginInfo};
use crate::specs::HookSpecs;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};
use zip::ZipArchive;

/// Holds the hook specs and plugin directories of a host application
pub struct HookMan {
    specs: HookSpecs,
    plugin_dirs: Vec<PathBuf>,
    /// Hook name -> exported symbol
    hooks_available: BTreeMap<String, String>,
    loader: Box<dyn PluginLoader>,
}

impl HookMan {
    /// Create a manager that loads plugins with the platform dynamic linker
    pub fn new(specs: HookSpecs, plugin_dirs: Vec<PathBuf>) -> Self {
        Self::with_loader(specs, plugin_dirs, Box::new(NativeLoader))
    }

    /// Create a manager with a custom library loader
    pub fn with_loader(
        specs: HookSpecs,
        plugin_dirs: Vec<PathBuf>,
        loader: Box<dyn PluginLoader>,
    ) -> Self {
        let hooks_available = specs.hooks_available();
        Self {
            specs,
            plugin_dirs,
            hooks_available,
            loader,
        }
    }

    pub fn specs(&self) -> &HookSpecs {
        &self.specs
    }

    pub fn plugin_dirs(&self) -> &[PathBuf] {
        &self.plugin_dirs
    }

    /// Hook name -> exported symbol
    pub fn hooks_available(&self) -> &BTreeMap<String, String> {
        &self.hooks_available
    }

    /// Extract a `.hmplugin` archive into `dst_path`.
    ///
    /// `dst_path` must be one of the plugin directories given at construction,
    /// and must not already contain a plugin folder with the archive's name.
    /// Returns the folder the plugin was extracted to.
    pub fn install_plugin(&self, plugin_file: &Path, dst_path: &Path) -> HookmanResult<PathBuf> {
        let file = File::open(plugin_file).map_err(|e| {
            HookmanError::InvalidPluginFile(format!("{}: {}", plugin_file.display(), e))
        })?;
        let mut archive = ZipArchive::new(file)?;
        let config = PluginInfo::validate_plugin_file(&mut archive)?;

        if !self.plugin_dirs.iter().any(|dir| dir == dst_path) {
            return Err(HookmanError::InvalidDestinationPath(format!(
                "{} is not one of the plugin directories this HookMan was created with: {:?}",
                dst_path.display(),
                self.plugin_dirs
            )));
        }

        let plugin_name = plugin_name_from_archive(plugin_file);
        let destination = dst_path.join(&plugin_name);
        if destination.is_dir() {
            return Err(HookmanError::PluginAlreadyInstalled(plugin_name));
        }

        std::fs::create_dir_all(&destination)?;
        if let Err(e) = extract_archive(&mut archive, &destination) {
            let _ = std::fs::remove_dir_all(&destination);
            return Err(e);
        }

        tracing::info!(
            "Installed plugin {} v{} into {}",
            config.plugin.name,
            config.plugin.version,
            destination.display()
        );
        Ok(destination)
    }

    /// Remove the plugin named `plugin_name` from the plugin directories.
    ///
    /// Returns the folder that was deleted.
    pub fn remove_plugin(&self, plugin_name: &str) -> HookmanResult<PathBuf> {
        for config_file in find_config_files(&self.plugin_dirs)? {
            let Ok(config) = PluginConfig::from_file(&config_file) else {
                continue;
            };
            if config.plugin.name != plugin_name {
                continue;
            }

            let root = config_file
                .parent()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .ok_or_else(|| HookmanError::PluginNotFound(plugin_name.to_string()))?;
            std::fs::remove_dir_all(&root)?;

            tracing::info!("Removed plugin {} from {}", plugin_name, root.display());
            return Ok(root);
        }

        Err(HookmanError::PluginNotFound(plugin_name.to_string()))
    }

    /// Plugins installed in the plugin directories, minus `ignored_plugins`.
    ///
    /// Plugins whose config or library can't be read are skipped.
    pub fn get_plugins_available(&self, ignored_plugins: &[&str]) -> HookmanResult<Vec<PluginInfo>> {
        Ok(self
            .open_plugins(ignored_plugins)?
            .into_iter()
            .map(|(info, _)| info)
            .collect())
    }

    /// Discover plugins and open each shared library once.
    fn open_plugins(
        &self,
        ignored_plugins: &[&str],
    ) -> HookmanResult<Vec<(PluginInfo, Box<dyn LoadedLibrary>)>> {
        let mut plugins = Vec::new();

        for config_file in find_config_files(&self.plugin_dirs)? {
            let config = match PluginConfig::from_file(&config_file) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse plugin at {:?}: {}", config_file, e);
                    continue;
                }
            };

            if ignored_plugins.contains(&config.plugin.name.as_str()) {
                tracing::debug!("Ignoring plugin {}", config.plugin.name);
                continue;
            }

            match PluginInfo::from_config(
                config,
                &config_file,
                &self.hooks_available,
                self.loader.as_ref(),
            ) {
                Ok(opened) => plugins.push(opened),
                Err(e) => {
                    tracing::warn!("Failed to load plugin at {:?}: {}", config_file, e);
                }
            }
        }

        Ok(plugins)
    }

    /// Hooks implemented by more than one plugin, ordered by hook name.
    pub fn get_status(&self, ignored_plugins: &[&str]) -> HookmanResult<Vec<ConflictStatus>> {
        let plugins = self.get_plugins_available(ignored_plugins)?;
        Ok(conflicts(&plugins))
    }

    /// Fail if any hook is implemented by more than one plugin
    pub fn ensure_is_valid(&self, ignored_plugins: &[&str]) -> HookmanResult<()> {
        let status = self.get_status(ignored_plugins)?;
        check_conflicts(&status)
    }

    /// Bind every hook implemented by the available plugins.
    pub fn get_hook_caller(&self, ignored_plugins: &[&str]) -> HookmanResult<HookCaller> {
        let opened = self.open_plugins(ignored_plugins)?;
        let (plugins, libraries): (Vec<_>, Vec<_>) = opened.into_iter().unzip();
        check_conflicts(&conflicts(&plugins))?;

        let mut caller = HookCaller::new();
        for (plugin, library) in plugins.iter().zip(libraries) {
            for hook in &plugin.hooks_implemented {
                let Some(full_hook_name) = self.hooks_available.get(hook) else {
                    continue;
                };
                if let Some(address) = loader::function_address(library.as_ref(), full_hook_name) {
                    caller.bind(HookFunction::new(hook, &plugin.name, address));
                }
            }

            caller.retain_library(library);
        }

        tracing::debug!(
            "Hook caller ready: {} hook(s) from {} plugin(s)",
            caller.len(),
            plugins.len()
        );
        Ok(caller)
    }
}

fn conflicts(plugins: &[PluginInfo]) -> Vec<ConflictStatus> {
    let mut hooks_status: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for plugin in plugins {
        for hook in &plugin.hooks_implemented {
            hooks_status
                .entry(hook.as_str())
                .or_default()
                .push(plugin.name.clone());
        }
    }

    hooks_status
        .into_iter()
        .filter(|(_, plugins)| plugins.len() > 1)
        .map(|(hook, plugins)| ConflictStatus {
            hook: hook.to_string(),
            plugins,
        })
        .collect()
}

fn check_conflicts(status: &[ConflictStatus]) -> HookmanResult<()> {
    if status.is_empty() {
        return Ok(());
    }

    let details = status
        .iter()
        .map(ConflictStatus::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(HookmanError::ConflictBetweenPlugins(format!(
        "Could not get a hook caller due to existing conflict between installed plugins: {}",
        details
    )))
}

fn extract_archive<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    destination: &Path,
) -> HookmanResult<()> {
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let relative = entry.enclosed_name().ok_or_else(|| {
            HookmanError::InvalidPluginFile(format!("Unsafe path in plugin file: {}", entry.name()))
        })?;
        let outpath = destination.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&outpath)?;
        std::io::copy(&mut entry, &mut outfile)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}
