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

//! Plugin-side tooling
//!
//! Generates the C header plugins compile against, scaffolds new plugin
//! folders and packages built plugins into `.hmplugin` archives.

use crate::error::{HookmanError, HookmanResult};
use crate::plugin::{PluginConfig, PluginMetadata};
use crate::specs::HookSpecs;
use crate::{
    current_platform_tag, ARTIFACTS_DIR_NAME, ASSETS_DIR_NAME, PLUGIN_CONFIG_FILENAME,
    PLUGIN_FILE_EXTENSION,
};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Header file name written into plugin templates
pub const HOOK_SPECS_HEADER: &str = "hook_specs.h";

const EXPORT_MACROS: &str = r#"#ifdef _WIN32
    #define HOOKMAN_API_EXP __declspec(dllexport)
#else
    #define HOOKMAN_API_EXP __attribute__((visibility("default")))
#endif

#ifdef __cplusplus
    #define HOOKMAN_FUNC_EXP extern "C"
#else
    #define HOOKMAN_FUNC_EXP
#endif

#define HOOKMAN_API HOOKMAN_FUNC_EXP HOOKMAN_API_EXP

"#;

/// Render the C header declaring every hook of `specs`.
///
/// Each hook becomes a `HOOK_<NAME>(args...)` macro expanding to the exported
/// prototype, so a plugin implements a hook with:
///
/// ```c
/// HOOK_FRICTION_FACTOR(section, v) {
///     return 0.02;
/// }
/// ```
pub fn generate_hook_specs_header(specs: &HookSpecs) -> String {
    let guard = format!("{}_HOOK_SPECS_HEADER_FILE", specs.project_name.to_uppercase());
    let mut header = String::new();

    let _ = writeln!(header, "/* Generated by hookman. Do not edit. */");
    let _ = writeln!(header, "#ifndef {}", guard);
    let _ = writeln!(header, "#define {}", guard);
    header.push('\n');
    header.push_str(EXPORT_MACROS);
    let _ = writeln!(
        header,
        "#define HOOKMAN_PROJECT_NAME \"{}\"",
        specs.project_name.to_lowercase()
    );
    let _ = writeln!(header, "#define HOOKMAN_SPECS_VERSION \"{}\"", specs.version);

    for hook in &specs.hooks {
        header.push('\n');
        if let Some(doc) = hook.documentation.as_deref() {
            let _ = writeln!(header, "/*!");
            for line in doc.trim().lines() {
                let _ = writeln!(header, " * {}", line.trim_end().replace("*/", "* /"));
            }
            let _ = writeln!(header, " */");
        }

        let arg_names = hook
            .args
            .iter()
            .map(|arg| arg.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            header,
            "#define HOOK_{}({}) HOOKMAN_API {} {}({})",
            hook.name.to_uppercase(),
            arg_names,
            hook.returns.trim(),
            specs.full_hook_name(&hook.name),
            hook.c_parameters()
        );
    }

    header.push('\n');
    let _ = writeln!(header, "#endif");
    header
}

/// Identity of a plugin to scaffold
#[derive(Debug, Clone)]
pub struct PluginTemplate {
    pub name: String,
    pub version: String,
    pub author: String,
    pub email: String,
    pub description: Option<String>,
}

impl PluginTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1.0.0".to_string(),
            author: String::new(),
            email: String::new(),
            description: None,
        }
    }

    fn to_config(&self) -> PluginConfig {
        PluginConfig {
            plugin: PluginMetadata {
                name: self.name.clone(),
                version: self.version.clone(),
                author: self.author.clone(),
                email: self.email.clone(),
                shared_lib_name: self.name.clone(),
                description: self.description.clone(),
            },
        }
    }
}

/// Create `<dst_dir>/<name>/` with config, readme, header and a C source
/// holding one commented-out stub per hook.
pub fn generate_plugin_template(
    specs: &HookSpecs,
    template: &PluginTemplate,
    dst_dir: &Path,
) -> HookmanResult<PathBuf> {
    let config = template.to_config();
    config.validate()?;

    let plugin_dir = dst_dir.join(&template.name);
    if plugin_dir.exists() {
        return Err(HookmanError::AlreadyExists(plugin_dir.display().to_string()));
    }

    let assets = plugin_dir.join(ASSETS_DIR_NAME);
    let src = plugin_dir.join("src");
    std::fs::create_dir_all(&assets)?;
    std::fs::create_dir_all(&src)?;
    std::fs::create_dir_all(plugin_dir.join(ARTIFACTS_DIR_NAME))?;

    std::fs::write(assets.join(PLUGIN_CONFIG_FILENAME), config.to_toml()?)?;
    std::fs::write(assets.join("README.md"), plugin_readme(template))?;
    std::fs::write(src.join(HOOK_SPECS_HEADER), generate_hook_specs_header(specs))?;
    std::fs::write(src.join("plugin.c"), plugin_source(specs))?;

    tracing::info!("Created plugin template at {}", plugin_dir.display());
    Ok(plugin_dir)
}

fn plugin_readme(template: &PluginTemplate) -> String {
    let mut readme = format!("# {}\n\n", template.name);
    if let Some(description) = &template.description {
        let _ = writeln!(readme, "{}\n", description);
    }
    let _ = writeln!(readme, "Version: {}", template.version);
    if !template.author.is_empty() {
        let _ = writeln!(readme, "Author: {} <{}>", template.author, template.email);
    }
    readme
}

fn plugin_source(specs: &HookSpecs) -> String {
    let mut source = format!("#include \"{}\"\n", HOOK_SPECS_HEADER);
    for hook in &specs.hooks {
        let arg_names = hook
            .args
            .iter()
            .map(|arg| arg.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = write!(
            source,
            "\n/*\nHOOK_{}({})\n{{\n}}\n*/\n",
            hook.name.to_uppercase(),
            arg_names
        );
    }
    source
}

/// Zip `assets/` and `artifacts/` of a built plugin into
/// `<dst_dir>/<name><platform tag>.hmplugin`.
pub fn package_plugin(plugin_dir: &Path, dst_dir: &Path) -> HookmanResult<PathBuf> {
    let config =
        PluginConfig::from_file(&plugin_dir.join(ASSETS_DIR_NAME).join(PLUGIN_CONFIG_FILENAME))?;

    let shared_lib = plugin_dir
        .join(ARTIFACTS_DIR_NAME)
        .join(config.shared_library_filename());
    if !shared_lib.is_file() {
        return Err(HookmanError::InvalidPluginFile(format!(
            "Shared library not found: {}",
            shared_lib.display()
        )));
    }

    std::fs::create_dir_all(dst_dir)?;
    let output = dst_dir.join(format!(
        "{}{}.{}",
        config.plugin.name,
        current_platform_tag(),
        PLUGIN_FILE_EXTENSION
    ));

    let mut zip = ZipWriter::new(File::create(&output)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for dir_name in [ASSETS_DIR_NAME, ARTIFACTS_DIR_NAME] {
        add_dir_to_zip(&mut zip, plugin_dir, &plugin_dir.join(dir_name), options)?;
    }
    zip.finish()?;

    tracing::info!(
        "Packaged plugin {} v{} into {}",
        config.plugin.name,
        config.plugin.version,
        output.display()
    );
    Ok(output)
}

/// Add every file under `dir` to the archive, named relative to `root`
fn add_dir_to_zip<W: Write + std::io::Seek>(
    zip: &mut ZipWriter<W>,
    root: &Path,
    dir: &Path,
    options: SimpleFileOptions,
) -> HookmanResult<()> {
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).map_err(|e| {
            HookmanError::InvalidPluginFile(format!("{}: {}", entry.path().display(), e))
        })?;
        let name = relative
            .iter()
            .map(|part| part.to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        zip.start_file(name, options)?;
        let mut file = File::open(entry.path())?;
        std::io::copy(&mut file, zip)?;
    }
    Ok(())
}
