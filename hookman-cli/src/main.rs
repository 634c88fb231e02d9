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

//! Hookman CLI
//!
//! Command-line interface for installing, inspecting and packaging plugins.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hookman::{
    generate_hook_specs_header, generate_plugin_template, package_plugin, HookMan,
    HookSpecs, HookmanConfig, PluginTemplate,
};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "hookman")]
#[command(about = "Hookman - native plugin manager", long_about = None)]
struct Cli {
    /// Config file (defaults to ./hookman.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hook specs file, overrides the config
    #[arg(short, long, global = true)]
    specs: Option<PathBuf>,

    /// Plugin directory, may be repeated; overrides the config
    #[arg(short = 'd', long = "plugin-dir", global = true)]
    plugin_dirs: Vec<PathBuf>,

    /// Plugin to ignore, may be repeated; added to the config
    #[arg(short, long = "ignore", global = true)]
    ignored: Vec<String>,

    /// Verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a .hmplugin archive
    Install {
        /// Path to the .hmplugin file
        path: PathBuf,

        /// Destination plugin directory (defaults to the first one)
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Remove an installed plugin
    Remove {
        /// Plugin name
        name: String,
    },

    /// List installed plugins
    List,

    /// Report hooks implemented by more than one plugin
    Status,

    /// Generate the C header for the hook specs
    Header {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create a new plugin from a template
    NewPlugin {
        /// Plugin name (also used as directory and library name)
        name: String,

        /// Output directory (defaults to current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Author name
        #[arg(long)]
        author: Option<String>,

        /// Author email
        #[arg(long)]
        email: Option<String>,

        /// Plugin description
        #[arg(long)]
        description: Option<String>,
    },

    /// Package a built plugin into a .hmplugin archive
    Package {
        /// Path to the plugin directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (defaults to current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = HookmanConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if cli.specs.is_some() {
        config.specs_file = cli.specs.clone();
    }
    if !cli.plugin_dirs.is_empty() {
        config.plugin_dirs = cli.plugin_dirs.clone();
    }
    config.ignored_plugins.extend(cli.ignored.iter().cloned());
    debug!("Using configuration: {:?}", config);

    match &cli.command {
        Commands::Package { path, output } => {
            let output = output.clone().unwrap_or_else(|| PathBuf::from("."));
            let package = package_plugin(path, &output)
                .with_context(|| format!("Failed to package plugin at {}", path.display()))?;

            if cli.json {
                println!("{}", serde_json::json!({ "package": package }));
            } else {
                println!("✓ Packaged {}", package.display());
            }
            return Ok(());
        }
        Commands::Header { output } => {
            let specs = load_specs(&config)?;
            let header = generate_hook_specs_header(&specs);
            match output {
                Some(path) => {
                    std::fs::write(path, header)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("✓ Wrote {}", path.display());
                }
                None => print!("{}", header),
            }
            return Ok(());
        }
        Commands::NewPlugin {
            name,
            output,
            author,
            email,
            description,
        } => {
            let specs = load_specs(&config)?;
            let mut template = PluginTemplate::new(name.clone());
            template.author = author.clone().unwrap_or_default();
            template.email = email.clone().unwrap_or_default();
            template.description = description.clone();

            let output = output.clone().unwrap_or_else(|| PathBuf::from("."));
            let dir = generate_plugin_template(&specs, &template, &output)
                .context("Failed to create plugin template")?;
            println!("✓ Created plugin {} at {}", name, dir.display());
            println!("  Build the shared library into {}", dir.join("artifacts").display());
            return Ok(());
        }
        _ => {}
    }

    let specs = load_specs(&config)?;
    let hookman = HookMan::new(specs, config.plugin_dirs.clone());
    let ignored = config.ignored();

    match cli.command {
        Commands::Install { path, dest } => {
            let dest = match dest {
                Some(dest) => dest,
                None => config
                    .plugin_dirs
                    .first()
                    .cloned()
                    .context("No plugin directory configured")?,
            };

            println!("Installing plugin from {}...", path.display());
            let installed = hookman
                .install_plugin(&path, &dest)
                .context("Installation failed")?;

            if cli.json {
                println!("{}", serde_json::json!({ "installed": installed }));
            } else {
                println!("✓ Installed into {}", installed.display());
            }
        }

        Commands::Remove { name } => {
            let removed = hookman
                .remove_plugin(&name)
                .with_context(|| format!("Failed to remove {}", name))?;

            if cli.json {
                println!("{}", serde_json::json!({ "removed": removed }));
            } else {
                println!("✓ Removed {} ({})", name, removed.display());
            }
        }

        Commands::List => {
            let plugins = hookman.get_plugins_available(&ignored)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&plugins)?);
            } else if plugins.is_empty() {
                println!("No plugins installed.");
                print_plugin_dirs(hookman.plugin_dirs());
            } else {
                println!("Installed Plugins ({}):", plugins.len());
                println!("{:-<60}", "");
                for plugin in &plugins {
                    println!("{} v{}", plugin.name, plugin.version);
                    if !plugin.author.is_empty() {
                        println!("    Author: {} <{}>", plugin.author, plugin.email);
                    }
                    if let Some(description) = &plugin.description {
                        println!("    Description: {}", description);
                    }
                    println!("    Location: {}", plugin.location.display());
                    if plugin.hooks_implemented.is_empty() {
                        println!("    Hooks: (none)");
                    } else {
                        println!("    Hooks: {}", plugin.hooks_implemented.join(", "));
                    }
                    println!();
                }
            }
        }

        Commands::Status => {
            let status = hookman.get_status(&ignored)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else if status.is_empty() {
                println!("✓ No conflicts between plugins");
            } else {
                println!("✗ {} conflicting hook(s):", status.len());
                for conflict in &status {
                    println!("  - {}", conflict);
                }
                std::process::exit(1);
            }
        }

        Commands::Package { .. } | Commands::Header { .. } | Commands::NewPlugin { .. } => {
            unreachable!() // Handled above
        }
    }

    Ok(())
}

fn load_specs(config: &HookmanConfig) -> Result<HookSpecs> {
    let path = config
        .specs_file
        .as_deref()
        .context("No hook specs file configured (use --specs or specs_file in hookman.toml)")?;
    HookSpecs::from_file(path)
        .with_context(|| format!("Failed to load hook specs from {}", path.display()))
}

fn print_plugin_dirs(dirs: &[PathBuf]) {
    println!("\nPlugin directories:");
    for dir in dirs {
        println!("  {}", display_dir(dir));
    }
}

fn display_dir(dir: &Path) -> String {
    if dir.is_dir() {
        dir.display().to_string()
    } else {
        format!("{} (missing)", dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "hookman",
            "list",
            "--specs",
            "hooks.toml",
            "-d",
            "/a",
            "--plugin-dir",
            "/b",
            "--ignore",
            "legacy",
            "--json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::List));
        assert_eq!(cli.specs, Some(PathBuf::from("hooks.toml")));
        assert_eq!(cli.plugin_dirs, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        assert_eq!(cli.ignored, vec!["legacy".to_string()]);
        assert!(cli.json);
    }

    #[test]
    fn test_parse_install() {
        let cli = Cli::try_parse_from(["hookman", "install", "p-linux64.hmplugin", "--dest", "/p"])
            .unwrap();

        match cli.command {
            Commands::Install { path, dest } => {
                assert_eq!(path, PathBuf::from("p-linux64.hmplugin"));
                assert_eq!(dest, Some(PathBuf::from("/p")));
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_load_specs_requires_file() {
        let config = HookmanConfig {
            specs_file: None,
            plugin_dirs: vec![],
            ignored_plugins: vec![],
        };
        assert!(load_specs(&config).is_err());
    }
}
