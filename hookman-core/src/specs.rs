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

//! Hook specifications
//!
//! Declares the hooks a host application exposes to plugins. Specs are
//! usually kept in a TOML file next to the host:
//!
//! ```toml
//! project_name = "acme"
//! version = "1"
//!
//! [[hooks]]
//! name = "friction_factor"
//! doc = "Compute the friction factor for a pipe section"
//! returns = "double"
//! args = [
//!     { name = "section", type = "int" },
//!     { name = "velocity", type = "double" },
//! ]
//! ```

use crate::error::{HookmanError, HookmanResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::str::FromStr;

/// A single hook argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookArg {
    /// Argument name
    pub name: String,
    /// C type of the argument
    #[serde(rename = "type", default)]
    pub ty: Option<String>,
}

impl HookArg {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty.into()),
        }
    }
}

/// Signature and documentation of one hook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpec {
    /// Hook name, used for the exported symbol
    pub name: String,
    /// Arguments in call order
    #[serde(default)]
    pub args: Vec<HookArg>,
    /// C return type
    #[serde(default = "default_return_type")]
    pub returns: String,
    /// Documentation shown in generated headers
    #[serde(rename = "doc", default)]
    pub documentation: Option<String>,
}

fn default_return_type() -> String {
    "void".to_string()
}

impl HookSpec {
    /// Create a hook returning `void`
    pub fn new(name: impl Into<String>, args: Vec<HookArg>, documentation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args,
            returns: default_return_type(),
            documentation: Some(documentation.into()),
        }
    }

    /// Set the C return type
    pub fn with_returns(mut self, returns: impl Into<String>) -> Self {
        self.returns = returns.into();
        self
    }

    /// Check that the hook can be exposed to plugins.
    pub fn validate(&self) -> HookmanResult<()> {
        if !is_c_identifier(&self.name) {
            return Err(HookmanError::InvalidHookSpec(format!(
                "Hook name '{}' is not a valid C identifier",
                self.name
            )));
        }

        if self.args.is_empty() {
            return Err(HookmanError::InvalidHookSpec(
                "It's not possible to create a hook without argument".into(),
            ));
        }

        let all_typed = self
            .args
            .iter()
            .all(|arg| arg.ty.as_deref().is_some_and(|ty| !ty.trim().is_empty()));
        if !all_typed {
            return Err(HookmanError::InvalidHookSpec(
                "All hooks arguments must have the type informed".into(),
            ));
        }

        for arg in &self.args {
            if !is_c_identifier(&arg.name) {
                return Err(HookmanError::InvalidHookSpec(format!(
                    "Argument '{}' of hook '{}' is not a valid C identifier",
                    arg.name, self.name
                )));
            }
        }

        if self.returns.trim().is_empty() {
            return Err(HookmanError::InvalidHookSpec(format!(
                "Hook '{}' has an empty return type",
                self.name
            )));
        }

        let documented = self
            .documentation
            .as_deref()
            .is_some_and(|doc| !doc.trim().is_empty());
        if !documented {
            return Err(HookmanError::InvalidHookSpec(
                "All hooks must have documentation".into(),
            ));
        }

        Ok(())
    }

    /// C parameter list, e.g. `int section, double velocity`
    pub fn c_parameters(&self) -> String {
        self.args
            .iter()
            .map(|arg| format!("{} {}", arg.ty.as_deref().unwrap_or_default().trim(), arg.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The set of hooks a project exposes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookSpecs {
    /// Identifies the project and prefixes every hook symbol
    pub project_name: String,
    /// Spec version, bumped whenever a hook is added or changed
    pub version: String,
    /// Hooks available to plugins
    pub hooks: Vec<HookSpec>,
}

impl HookSpecs {
    /// Build and validate a spec
    pub fn new(
        project_name: impl Into<String>,
        version: impl Into<String>,
        hooks: Vec<HookSpec>,
    ) -> HookmanResult<Self> {
        let specs = Self {
            project_name: project_name.into(),
            version: version.into(),
            hooks,
        };
        specs.validate()?;
        Ok(specs)
    }

    /// Load specs from a TOML file
    pub fn from_file(path: &Path) -> HookmanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HookmanError::SpecsParseError(format!("{}: {}", path.display(), e))
        })?;
        content.parse()
    }

    /// Validate project identity and every hook
    pub fn validate(&self) -> HookmanResult<()> {
        if !is_c_identifier(&self.project_name) {
            return Err(HookmanError::InvalidHookSpec(format!(
                "Project name '{}' is not a valid C identifier",
                self.project_name
            )));
        }

        if self.version.is_empty()
            || !self.version.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(HookmanError::InvalidHookSpec(format!(
                "Version '{}' can only contain alphanumeric characters and underscores",
                self.version
            )));
        }

        let mut seen = HashSet::new();
        for hook in &self.hooks {
            hook.validate()?;
            if !seen.insert(hook.name.to_lowercase()) {
                return Err(HookmanError::InvalidHookSpec(format!(
                    "Duplicate hook name: '{}'",
                    hook.name
                )));
            }
        }

        Ok(())
    }

    /// Exported symbol implementing `hook_name`
    pub fn full_hook_name(&self, hook_name: &str) -> String {
        format!(
            "{}_v{}_{}",
            self.project_name.to_lowercase(),
            self.version,
            hook_name.to_lowercase()
        )
    }

    /// Map of hook name to exported symbol
    pub fn hooks_available(&self) -> BTreeMap<String, String> {
        self.hooks
            .iter()
            .map(|hook| (hook.name.to_lowercase(), self.full_hook_name(&hook.name)))
            .collect()
    }

    /// Find a hook by name (case-insensitive)
    pub fn get(&self, hook_name: &str) -> Option<&HookSpec> {
        self.hooks
            .iter()
            .find(|hook| hook.name.eq_ignore_ascii_case(hook_name))
    }
}

impl FromStr for HookSpecs {
    type Err = HookmanError;

    /// Parse specs from a TOML string
    fn from_str(content: &str) -> HookmanResult<Self> {
        let specs: HookSpecs =
            toml::from_str(content).map_err(|e| HookmanError::SpecsParseError(e.to_string()))?;
        specs.validate()?;
        Ok(specs)
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_SPECS: &str = r#"
project_name = "Acme"
version = "1"

[[hooks]]
name = "Friction_Factor"
doc = "Compute the friction factor"
returns = "double"
args = [
    { name = "section", type = "int" },
    { name = "velocity", type = "double" },
]

[[hooks]]
name = "env_temperature"
doc = "Environment temperature"
args = [{ name = "t", type = "double*" }]
"#;

    #[test]
    fn test_parse_specs() {
        let specs = HookSpecs::from_str(SAMPLE_SPECS).unwrap();
        assert_eq!(specs.project_name, "Acme");
        assert_eq!(specs.hooks.len(), 2);
        assert_eq!(specs.hooks[0].returns, "double");
        assert_eq!(specs.hooks[1].returns, "void");
        assert_eq!(specs.hooks[0].c_parameters(), "int section, double velocity");
    }

    #[test]
    fn test_hooks_available() {
        let specs = HookSpecs::from_str(SAMPLE_SPECS).unwrap();
        let available = specs.hooks_available();

        assert_eq!(
            available.get("friction_factor").map(String::as_str),
            Some("acme_v1_friction_factor")
        );
        assert_eq!(
            available.get("env_temperature").map(String::as_str),
            Some("acme_v1_env_temperature")
        );
    }

    #[test]
    fn test_hook_without_arguments() {
        let hook = HookSpec::new("no_args", vec![], "Docs");
        let err = HookSpecs::new("acme", "1", vec![hook]).unwrap_err();
        assert!(err.to_string().contains("without argument"));
    }

    #[test]
    fn test_hook_with_untyped_argument() {
        let hook = HookSpec::new(
            "partial",
            vec![
                HookArg::new("a", "int"),
                HookArg {
                    name: "b".into(),
                    ty: None,
                },
            ],
            "Docs",
        );
        let err = HookSpecs::new("acme", "1", vec![hook]).unwrap_err();
        assert!(err.to_string().contains("must have the type informed"));
    }

    #[test]
    fn test_hook_without_documentation() {
        let mut hook = HookSpec::new("undocumented", vec![HookArg::new("a", "int")], "");
        let err = hook.validate().unwrap_err();
        assert!(err.to_string().contains("must have documentation"));

        hook.documentation = None;
        assert!(hook.validate().is_err());
    }

    #[test]
    fn test_duplicate_hook_names() {
        let hooks = vec![
            HookSpec::new("hook", vec![HookArg::new("a", "int")], "First"),
            HookSpec::new("HOOK", vec![HookArg::new("a", "int")], "Second"),
        ];
        let err = HookSpecs::new("acme", "1", hooks).unwrap_err();
        assert!(matches!(err, HookmanError::InvalidHookSpec(_)));
    }

    #[test]
    fn test_invalid_project_name() {
        let hooks = vec![HookSpec::new("hook", vec![HookArg::new("a", "int")], "Docs")];
        assert!(HookSpecs::new("my project", "1", hooks.clone()).is_err());
        assert!(HookSpecs::new("1acme", "1", hooks.clone()).is_err());
        assert!(HookSpecs::new("acme", "1.0", hooks).is_err());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let specs = HookSpecs::from_str(SAMPLE_SPECS).unwrap();
        assert!(specs.get("FRICTION_FACTOR").is_some());
        assert!(specs.get("missing").is_none());
    }
}
