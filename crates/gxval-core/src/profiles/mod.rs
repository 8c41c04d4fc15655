//! Declarative profile definitions and their compiled rule sets
//!
//! A profile is a YAML document with three recognized options:
//!
//! ```yaml
//! name: statement_only
//! description: Only a 'statement' group
//! rules:
//!   topLevel:
//!     required: [statement]
//!     allowed: [statement]
//!   groups:
//!     statement:
//!       fields:
//!         required: [meters, charges]
//! ```
//!
//! Any other key is rejected when the definition is parsed.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::error::{GxvalError, Result};
use crate::issue::ValidationIssue;
use crate::rules::{
    run_rules, AllowedTopLevelKeys, RequiredFields, RequiredTopLevelKeys, Rule, RuleContext,
};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashSet;

/// Profiles shipped with the crate as `(name, definition)`
pub const BUILTIN_PROFILES: &[(&str, &str)] = &[(
    "statement_only",
    include_str!("../../profiles/statement_only.yaml"),
)];

/// Parsed profile definition, before compilation
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub rules: RulesSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct RulesSpec {
    #[serde(default)]
    pub top_level: TopLevelSpec,
    #[serde(default)]
    pub groups: IndexMap<String, GroupSpec>,
}

/// `topLevel` options
///
/// `allowed: None` means no restriction; `Some(vec![])` allows nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TopLevelSpec {
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub allowed: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSpec {
    #[serde(default)]
    pub fields: FieldsSpec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldsSpec {
    #[serde(default)]
    pub required: Vec<String>,
}

impl ProfileSpec {
    /// Parse a YAML profile definition
    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check the definition and turn it into rules
    ///
    /// Rules are emitted in a fixed order: required top-level keys, allowed
    /// top-level keys, then required fields per group in definition order.
    pub fn compile(self) -> Result<Profile> {
        self.check()?;

        let mut rules: Vec<Box<dyn Rule>> = Vec::new();
        let top_level = self.rules.top_level;
        if !top_level.required.is_empty() {
            rules.push(Box::new(RequiredTopLevelKeys::new(top_level.required)));
        }
        if let Some(allowed) = top_level.allowed {
            rules.push(Box::new(AllowedTopLevelKeys::new(allowed)));
        }
        for (group, spec) in self.rules.groups {
            if !spec.fields.required.is_empty() {
                rules.push(Box::new(RequiredFields::new(group, spec.fields.required)));
            }
        }

        Ok(Profile {
            name: self.name,
            description: self.description,
            version: self.version,
            rules,
        })
    }

    fn check(&self) -> Result<()> {
        let valid_name = !self.name.is_empty()
            && self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid_name {
            return Err(GxvalError::invalid_profile(
                &self.name,
                "name must be non-empty and use only letters, digits, '_' or '-'",
            ));
        }

        let top_level = &self.rules.top_level;
        self.check_keys("topLevel.required", &top_level.required)?;
        if let Some(allowed) = &top_level.allowed {
            self.check_keys("topLevel.allowed", allowed)?;
        }
        for (group, spec) in &self.rules.groups {
            if group.is_empty() {
                return Err(GxvalError::invalid_profile(
                    &self.name,
                    "group names under 'groups' must be non-empty",
                ));
            }
            self.check_keys(&format!("groups.{}.fields.required", group), &spec.fields.required)?;
        }
        Ok(())
    }

    fn check_keys(&self, option: &str, keys: &[String]) -> Result<()> {
        let mut seen = HashSet::new();
        for key in keys {
            if key.is_empty() {
                return Err(GxvalError::invalid_profile(
                    &self.name,
                    format!("'{}' contains an empty key", option),
                ));
            }
            if !seen.insert(key.as_str()) {
                return Err(GxvalError::invalid_profile(
                    &self.name,
                    format!("'{}' lists '{}' more than once", option, key),
                ));
            }
        }
        Ok(())
    }
}

/// Named bundle of compiled profile rules
#[derive(Debug)]
pub struct Profile {
    name: String,
    description: String,
    version: Option<String>,
    rules: Vec<Box<dyn Rule>>,
}

impl Profile {
    /// Parse and compile a YAML definition in one step
    pub fn from_yaml(text: &str) -> Result<Self> {
        ProfileSpec::from_yaml(text)?.compile()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule of this profile
    pub fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        run_rules(&self.rules, ctx)
    }
}
