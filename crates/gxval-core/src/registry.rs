//! Rule registry: core rules plus named profiles
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::error::{GxvalError, Result};
use crate::profiles::{Profile, BUILTIN_PROFILES};
use crate::rules::{core_rules, Rule};
use indexmap::IndexMap;
use std::sync::OnceLock;
use tracing::{debug, error};

static BUILTIN: OnceLock<RuleRegistry> = OnceLock::new();

/// Core rules and the profiles that can be selected by name
///
/// The process-wide instance from [`RuleRegistry::builtin`] is read-only;
/// build a fresh registry with [`RuleRegistry::new`] to add profiles.
#[derive(Debug)]
pub struct RuleRegistry {
    core: Vec<Box<dyn Rule>>,
    profiles: IndexMap<String, Profile>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleRegistry {
    /// Registry with the core rules and no profiles
    pub fn new() -> Self {
        Self {
            core: core_rules(),
            profiles: IndexMap::new(),
        }
    }

    /// Registry with the core rules and every built-in profile
    pub fn with_builtin_profiles() -> Result<Self> {
        let mut registry = Self::new();
        for (_, text) in BUILTIN_PROFILES {
            registry.register_profile_yaml(text)?;
        }
        Ok(registry)
    }

    /// Shared registry with the built-in profiles, initialized on first use
    pub fn builtin() -> &'static Self {
        BUILTIN.get_or_init(|| {
            Self::with_builtin_profiles().unwrap_or_else(|e| {
                error!(error = %e, "built-in profile failed to compile");
                Self::new()
            })
        })
    }

    pub fn core_rules(&self) -> &[Box<dyn Rule>] {
        &self.core
    }

    /// Add a compiled profile; names must be unique
    pub fn register_profile(&mut self, profile: Profile) -> Result<&Profile> {
        if self.profiles.contains_key(profile.name()) {
            return Err(GxvalError::invalid_profile(
                profile.name(),
                "a profile with this name is already registered",
            ));
        }
        debug!(
            profile = profile.name(),
            rules = profile.rules().len(),
            "registered profile"
        );
        let (index, _) = self.profiles.insert_full(profile.name().to_string(), profile);
        Ok(&self.profiles[index])
    }

    /// Parse, compile and register a YAML profile definition
    pub fn register_profile_yaml(&mut self, text: &str) -> Result<&Profile> {
        let profile = Profile::from_yaml(text)?;
        self.register_profile(profile)
    }

    /// Registered profile names in registration order
    pub fn profile_names(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    pub fn has_profile(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    /// Look up a profile, failing with the list of known names
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| GxvalError::unknown_profile(name, self.profile_names()))
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Profile> {
        self.profiles.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_statement_only() {
        let registry = RuleRegistry::builtin();
        assert!(registry.has_profile("statement_only"));
        assert_eq!(registry.core_rules().len(), 6);
    }

    #[test]
    fn test_new_registry_has_no_profiles() {
        let registry = RuleRegistry::new();
        assert!(registry.profile_names().is_empty());
        let err = registry.profile("statement_only").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown profile 'statement_only'. Available profiles: "
        );
    }

    #[test]
    fn test_register_custom_profile() {
        let mut registry = RuleRegistry::with_builtin_profiles().unwrap();
        let profile = registry
            .register_profile_yaml("name: summary_only\nrules:\n  topLevel:\n    required: [summary]\n")
            .unwrap();
        assert_eq!(profile.name(), "summary_only");
        assert_eq!(
            registry.profile_names(),
            vec!["statement_only".to_string(), "summary_only".to_string()]
        );
    }

    #[test]
    fn test_duplicate_profile_name_rejected() {
        let mut registry = RuleRegistry::with_builtin_profiles().unwrap();
        let err = registry
            .register_profile_yaml("name: statement_only\n")
            .unwrap_err();
        assert_eq!(err.profile_name(), Some("statement_only"));
        assert_eq!(registry.profile_names().len(), 1);
    }

    #[test]
    fn test_unknown_profile_lists_available() {
        let err = RuleRegistry::builtin().profile("nope").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unknown profile 'nope'. Available profiles: statement_only"
        );
    }
}
