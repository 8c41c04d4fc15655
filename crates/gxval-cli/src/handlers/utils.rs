//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use gxval_core::RuleRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Build the registry: built-in profiles plus definitions from configured directories
///
/// A definition that cannot be read or compiled is skipped with a warning so
/// one broken file does not disable the rest.
pub fn build_registry(config: &Config) -> Result<RuleRegistry> {
    let mut registry = RuleRegistry::with_builtin_profiles()?;

    for dir in &config.profile_dirs {
        if !dir.is_dir() {
            debug!(dir = %dir.display(), "Profile directory not found, skipping");
            continue;
        }
        for path in profile_files(dir)? {
            let loaded = fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|text| Ok(registry.register_profile_yaml(&text)?.name().to_string()));
            match loaded {
                Ok(name) => debug!(profile = %name, path = %path.display(), "Loaded profile"),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping profile definition"),
            }
        }
    }

    Ok(registry)
}

/// YAML files in `dir`, sorted by name so registration order is stable
fn profile_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        if is_yaml && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Check the input exists before reading it
pub fn read_document(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read_to_string(path)?)
}
