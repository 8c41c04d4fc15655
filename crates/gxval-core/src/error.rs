//! Configuration errors surfaced before any pipeline state is created
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Result type for fallible gxval operations
pub type Result<T> = std::result::Result<T, GxvalError>;

/// Failures that are not validation issues
///
/// Problems in the validated document are reported as
/// [`ValidationIssue`](crate::ValidationIssue) data; this type only covers
/// misuse by the caller, such as selecting a profile that does not exist.
#[derive(Error, Debug)]
pub enum GxvalError {
    /// Profile name not present in the registry
    #[error("Unknown profile '{name}'. Available profiles: {}", available.join(", "))]
    UnknownProfile { name: String, available: Vec<String> },

    /// Profile definition parsed but is not usable
    #[error("Invalid profile '{name}': {reason}")]
    InvalidProfile { name: String, reason: String },

    /// Profile definition is not valid YAML or has unrecognized options
    #[error("Failed to parse profile definition: {source}")]
    ProfileParse {
        #[from]
        source: serde_yaml::Error,
    },
}

impl GxvalError {
    /// Create an unknown profile error listing the registered names
    pub fn unknown_profile<N: Into<String>>(name: N, available: Vec<String>) -> Self {
        Self::UnknownProfile {
            name: name.into(),
            available,
        }
    }

    /// Create an invalid profile error
    pub fn invalid_profile<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidProfile {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Profile name this error refers to, if any
    pub fn profile_name(&self) -> Option<&str> {
        match self {
            Self::UnknownProfile { name, .. } | Self::InvalidProfile { name, .. } => Some(name),
            Self::ProfileParse { .. } => None,
        }
    }
}
