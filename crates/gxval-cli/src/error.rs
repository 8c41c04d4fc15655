//! Error types and handling for the CLI
//!
//! Runtime failures are errors here; a document that merely fails validation
//! surfaces as [`Error::ValidationFailed`] so it maps onto its own exit code.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from gxval-core (unknown or invalid profile)
    #[error("{0}")]
    Core(#[from] gxval_core::GxvalError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The document was checked and did not pass
    #[error("Validation failed with {errors} error(s) and {warnings} warning(s)")]
    ValidationFailed { errors: usize, warnings: usize },

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ValidationFailed { .. } => 1,
            Self::Io(_) => 2,
            Self::Core(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::Config(_) => 5,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(
            self,
            Self::Core(gxval_core::GxvalError::UnknownProfile { .. })
        )
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gxval_core::GxvalError;

    #[test]
    fn test_exit_codes_are_distinct_from_success() {
        let errors = [
            Error::ValidationFailed {
                errors: 1,
                warnings: 0,
            },
            Error::FileNotFound {
                path: PathBuf::from("missing.yaml"),
            },
            Error::config("bad"),
            Error::other("boom"),
        ];
        for error in &errors {
            assert_ne!(error.exit_code(), 0);
        }
        assert_eq!(errors[0].exit_code(), 1);
    }

    #[test]
    fn test_unknown_profile_shows_help() {
        let error = Error::from(GxvalError::unknown_profile(
            "nope",
            vec!["statement_only".to_string()],
        ));
        assert!(error.should_show_help());
        assert_eq!(error.exit_code(), 3);
        assert!(!Error::other("x").should_show_help());
    }

    #[test]
    fn test_format_error_without_color() {
        let error = Error::FileNotFound {
            path: PathBuf::from("a.yaml"),
        };
        assert_eq!(format_error(&error, false), "Error: File not found: a.yaml");
    }
}
