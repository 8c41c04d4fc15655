//! Validation command handler

use super::utils::{build_registry, read_document};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use gxval_core::{ValidationResult, Validator};
use tracing::{debug, info, instrument, warn};

/// Handle the validate command
#[instrument(skip(config, output), fields(file = %args.file.display(), profile = ?args.profile))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("file: {}", args.file.display()));

    let registry = {
        let _registry_timer = Timer::new("registry_loading");
        build_registry(config)?
    };
    let profile = config.resolve_profile(args.profile.as_deref());
    debug!(profile = ?profile, "Resolved profile");

    output.info(&format!("Validating {}", args.file.display()))?;
    let text = read_document(&args.file)?;
    debug!("File read successfully, {} bytes", text.len());

    let result = {
        let _validation_timer = Timer::new("pipeline");
        Validator::new(&registry).validate(&text, profile)?
    };

    output.validation_result(&result)?;
    check_outcome(&result, args.strict_warnings)
}

/// Map a result onto the command outcome
fn check_outcome(result: &ValidationResult, strict_warnings: bool) -> Result<()> {
    let failed = !result.success() || (strict_warnings && result.warning_count() > 0);
    if failed {
        warn!(
            errors = result.error_count(),
            warnings = result.warning_count(),
            "Document did not pass"
        );
        return Err(Error::ValidationFailed {
            errors: result.error_count(),
            warnings: result.warning_count(),
        });
    }

    info!("Validation completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use gxval_core::validate;
    use std::path::PathBuf;

    const VALID: &str = "statement:\n  prompt:\n    instructions: Extract the statement\n  fields:\n    meters:\n      prompt:\n        identifiers: [Meter]\n        type: str\n    charges:\n      prompt:\n        identifiers: [Charges]\n        type: float\n";

    const WITH_WARNING: &str = "statement:\n  fields:\n    meters:\n      prompt:\n        identifiers: [Meter]\n        type: str\n        required: true\n";

    fn quiet_output() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()))
    }

    fn args(file: PathBuf, profile: Option<&str>, strict_warnings: bool) -> ValidateArgs {
        ValidateArgs {
            file,
            profile: profile.map(str::to_string),
            strict_warnings,
        }
    }

    fn no_dirs() -> Config {
        Config {
            profile_dirs: Vec::new(),
            ..Config::default()
        }
    }

    #[test]
    fn test_warnings_fail_only_when_strict() {
        let result = validate(WITH_WARNING, None).unwrap();
        assert!(result.success());
        assert_eq!(result.warning_count(), 1);
        assert!(check_outcome(&result, false).is_ok());

        let err = check_outcome(&result, true).unwrap_err();
        assert!(matches!(
            err,
            Error::ValidationFailed {
                errors: 0,
                warnings: 1
            }
        ));
    }

    #[test]
    fn test_valid_file_with_profile() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("statement.yaml");
        std::fs::write(&file, VALID).unwrap();

        let mut output = quiet_output();
        handle_validate(args(file, Some("statement_only"), true), &no_dirs(), &mut output).unwrap();
    }

    #[test]
    fn test_default_profile_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("other.yaml");
        std::fs::write(&file, "other: {}\n").unwrap();

        let config = Config {
            default_profile: Some("statement_only".to_string()),
            ..no_dirs()
        };
        let mut output = quiet_output();
        let err = handle_validate(args(file.clone(), None, false), &config, &mut output).unwrap_err();
        assert_eq!(err.exit_code(), 1);

        handle_validate(args(file, None, false), &no_dirs(), &mut output).unwrap();
    }

    #[test]
    fn test_unknown_profile_and_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("doc.yaml");
        std::fs::write(&file, VALID).unwrap();
        let mut output = quiet_output();

        let err = handle_validate(args(file, Some("nope"), false), &no_dirs(), &mut output).unwrap_err();
        assert!(matches!(err, Error::Core(_)));

        let err = handle_validate(
            args(dir.path().join("absent.yaml"), None, false),
            &no_dirs(),
            &mut output,
        )
        .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_profile_from_configured_directory() {
        let dir = tempfile::tempdir().unwrap();
        let profiles = dir.path().join("profiles");
        std::fs::create_dir(&profiles).unwrap();
        std::fs::write(
            profiles.join("summary.yaml"),
            "name: summary\nrules:\n  topLevel:\n    required: [summary]\n",
        )
        .unwrap();
        let file = dir.path().join("doc.yaml");
        std::fs::write(&file, VALID).unwrap();

        let config = Config {
            profile_dirs: vec![profiles],
            ..Config::default()
        };
        let mut output = quiet_output();
        let err = handle_validate(args(file, Some("summary"), false), &config, &mut output).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { errors: 1, .. }));
    }
}
