//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// gxval - line-located diagnostics for extraction configuration documents
///
/// Checks a YAML document of groups and fields, reporting every problem with
/// a stable code, the path it concerns and the line it was found on.
#[derive(Parser, Debug)]
#[command(
    name = "gxval",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "GXVAL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a configuration document
    Validate(ValidateArgs),

    /// List every issue code with its severity and description
    Rules,

    /// List the registered profiles and the rules they compile to
    Profiles,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the YAML document to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Profile whose extra rules should run
    #[arg(short, long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Treat warnings as failures for the exit status
    #[arg(long)]
    pub strict_warnings: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Human-readable format with colors
    #[default]
    Human,
    /// Compact JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            output: None,
            no_color: false,
            command: Commands::Validate(ValidateArgs {
                file: PathBuf::from("config.yaml"),
                profile: None,
                strict_warnings: false,
            }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 2,
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_validate_arguments() {
        let cli = Cli::parse_from([
            "gxval",
            "-vv",
            "validate",
            "config.yaml",
            "--profile",
            "statement_only",
            "--output",
            "json-pretty",
            "--strict-warnings",
        ]);
        assert_eq!(cli.verbosity_level(), 2);
        assert_eq!(cli.output, Some(OutputFormat::JsonPretty));
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(args.file, PathBuf::from("config.yaml"));
                assert_eq!(args.profile.as_deref(), Some("statement_only"));
                assert!(args.strict_warnings);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["gxval", "-q", "-v", "rules"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_output_format_names() {
        let format: OutputFormat = serde_yaml::from_str("json-pretty").unwrap();
        assert_eq!(format, OutputFormat::JsonPretty);
        assert_eq!(
            OutputFormat::from_str("yaml", true).unwrap(),
            OutputFormat::Yaml
        );
    }
}
