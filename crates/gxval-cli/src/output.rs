//! Output formatting and display utilities
//!
//! This module renders validation results, the rule catalogue and the
//! profile list in human, JSON, pretty JSON and YAML formats.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use gxval_core::{IssueCode, IssuePhase, Profile, Severity, ValidationIssue, ValidationResult};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// One row of the rule catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleEntry {
    pub code: IssueCode,
    pub severity: Severity,
    pub phase: &'static str,
    pub description: &'static str,
}

impl From<IssueCode> for RuleEntry {
    fn from(code: IssueCode) -> Self {
        Self {
            code,
            severity: code.severity(),
            phase: phase_name(code.phase()),
            description: code.description(),
        }
    }
}

/// Summary of a registered profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileEntry {
    pub name: String,
    pub description: String,
    pub version: Option<String>,
    pub rules: Vec<String>,
}

impl From<&Profile> for ProfileEntry {
    fn from(profile: &Profile) -> Self {
        Self {
            name: profile.name().to_string(),
            description: profile.description().to_string(),
            version: profile.version().map(str::to_string),
            rules: profile
                .rules()
                .iter()
                .map(|rule| format!("{}: {}", rule.code(), rule.description()))
                .collect(),
        }
    }
}

fn phase_name(phase: IssuePhase) -> &'static str {
    match phase {
        IssuePhase::Syntax => "syntax",
        IssuePhase::Load => "load",
        IssuePhase::Core => "core",
        IssuePhase::Profile => "profile",
    }
}

/// Trait for formatting output in different formats
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation result with specialized handling
    fn format_validation_result(&self, result: &ValidationResult, use_color: bool)
        -> Result<String>;

    /// Format the rule catalogue
    fn format_rules(&self, rules: &[RuleEntry], use_color: bool) -> Result<String>;

    /// Format the profile list
    fn format_profiles(&self, profiles: &[ProfileEntry], use_color: bool) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }

    fn format_validation_result(
        &self,
        result: &ValidationResult,
        use_color: bool,
    ) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_result_human(result, use_color)),
            _ => self.format(result),
        }
    }

    fn format_rules(&self, rules: &[RuleEntry], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_rules_human(rules, use_color)),
            _ => self.format(&rules),
        }
    }

    fn format_profiles(&self, profiles: &[ProfileEntry], use_color: bool) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_profiles_human(profiles, use_color)),
            _ => self.format(&profiles),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message (human format only)
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a validation result in the configured format
    ///
    /// Machine formats are always written, even in quiet mode; quiet human
    /// output keeps only the summary line.
    pub fn validation_result(&mut self, result: &ValidationResult) -> Result<()> {
        trace!(issues = result.issues().len(), format = ?self.format, "Rendering result");

        if self.quiet && self.format == OutputFormat::Human {
            let summary = summary_line(result, self.use_color);
            return self.writeln(&summary);
        }

        let formatted = self.format.format_validation_result(result, self.use_color)?;
        self.finish(&formatted)
    }

    /// Write the rule catalogue
    pub fn rules(&mut self, rules: &[RuleEntry]) -> Result<()> {
        let formatted = self.format.format_rules(rules, self.use_color)?;
        self.finish(&formatted)
    }

    /// Write the profile list
    pub fn profiles(&mut self, profiles: &[ProfileEntry]) -> Result<()> {
        let formatted = self.format.format_profiles(profiles, self.use_color)?;
        self.finish(&formatted)
    }

    fn finish(&mut self, formatted: &str) -> Result<()> {
        match self.format {
            // YAML already ends with a newline
            OutputFormat::Yaml => self.write(formatted),
            _ => self.writeln(formatted.trim_end_matches('\n')),
        }
    }
}

fn summary_line(result: &ValidationResult, use_color: bool) -> String {
    let counts = format!(
        "({} errors, {} warnings)",
        result.error_count(),
        result.warning_count()
    );
    let verdict = if result.success() {
        "✓ Validation passed"
    } else {
        "✗ Validation failed"
    };

    if !use_color {
        return format!("{} {}", verdict, counts);
    }
    let verdict = if result.success() {
        verdict.green().bold()
    } else {
        verdict.red().bold()
    };
    format!("{} {}", verdict, counts)
}

fn format_issue_human(issue: &ValidationIssue, use_color: bool) -> String {
    let location = match issue.line() {
        Some(line) => format!("{} (line {})", issue.path(), line),
        None => issue.path().to_string(),
    };
    let tag = format!("[{}]", issue.code());

    let mut output = if use_color {
        let tag = match issue.severity() {
            Severity::Error => tag.red().bold(),
            Severity::Warning => tag.yellow().bold(),
        };
        format!("{} {}: {}", tag, location.bold(), issue.message())
    } else {
        format!("{} {}: {}", tag, location, issue.message())
    };

    if let Some(suggestion) = issue.suggestion() {
        let hint = format!("    → {}", suggestion);
        output.push('\n');
        if use_color {
            output.push_str(&hint.dimmed().to_string());
        } else {
            output.push_str(&hint);
        }
    }
    output
}

/// Format a validation result for human reading
fn format_validation_result_human(result: &ValidationResult, use_color: bool) -> String {
    let mut output = summary_line(result, use_color);
    if let Some(profile) = result.profile() {
        output.push_str(&format!("\nProfile: {}", profile));
    }

    for issue in result.issues() {
        output.push('\n');
        output.push_str(&format_issue_human(issue, use_color));
    }
    output
}

/// Format the rule catalogue as an aligned table
fn format_rules_human(rules: &[RuleEntry], use_color: bool) -> String {
    let mut output = String::new();
    for rule in rules {
        let severity = format!("{:<7}", rule.severity.to_string());
        let severity = if use_color {
            match rule.severity {
                Severity::Error => severity.red().to_string(),
                Severity::Warning => severity.yellow().to_string(),
            }
        } else {
            severity
        };
        output.push_str(&format!(
            "{}  {}  {:<7}  {}\n",
            rule.code, severity, rule.phase, rule.description
        ));
    }
    output
}

/// Format the profile list for human reading
fn format_profiles_human(profiles: &[ProfileEntry], use_color: bool) -> String {
    if profiles.is_empty() {
        return "No profiles registered\n".to_string();
    }

    let mut output = String::new();
    for profile in profiles {
        let title = match &profile.version {
            Some(version) => format!("{} ({})", profile.name, version),
            None => profile.name.clone(),
        };
        if use_color {
            output.push_str(&title.bold().to_string());
        } else {
            output.push_str(&title);
        }
        output.push('\n');
        if !profile.description.is_empty() {
            output.push_str(&format!("  {}\n", profile.description));
        }
        for rule in &profile.rules {
            output.push_str(&format!("  • {}\n", rule));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
