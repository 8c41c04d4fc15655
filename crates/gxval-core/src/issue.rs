//! Diagnostic types: severities, stable issue codes and validation issues
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::path::Path;
use serde::{Serialize, Serializer};
use std::fmt;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => f.write_str("error"),
            Self::Warning => f.write_str("warning"),
        }
    }
}

/// Pipeline phase an issue code belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IssuePhase {
    /// Layout pre-check and tree parsing (001-009)
    Syntax,
    /// Structural loading into the typed model (010-099)
    Load,
    /// Core semantic rules (100-199)
    Core,
    /// Profile rules (200-299)
    Profile,
}

/// Stable identifiers for every diagnostic the pipeline can emit
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    Display,
    EnumString,
    IntoStaticStr,
    EnumIter,
)]
pub enum IssueCode {
    #[strum(serialize = "GXVAL001")]
    Unparsable,
    #[strum(serialize = "GXVAL002")]
    IndentError,
    #[strum(serialize = "GXVAL003")]
    TabIndent,
    #[strum(serialize = "GXVAL004")]
    MappingSyntax,
    #[strum(serialize = "GXVAL005")]
    EmptyDocument,
    #[strum(serialize = "GXVAL006")]
    DuplicateKey,
    #[strum(serialize = "GXVAL007")]
    Unterminated,

    #[strum(serialize = "GXVAL010")]
    InvalidStructure,
    #[strum(serialize = "GXVAL011")]
    UnknownField,
    #[strum(serialize = "GXVAL012")]
    MissingField,
    #[strum(serialize = "GXVAL013")]
    WrongType,
    #[strum(serialize = "GXVAL014")]
    WrongContainer,

    #[strum(serialize = "GXVAL100")]
    GroupPromptNoInstructions,
    #[strum(serialize = "GXVAL101")]
    FieldNoPrompt,
    #[strum(serialize = "GXVAL102")]
    FieldNoIdentifiers,
    #[strum(serialize = "GXVAL103")]
    FieldEmptyIdentifiers,
    #[strum(serialize = "GXVAL104")]
    FieldNoType,

    #[strum(serialize = "GXVAL150")]
    GroupPromptIgnoredAttribute,
    #[strum(serialize = "GXVAL151")]
    FieldRequiredIgnored,

    #[strum(serialize = "GXVAL200")]
    TopLevelKeyNotAllowed,
    #[strum(serialize = "GXVAL201")]
    MissingRequiredTopLevelKey,
    #[strum(serialize = "GXVAL202")]
    MissingRequiredField,
    #[strum(serialize = "GXVAL203")]
    FieldsWrongContainer,
}

impl IssueCode {
    /// Numeric part of the code, e.g. `3` for `GXVAL003`
    pub fn number(self) -> u16 {
        let code: &'static str = self.into();
        code[5..].parse().unwrap_or_default()
    }

    pub fn phase(self) -> IssuePhase {
        match self.number() {
            0..=9 => IssuePhase::Syntax,
            10..=99 => IssuePhase::Load,
            100..=199 => IssuePhase::Core,
            _ => IssuePhase::Profile,
        }
    }

    /// Severity this code is reported with
    pub fn severity(self) -> Severity {
        match self.number() {
            150..=199 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// One-line description used by rule listings
    pub fn description(self) -> &'static str {
        match self {
            Self::Unparsable => "Unparsable document construct",
            Self::IndentError => "Inconsistent indentation",
            Self::TabIndent => "Tab character used for indentation",
            Self::MappingSyntax => "Malformed mapping syntax",
            Self::EmptyDocument => "Document is empty",
            Self::DuplicateKey => "Duplicate key at the same nesting level",
            Self::Unterminated => "Unterminated quote or bracket",
            Self::InvalidStructure => "Invalid document structure (expected a mapping of groups)",
            Self::UnknownField => "Unknown field not in schema",
            Self::MissingField => "Required schema field is missing",
            Self::WrongType => "Wrong primitive type for field",
            Self::WrongContainer => "Wrong container kind for field",
            Self::GroupPromptNoInstructions => "Group prompt is missing instructions",
            Self::FieldNoPrompt => "Field is missing prompt",
            Self::FieldNoIdentifiers => "Field prompt is missing identifiers",
            Self::FieldEmptyIdentifiers => "Field prompt has an empty identifiers list",
            Self::FieldNoType => "Field prompt is missing type",
            Self::GroupPromptIgnoredAttribute => "Group prompt attribute is ignored",
            Self::FieldRequiredIgnored => "Field prompt 'required' is ignored",
            Self::TopLevelKeyNotAllowed => "Top-level key not allowed by profile",
            Self::MissingRequiredTopLevelKey => "Required top-level key is missing",
            Self::MissingRequiredField => "Required field is missing from group",
            Self::FieldsWrongContainer => "Group fields must be a mapping of field names",
        }
    }

    /// All codes in ascending order
    pub fn all() -> impl Iterator<Item = IssueCode> {
        Self::iter()
    }
}

impl Serialize for IssueCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_ref())
    }
}

/// A single diagnostic produced by any pipeline phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    severity: Severity,
    code: IssueCode,
    message: String,
    path: Path,
    line: Option<usize>,
    suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create an issue with the code's default severity
    pub fn new<M: Into<String>>(code: IssueCode, message: M, path: Path) -> Self {
        Self {
            severity: code.severity(),
            code,
            message: message.into(),
            path,
            line: None,
            suggestion: None,
        }
    }

    /// Attach a source line
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        self.line = line;
        self
    }

    /// Attach a fix suggestion
    pub fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> IssueCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.path)?;
        if let Some(line) = self.line {
            write!(f, " (line {})", line)?;
        }
        write!(f, ": {}", self.message)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    → {}", suggestion)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_code_ranges_match_severity() {
        for code in IssueCode::all() {
            let expected = if (150..200).contains(&code.number()) {
                Severity::Warning
            } else {
                Severity::Error
            };
            assert_eq!(code.severity(), expected, "{}", code);
        }
    }

    #[test]
    fn test_code_phases() {
        assert_eq!(IssueCode::TabIndent.phase(), IssuePhase::Syntax);
        assert_eq!(IssueCode::UnknownField.phase(), IssuePhase::Load);
        assert_eq!(IssueCode::FieldRequiredIgnored.phase(), IssuePhase::Core);
        assert_eq!(IssueCode::FieldsWrongContainer.phase(), IssuePhase::Profile);
    }

    #[test]
    fn test_code_string_round_trip() {
        assert_eq!(IssueCode::TabIndent.to_string(), "GXVAL003");
        assert_eq!(IssueCode::from_str("GXVAL103").unwrap(), IssueCode::FieldEmptyIdentifiers);
        assert!(IssueCode::from_str("GXVAL999").is_err());
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::new(
            IssueCode::FieldNoType,
            "Field 'amount' is missing 'type'",
            Path::from(["statement", "fields", "amount", "prompt", "type"]),
        )
        .with_line(Some(4))
        .with_suggestion("Add 'type: str'");

        assert_eq!(
            issue.to_string(),
            "[GXVAL104] statement.fields.amount.prompt.type (line 4): Field 'amount' is missing 'type'\n    → Add 'type: str'"
        );
    }

    #[test]
    fn test_issue_serialization_shape() {
        let issue = ValidationIssue::new(IssueCode::EmptyDocument, "empty", Path::root()).with_line(Some(1));
        let value = serde_json::to_value(&issue).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "severity": "error",
                "code": "GXVAL005",
                "message": "empty",
                "path": [],
                "line": 1,
                "suggestion": null
            })
        );
    }
}
