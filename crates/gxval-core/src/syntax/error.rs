//! Fatal syntax errors raised by the layout pre-check and the tree parser
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::issue::{IssueCode, ValidationIssue};
use crate::path::Path;
use thiserror::Error;

/// Category of a syntax failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxErrorKind {
    Unparsable,
    Indentation,
    Tab,
    MappingSyntax,
    EmptyDocument,
    DuplicateKey,
    Unterminated,
}

impl SyntaxErrorKind {
    pub fn code(self) -> IssueCode {
        match self {
            Self::Unparsable => IssueCode::Unparsable,
            Self::Indentation => IssueCode::IndentError,
            Self::Tab => IssueCode::TabIndent,
            Self::MappingSyntax => IssueCode::MappingSyntax,
            Self::EmptyDocument => IssueCode::EmptyDocument,
            Self::DuplicateKey => IssueCode::DuplicateKey,
            Self::Unterminated => IssueCode::Unterminated,
        }
    }
}

/// The single violation that stops a run before a model exists
///
/// Always carries a 1-based line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub suggestion: Option<String>,
}

impl SyntaxError {
    pub fn new<M: Into<String>>(kind: SyntaxErrorKind, line: usize, message: M) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Tab found in the leading whitespace of a line
    pub fn tab(line: usize, column: usize) -> Self {
        Self::new(
            SyntaxErrorKind::Tab,
            line,
            "Tab character found. Use spaces for indentation.",
        )
        .with_suggestion(format!("Replace tab at column {} with spaces", column))
    }

    pub fn empty_document() -> Self {
        Self::new(
            SyntaxErrorKind::EmptyDocument,
            1,
            "YAML file is empty or contains only comments",
        )
        .with_suggestion("Add content to the YAML file")
    }

    pub fn mapping_values_not_allowed(line: usize) -> Self {
        Self::new(
            SyntaxErrorKind::MappingSyntax,
            line,
            "Mapping values are not allowed here",
        )
        .with_suggestion("Put the value on the key's line, or leave the key empty and nest the mapping below it")
    }

    pub fn unterminated_quote(line: usize, quote: char) -> Self {
        Self::new(
            SyntaxErrorKind::Unterminated,
            line,
            "Unterminated quoted string",
        )
        .with_suggestion(format!("Add the closing {} on the same line", quote))
    }

    pub fn duplicate_key(line: usize, key: &str, first_line: usize) -> Self {
        Self::new(
            SyntaxErrorKind::DuplicateKey,
            line,
            format!("Duplicate key '{}'", key),
        )
        .with_suggestion(format!(
            "Remove or rename this key (first defined on line {})",
            first_line
        ))
    }

    pub fn code(&self) -> IssueCode {
        self.kind.code()
    }

    /// Convert into the issue reported for the run
    pub fn into_issue(self) -> ValidationIssue {
        let issue = ValidationIssue::new(self.kind.code(), self.message, Path::root())
            .with_line(Some(self.line));
        match self.suggestion {
            Some(suggestion) => issue.with_suggestion(suggestion),
            None => issue,
        }
    }
}
