//! Aggregated outcome of a validation run
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::issue::{IssuePhase, Severity, ValidationIssue};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fmt;

/// Immutable result of one pipeline run
///
/// Issues are kept in phase order, then in emission order within a phase.
/// `success` is true iff no issue has error severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    success: bool,
    issues: Vec<ValidationIssue>,
    profile: Option<String>,
}

impl ValidationResult {
    pub fn success(&self) -> bool {
        self.success
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Profile the run was executed with
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Error-severity issues, in result order
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// Warning-severity issues, in result order
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|issue| issue.severity() == Severity::Warning)
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Issues produced by one pipeline phase
    pub fn issues_in(&self, phase: IssuePhase) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.code().phase() == phase)
    }

    /// Compact JSON rendering
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Indented JSON rendering
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Serialize for ValidationResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ValidationResult", 5)?;
        state.serialize_field("success", &self.success)?;
        state.serialize_field("profile", &self.profile)?;
        state.serialize_field("error_count", &self.error_count())?;
        state.serialize_field("warning_count", &self.warning_count())?;
        state.serialize_field("issues", &self.issues)?;
        state.end()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.success {
            write!(f, "Validation passed")?;
        } else {
            write!(f, "Validation failed")?;
        }
        write!(
            f,
            " ({} errors, {} warnings)",
            self.error_count(),
            self.warning_count()
        )?;
        for issue in &self.issues {
            write!(f, "\n{}", issue)?;
        }
        Ok(())
    }
}

/// Accumulates issues across phases and seals them into a [`ValidationResult`]
#[derive(Debug, Default)]
pub struct IssueCollector {
    issues: Vec<ValidationIssue>,
}

impl IssueCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn extend<I: IntoIterator<Item = ValidationIssue>>(&mut self, issues: I) {
        self.issues.extend(issues);
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(ValidationIssue::is_error)
    }

    /// Classify and freeze the collected issues
    pub fn finish(self, profile: Option<String>) -> ValidationResult {
        let success = !self.has_errors();
        ValidationResult {
            success,
            issues: self.issues,
            profile,
        }
    }
}
