//! Rule kinds a profile definition compiles into
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::{Rule, RuleContext, RuleScope};
use crate::issue::{IssueCode, ValidationIssue};
use crate::path::Path;
use crate::schema::{Attr, GroupFields};

/// Every listed key must appear at the top level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredTopLevelKeys {
    keys: Vec<String>,
}

impl RequiredTopLevelKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Rule for RequiredTopLevelKeys {
    fn code(&self) -> IssueCode {
        IssueCode::MissingRequiredTopLevelKey
    }

    fn description(&self) -> String {
        format!("Required top-level keys: {}", self.keys.join(", "))
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Profile
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        self.keys
            .iter()
            .filter(|key| !ctx.document.contains_key(key))
            .map(|key| {
                ValidationIssue::new(
                    self.code(),
                    format!("Required top-level key '{}' is missing", key),
                    Path::from([key.as_str()]),
                )
                .with_suggestion(format!("Add '{}:' at the top level", key))
            })
            .collect()
    }
}

/// Only the listed keys may appear at the top level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedTopLevelKeys {
    allowed: Vec<String>,
}

impl AllowedTopLevelKeys {
    pub fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }

    fn is_allowed(&self, key: &str) -> bool {
        self.allowed.iter().any(|allowed| allowed == key)
    }
}

impl Rule for AllowedTopLevelKeys {
    fn code(&self) -> IssueCode {
        IssueCode::TopLevelKeyNotAllowed
    }

    fn description(&self) -> String {
        format!("Only these top-level keys allowed: {}", self.allowed.join(", "))
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Profile
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        ctx.document
            .keys()
            .filter(|key| !self.is_allowed(key))
            .map(|key| {
                let path = Path::from([key]);
                let suggestion = if self.allowed.is_empty() {
                    format!("Remove '{}' - no top-level keys are allowed", key)
                } else {
                    format!("Remove '{}' - only {} allowed", key, self.allowed.join(", "))
                };
                ValidationIssue::new(
                    self.code(),
                    format!("Top-level key '{}' is not allowed", key),
                    path.clone(),
                )
                .with_line(ctx.line(&path))
                .with_suggestion(suggestion)
            })
            .collect()
    }
}

/// A group's `fields` must be a mapping containing every listed field
///
/// Does nothing when the group itself is missing or malformed; other rules
/// and the loader report those.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredFields {
    group: String,
    fields: Vec<String>,
}

impl RequiredFields {
    pub fn new<G: Into<String>>(group: G, fields: Vec<String>) -> Self {
        Self {
            group: group.into(),
            fields,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

impl Rule for RequiredFields {
    fn code(&self) -> IssueCode {
        IssueCode::MissingRequiredField
    }

    fn description(&self) -> String {
        format!(
            "Group '{}' must have fields: {}",
            self.group,
            self.fields.join(", ")
        )
    }

    fn scope(&self) -> RuleScope {
        RuleScope::Profile
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let Attr::Present(group) = ctx.document.group(&self.group) else {
            return Vec::new();
        };
        let fields_path = Path::from([self.group.as_str(), "fields"]);
        let fields_line = ctx.line(&fields_path);

        if let Some(kind) = group.fields.as_ref().and_then(GroupFields::malformed_kind) {
            return vec![ValidationIssue::new(
                IssueCode::FieldsWrongContainer,
                format!(
                    "{}.fields must be a mapping of field names, got {}",
                    self.group, kind
                ),
                fields_path,
            )
            .with_line(fields_line)
            .with_suggestion("Use field_name: as keys, not a list")];
        }

        self.fields
            .iter()
            .filter(|name| !group.has_field(name))
            .map(|name| {
                ValidationIssue::new(
                    self.code(),
                    format!(
                        "Required field '{}' is missing from {}.fields",
                        name, self.group
                    ),
                    fields_path.child(name.as_str()),
                )
                .with_line(fields_line)
                .with_suggestion(format!(
                    "Add '{}:' with prompt containing identifiers and type",
                    name
                ))
            })
            .collect()
    }
}
