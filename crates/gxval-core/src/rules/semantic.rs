//! Core semantic rules over groups, fields and prompts
//!
//! Attributes the loader marked [`Attr::Invalid`] were already reported as
//! structural issues and are skipped here.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::{Rule, RuleContext};
use crate::issue::{IssueCode, ValidationIssue};
use crate::path::Path;
use crate::schema::{Attr, ExtractedField, Prompt};

/// Core rules in execution order
pub fn core_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(GroupPromptInstructions),
        Box::new(GroupPromptIgnoredAttributes),
        Box::new(FieldPromptRequired),
        Box::new(FieldIdentifiersRequired),
        Box::new(FieldTypeRequired),
        Box::new(FieldRequiredIgnored),
    ]
}

fn field_path(group: &str, field: &str) -> Path {
    Path::from([group, "fields", field])
}

/// Visit every present field prompt as `(group, field, prompt path, prompt)`
fn for_each_field_prompt<F>(ctx: &RuleContext<'_>, mut visit: F)
where
    F: FnMut(&str, &str, Path, &Prompt),
{
    for (group_name, group) in ctx.document.groups() {
        for (field_name, field) in group.field_entries() {
            if let Attr::Present(prompt) = &field.prompt {
                visit(
                    group_name,
                    field_name,
                    field_path(group_name, field_name).child("prompt"),
                    prompt,
                );
            }
        }
    }
}

/// A group prompt must carry non-blank instructions
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupPromptInstructions;

impl Rule for GroupPromptInstructions {
    fn code(&self) -> IssueCode {
        IssueCode::GroupPromptNoInstructions
    }

    fn description(&self) -> String {
        "If Group.prompt is present, it must have non-empty instructions".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (group_name, group) in ctx.document.groups() {
            let Attr::Present(prompt) = &group.prompt else {
                continue;
            };
            let missing = match &prompt.instructions {
                Attr::Absent => true,
                Attr::Present(text) => text.trim().is_empty(),
                Attr::Invalid => false,
            };
            if !missing {
                continue;
            }
            let anchor = Path::from([group_name, "prompt"]);
            let path = anchor.child("instructions");
            issues.push(
                ValidationIssue::new(
                    self.code(),
                    format!("Group '{}' has a prompt but missing 'instructions'", group_name),
                    path.clone(),
                )
                .with_line(ctx.line_or(&path, &anchor))
                .with_suggestion("Add 'instructions: \"Your instructions here\"' to the prompt"),
            );
        }
        issues
    }
}

/// Warn about group prompt attributes that only fields use
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupPromptIgnoredAttributes;

impl Rule for GroupPromptIgnoredAttributes {
    fn code(&self) -> IssueCode {
        IssueCode::GroupPromptIgnoredAttribute
    }

    fn description(&self) -> String {
        "Warn when Group.prompt has attributes that are ignored".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (group_name, group) in ctx.document.groups() {
            let Attr::Present(prompt) = &group.prompt else {
                continue;
            };
            for attribute in prompt.ignored_group_attributes() {
                let path = Path::from([group_name, "prompt", attribute]);
                issues.push(
                    ValidationIssue::new(
                        self.code(),
                        format!("Attribute '{}' is ignored for Group prompts", attribute),
                        path.clone(),
                    )
                    .with_line(ctx.line(&path))
                    .with_suggestion(format!(
                        "Remove '{}' from group prompt (only 'instructions' is used)",
                        attribute
                    )),
                );
            }
        }
        issues
    }
}

/// Every extracted field needs a prompt
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldPromptRequired;

impl Rule for FieldPromptRequired {
    fn code(&self) -> IssueCode {
        IssueCode::FieldNoPrompt
    }

    fn description(&self) -> String {
        "Every ExtractedField must have a prompt".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for (group_name, group) in ctx.document.groups() {
            for (field_name, field) in group.field_entries() {
                let ExtractedField { prompt: Attr::Absent } = field else {
                    continue;
                };
                let anchor = field_path(group_name, field_name);
                issues.push(
                    ValidationIssue::new(
                        self.code(),
                        format!("Field '{}' is missing 'prompt'", field_name),
                        anchor.child("prompt"),
                    )
                    .with_line(ctx.line(&anchor))
                    .with_suggestion("Add 'prompt:' with 'identifiers:' and 'type:'"),
                );
            }
        }
        issues
    }
}

/// Field prompts need at least one identifier
///
/// Reports [`IssueCode::FieldNoIdentifiers`] when the key is missing and
/// [`IssueCode::FieldEmptyIdentifiers`] when the list is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldIdentifiersRequired;

impl Rule for FieldIdentifiersRequired {
    fn code(&self) -> IssueCode {
        IssueCode::FieldNoIdentifiers
    }

    fn description(&self) -> String {
        "Field.prompt.identifiers must exist and have at least one item".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for_each_field_prompt(ctx, |_, field_name, anchor, prompt| {
            let path = anchor.child("identifiers");
            let issue = match &prompt.identifiers {
                Attr::Absent => ValidationIssue::new(
                    IssueCode::FieldNoIdentifiers,
                    format!("Field '{}' is missing 'identifiers'", field_name),
                    path.clone(),
                )
                .with_suggestion("Add 'identifiers: [\"identifier1\", \"identifier2\"]'"),
                Attr::Present(identifiers) if identifiers.is_empty() => ValidationIssue::new(
                    IssueCode::FieldEmptyIdentifiers,
                    format!("Field '{}' has empty 'identifiers' list", field_name),
                    path.clone(),
                )
                .with_suggestion("Add at least one identifier"),
                _ => return,
            };
            issues.push(issue.with_line(ctx.line_or(&path, &anchor)));
        });
        issues
    }
}

/// Field prompts must name a type
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldTypeRequired;

impl Rule for FieldTypeRequired {
    fn code(&self) -> IssueCode {
        IssueCode::FieldNoType
    }

    fn description(&self) -> String {
        "Field.prompt.type must exist".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for_each_field_prompt(ctx, |_, field_name, anchor, prompt| {
            if !prompt.type_spec.is_absent() {
                return;
            }
            let path = anchor.child("type");
            issues.push(
                ValidationIssue::new(
                    self.code(),
                    format!("Field '{}' is missing 'type'", field_name),
                    path.clone(),
                )
                .with_line(ctx.line_or(&path, &anchor))
                .with_suggestion("Add 'type: str' (or 'int', 'float', 'date', etc.)"),
            );
        });
        issues
    }
}

/// Warn when a field prompt sets `required`, which extraction ignores
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldRequiredIgnored;

impl Rule for FieldRequiredIgnored {
    fn code(&self) -> IssueCode {
        IssueCode::FieldRequiredIgnored
    }

    fn description(&self) -> String {
        "Warn when field.prompt.required is set (it's ignored)".to_string()
    }

    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        for_each_field_prompt(ctx, |_, field_name, anchor, prompt| {
            if !prompt.required.is_set() {
                return;
            }
            let path = anchor.child("required");
            issues.push(
                ValidationIssue::new(
                    self.code(),
                    format!("Field '{}' has 'required' set, but it's ignored", field_name),
                    path.clone(),
                )
                .with_line(ctx.line(&path))
                .with_suggestion("Remove 'required' - field extraction is always attempted"),
            );
        });
        issues
    }
}
