//! Rule trait and the context rules run against
//!
//! Core rules always run once a typed model exists. Profile rules are
//! compiled from profile definitions (see [`crate::profiles`]) and only run
//! when their profile is selected.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::issue::{IssueCode, ValidationIssue};
use crate::path::Path;
use crate::schema::Document;
use crate::syntax::LineIndex;
use std::fmt;
use tracing::trace;

pub mod semantic;
pub mod profile;

pub use semantic::core_rules;
pub use profile::{AllowedTopLevelKeys, RequiredFields, RequiredTopLevelKeys};

/// Where a rule comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleScope {
    /// Always runs
    Core,
    /// Runs only when its profile is selected
    Profile,
}

impl fmt::Display for RuleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => f.write_str("core"),
            Self::Profile => f.write_str("profile"),
        }
    }
}

/// Typed model and line index shared by every rule in a run
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub document: &'a Document,
    pub index: &'a LineIndex,
}

impl<'a> RuleContext<'a> {
    pub fn new(document: &'a Document, index: &'a LineIndex) -> Self {
        Self { document, index }
    }

    /// Source line of `path`, if it appears in source
    pub fn line(&self, path: &Path) -> Option<usize> {
        self.index.get(path)
    }

    /// Source line of `path`, falling back to `anchor` when `path` is absent
    pub fn line_or(&self, path: &Path, anchor: &Path) -> Option<usize> {
        self.line(path).or_else(|| self.line(anchor))
    }
}

/// A single semantic check over the typed model
///
/// Rules hold no per-run state; one instance is shared by every run.
pub trait Rule: Send + Sync + fmt::Debug {
    /// Primary code this rule reports
    fn code(&self) -> IssueCode;

    /// One-line description of what the rule checks
    fn description(&self) -> String;

    fn scope(&self) -> RuleScope {
        RuleScope::Core
    }

    /// Collect every violation, in model order
    fn check(&self, ctx: &RuleContext<'_>) -> Vec<ValidationIssue>;
}

/// Run `rules` in order, concatenating their issues
pub fn run_rules(rules: &[Box<dyn Rule>], ctx: &RuleContext<'_>) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for rule in rules {
        let found = rule.check(ctx);
        trace!(
            rule = %rule.code(),
            scope = %rule.scope(),
            count = found.len(),
            "rule finished"
        );
        issues.extend(found);
    }
    issues
}
