//! Pipeline orchestration
//!
//! A run walks a fixed sequence of phases:
//!
//! ```text
//! Start -> Layout -> Parse -> Load -> CoreRules -> ProfileRules -> Done
//!            |         |        |
//!            v         v        +--(no model)--> Done
//!      LayoutFailed ParseFailed --> Done
//! ```
//!
//! Layout and Parse stop at the first violation. Load and the rule phases
//! collect everything they find, and the rule phases run over a partial
//! model when the loader produced one.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::error::Result;
use crate::profiles::Profile;
use crate::registry::RuleRegistry;
use crate::result::{IssueCollector, ValidationResult};
use crate::rules::{run_rules, RuleContext};
use crate::schema::{self, Document};
use crate::syntax::lexer::{self, Token};
use crate::syntax::{parser, LineIndex, ParsedNode};
use std::fmt;
use tracing::{debug, info, instrument};

/// Validate `text` with the built-in registry
///
/// Fails only when `profile` names a profile that is not registered.
pub fn validate(text: &str, profile: Option<&str>) -> Result<ValidationResult> {
    Validator::builtin().validate(text, profile)
}

/// Whether `text` passes every core check
pub fn quick_validate(text: &str) -> bool {
    Validator::builtin()
        .validate(text, None)
        .map(|result| result.success())
        .unwrap_or(false)
}

/// Runs documents through the pipeline against one registry
#[derive(Debug, Clone, Copy)]
pub struct Validator<'r> {
    registry: &'r RuleRegistry,
}

impl Validator<'static> {
    pub fn builtin() -> Self {
        Self::new(RuleRegistry::builtin())
    }
}

impl<'r> Validator<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    /// Run every phase over `text`
    ///
    /// The profile is resolved before any phase starts; an unknown name is
    /// returned as an error rather than an issue.
    #[instrument(
        name = "validate",
        skip(self, text),
        fields(len = text.len(), profile = profile.unwrap_or("none"))
    )]
    pub fn validate(&self, text: &str, profile: Option<&str>) -> Result<ValidationResult> {
        let profile = profile.map(|name| self.registry.profile(name)).transpose()?;

        let mut run = Run::new(self.registry, profile, text);
        while run.phase != Phase::Done {
            let next = run.step();
            debug!(from = %run.phase, to = %next, issues = run.issues.len(), "phase transition");
            run.phase = next;
        }

        let result = run.issues.finish(profile.map(|p| p.name().to_string()));
        info!(
            success = result.success(),
            errors = result.error_count(),
            warnings = result.warning_count(),
            "validation finished"
        );
        Ok(result)
    }
}

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Start,
    Layout,
    Parse,
    Load,
    CoreRules,
    ProfileRules,
    Done,
    LayoutFailed,
    ParseFailed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::Layout => "layout",
            Self::Parse => "parse",
            Self::Load => "load",
            Self::CoreRules => "core-rules",
            Self::ProfileRules => "profile-rules",
            Self::Done => "done",
            Self::LayoutFailed => "layout-failed",
            Self::ParseFailed => "parse-failed",
        };
        f.write_str(name)
    }
}

/// State owned by a single run
struct Run<'a> {
    phase: Phase,
    registry: &'a RuleRegistry,
    profile: Option<&'a Profile>,
    text: &'a str,
    tokens: Vec<Token>,
    tree: Option<ParsedNode>,
    index: LineIndex,
    model: Option<Document>,
    issues: IssueCollector,
}

impl<'a> Run<'a> {
    fn new(registry: &'a RuleRegistry, profile: Option<&'a Profile>, text: &'a str) -> Self {
        Self {
            phase: Phase::Start,
            registry,
            profile,
            text,
            tokens: Vec::new(),
            tree: None,
            index: LineIndex::default(),
            model: None,
            issues: IssueCollector::new(),
        }
    }

    /// Execute the current phase and return the next one
    fn step(&mut self) -> Phase {
        match self.phase {
            Phase::Start => Phase::Layout,
            Phase::Layout => match lexer::tokenize(self.text) {
                Ok(tokens) => {
                    self.tokens = tokens;
                    Phase::Parse
                }
                Err(e) => {
                    self.issues.push(e.into_issue());
                    Phase::LayoutFailed
                }
            },
            Phase::Parse => match parser::build(std::mem::take(&mut self.tokens)) {
                Ok(document) => {
                    let (root, index) = document.into_parts();
                    self.tree = Some(root);
                    self.index = index;
                    Phase::Load
                }
                Err(e) => {
                    self.issues.push(e.into_issue());
                    Phase::ParseFailed
                }
            },
            Phase::Load => {
                let Some(root) = self.tree.take() else {
                    return Phase::Done;
                };
                let outcome = schema::load(&root);
                let index = &self.index;
                self.issues
                    .extend(outcome.issues.into_iter().map(|issue| issue.into_issue(index)));
                self.model = outcome.model;
                if self.model.is_some() {
                    Phase::CoreRules
                } else {
                    debug!("no typed model; skipping rule phases");
                    Phase::Done
                }
            }
            Phase::CoreRules => {
                if let Some(model) = &self.model {
                    let ctx = RuleContext::new(model, &self.index);
                    self.issues.extend(run_rules(self.registry.core_rules(), &ctx));
                }
                Phase::ProfileRules
            }
            Phase::ProfileRules => {
                if let (Some(profile), Some(model)) = (self.profile, &self.model) {
                    let ctx = RuleContext::new(model, &self.index);
                    self.issues.extend(profile.check(&ctx));
                }
                Phase::Done
            }
            Phase::LayoutFailed | Phase::ParseFailed | Phase::Done => Phase::Done,
        }
    }
}
