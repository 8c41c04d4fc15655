//! Gxval Core - line-located diagnostics for extraction configuration documents
//!
//! This crate checks YAML documents that describe groups of extracted fields
//! and reports every problem as a [`ValidationIssue`] with a stable code, a
//! structural path and, where the source has one, a 1-based line number.
//!
//! ## Pipeline
//!
//! - **Layout**: tabs, indentation, mapping syntax, unterminated quotes and
//!   brackets, empty documents (first violation only)
//! - **Parse**: generic node tree plus a path to line index (first violation only)
//! - **Load**: typed model of groups, fields and prompts; unknown keys and wrong
//!   shapes are collected
//! - **Core rules**: semantic checks that always run
//! - **Profile rules**: extra checks from a named profile, only when selected
//!
//! ## Quick Start
//!
//! ```rust
//! use gxval_core::{validate, IssueCode};
//!
//! let text = "statement:\n  fields:\n    meters: {}\n";
//! let result = validate(text, Some("statement_only")).unwrap();
//!
//! assert!(!result.success());
//! let codes: Vec<_> = result.issues().iter().map(|i| i.code()).collect();
//! assert_eq!(codes, vec![IssueCode::FieldNoPrompt, IssueCode::MissingRequiredField]);
//! ```
//!
//! ## Issue codes
//!
//! | Range | Phase | Severity |
//! |---|---|---|
//! | GXVAL001-009 | layout and parse | error |
//! | GXVAL010-099 | load | error |
//! | GXVAL100-149 | core rules | error |
//! | GXVAL150-199 | core rules | warning |
//! | GXVAL200-299 | profile rules | error |
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod issue;
pub mod path;
pub mod pipeline;
pub mod profiles;
pub mod registry;
pub mod result;
pub mod rules;
pub mod schema;
pub mod syntax;

// Re-export commonly used types for convenience
pub use error::{GxvalError, Result};
pub use issue::{IssueCode, IssuePhase, Severity, ValidationIssue};
pub use path::{Path, PathSegment};
pub use pipeline::{quick_validate, validate, Phase, Validator};
pub use profiles::{Profile, ProfileSpec};
pub use registry::RuleRegistry;
pub use result::{IssueCollector, ValidationResult};
pub use rules::{Rule, RuleContext, RuleScope};
pub use schema::{load, Document, LoadOutcome};
pub use syntax::{parse, LineIndex, ParsedDocument, ParsedNode, SyntaxError};
