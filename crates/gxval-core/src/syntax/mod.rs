//! Text-level phases: layout pre-check, tree parsing and the line index
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod layout;
pub(crate) mod lexer;
pub mod line_index;
pub mod node;
pub mod parser;

pub use error::{SyntaxError, SyntaxErrorKind};
pub use line_index::LineIndex;
pub use node::{NodeKind, NodeValue, ParsedNode, Scalar};
pub use parser::{parse, ParsedDocument};
