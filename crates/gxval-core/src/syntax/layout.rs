//! Layout pre-check: fail fast on malformed text before building a tree
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::error::SyntaxError;
use super::lexer;

/// Scan `text` for the first layout violation
///
/// Reports tabs in indentation, inconsistent indentation, malformed mapping
/// syntax, unterminated quotes or brackets and empty documents. Returns the
/// violation with the lowest line, or `None` when the text can be parsed.
pub fn validate(text: &str) -> Option<SyntaxError> {
    lexer::tokenize(text).err()
}
