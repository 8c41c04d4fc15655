//! Tree parser: builds the generic node tree and its line index
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::error::{SyntaxError, SyntaxErrorKind};
use super::lexer::{self, ScalarSource, ScalarStyle, Token, TokenKind};
use super::line_index::LineIndex;
use super::node::{NodeValue, ParsedNode, Scalar};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Parsed tree together with the line index derived from it
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    root: ParsedNode,
    index: LineIndex,
}

impl ParsedDocument {
    pub fn root(&self) -> &ParsedNode {
        &self.root
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.index
    }

    /// Give up the tree, keeping only the index
    pub fn into_parts(self) -> (ParsedNode, LineIndex) {
        (self.root, self.index)
    }
}

/// Parse raw text into a node tree and line index
///
/// Runs the line scanner first, so layout violations surface here too.
pub fn parse(text: &str) -> Result<ParsedDocument, SyntaxError> {
    build(lexer::tokenize(text)?)
}

pub(crate) fn build(tokens: Vec<Token>) -> Result<ParsedDocument, SyntaxError> {
    if tokens.is_empty() {
        return Err(SyntaxError::empty_document());
    }
    let mut builder = TreeBuilder {
        tokens,
        pos: 0,
        anchors: HashMap::new(),
    };
    let root = builder.node(1)?;
    let index = LineIndex::build(&root);
    Ok(ParsedDocument { root, index })
}

struct TreeBuilder {
    tokens: Vec<Token>,
    pos: usize,
    /// Anchored nodes seen so far; aliases may only refer backwards
    anchors: HashMap<String, ParsedNode>,
}

impl TreeBuilder {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn nested_below(&self, indent: usize) -> bool {
        self.peek().map_or(false, |next| next.indent > indent)
    }

    fn node(&mut self, fallback_line: usize) -> Result<ParsedNode, SyntaxError> {
        let Some(token) = self.peek().cloned() else {
            return Ok(ParsedNode::null(fallback_line));
        };
        match token.kind {
            TokenKind::Entry { .. } => self.mapping(token.indent),
            TokenKind::Dash => self.sequence(token.indent),
            TokenKind::Scalar(source) => {
                self.pos += 1;
                self.scalar(&source, token.line)
            }
        }
    }

    fn mapping(&mut self, indent: usize) -> Result<ParsedNode, SyntaxError> {
        let line = self.peek().map_or(1, |t| t.line);
        let mut entries = IndexMap::new();
        let mut key_lines: HashMap<String, usize> = HashMap::new();
        while let Some(token) = self.peek().cloned() {
            if token.indent != indent {
                break;
            }
            let TokenKind::Entry { key, value } = token.kind else {
                break;
            };
            if let Some(first) = key_lines.get(&key) {
                return Err(SyntaxError::duplicate_key(token.line, &key, *first));
            }
            self.pos += 1;
            let node = match value {
                Some(source) => self.scalar(&source, token.line)?,
                None => self.entry_value(indent, token.line)?,
            };
            self.remember(token.anchor, &node);
            key_lines.insert(key.clone(), token.line);
            entries.insert(key, node);
        }
        Ok(ParsedNode::new(NodeValue::Mapping(entries), line))
    }

    fn entry_value(&mut self, indent: usize, key_line: usize) -> Result<ParsedNode, SyntaxError> {
        if self.nested_below(indent) {
            let mut node = self.node(key_line)?;
            if node.is_container() {
                node.line = key_line;
            }
            return Ok(node);
        }
        let indentless = self
            .peek()
            .map_or(false, |next| next.indent == indent && next.kind == TokenKind::Dash);
        if indentless {
            let mut node = self.sequence(indent)?;
            node.line = key_line;
            return Ok(node);
        }
        Ok(ParsedNode::null(key_line))
    }

    fn sequence(&mut self, indent: usize) -> Result<ParsedNode, SyntaxError> {
        let line = self.peek().map_or(1, |t| t.line);
        let mut items = Vec::new();
        while let Some(token) = self.peek() {
            if token.indent != indent || token.kind != TokenKind::Dash {
                break;
            }
            let dash_line = token.line;
            let anchor = token.anchor.clone();
            self.pos += 1;
            let item = if self.nested_below(indent) {
                let mut node = self.node(dash_line)?;
                if node.is_container() {
                    node.line = dash_line;
                }
                node
            } else {
                ParsedNode::null(dash_line)
            };
            self.remember(anchor, &item);
            items.push(item);
        }
        Ok(ParsedNode::new(NodeValue::Sequence(items), line))
    }

    fn remember(&mut self, anchor: Option<String>, node: &ParsedNode) {
        if let Some(name) = anchor {
            self.anchors.insert(name, node.clone());
        }
    }

    fn scalar(&self, source: &ScalarSource, line: usize) -> Result<ParsedNode, SyntaxError> {
        if source.style != ScalarStyle::Alias {
            return scalar_node(source, line);
        }
        let Some(target) = self.anchors.get(&source.text) else {
            return Err(SyntaxError::new(
                SyntaxErrorKind::Unparsable,
                line,
                format!("Unknown alias '*{}'", source.text),
            )
            .with_suggestion(format!(
                "Define the anchor '&{}' on an earlier value before referring to it",
                source.text
            )));
        };
        // the copy sits at the alias; nodes below it keep the anchor's lines
        let mut node = target.clone();
        node.line = line;
        Ok(node)
    }
}

fn scalar_node(source: &ScalarSource, line: usize) -> Result<ParsedNode, SyntaxError> {
    if source.style == ScalarStyle::Block {
        return Ok(ParsedNode::new(
            NodeValue::Scalar(Scalar::Str(source.text.clone())),
            line,
        ));
    }
    let value: serde_yaml::Value = serde_yaml::from_str(&source.text).map_err(|e| {
        let message = e.to_string();
        if source.style == ScalarStyle::Flow && message.contains("duplicate entry") {
            return SyntaxError::new(
                SyntaxErrorKind::DuplicateKey,
                line,
                format!("Duplicate key in flow mapping '{}': {}", source.text, message),
            )
            .with_suggestion("Remove or rename the repeated key");
        }
        SyntaxError::new(
            SyntaxErrorKind::Unparsable,
            line,
            format!("Could not parse value '{}': {}", source.text, message),
        )
        .with_suggestion("Quote the value if it is meant to be text")
    })?;
    ParsedNode::from_yaml(value, line)
        .map_err(|message| SyntaxError::new(SyntaxErrorKind::Unparsable, line, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::node::NodeKind;

    #[test]
    fn test_parses_nested_document() {
        let doc = parse(
            "statement:\n  prompt:\n    instructions: Extract\n  fields:\n    meters:\n      prompt:\n        identifiers: [\"m\"]\n        type: int\n        required: true\n",
        )
        .unwrap();
        let root = doc.root();
        assert_eq!(root.kind(), NodeKind::Mapping);
        let prompt = root.get("statement").unwrap().get("fields").unwrap().get("meters").unwrap().get("prompt").unwrap();
        assert_eq!(prompt.line, 6);
        assert_eq!(prompt.get("type").unwrap().as_scalar(), Some(&Scalar::Str("int".into())));
        assert_eq!(prompt.get("required").unwrap().as_scalar(), Some(&Scalar::Bool(true)));
    }

    #[test]
    fn test_duplicate_key_reports_second_line() {
        let err = parse("a: 1\nb: 2\na: 3\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::DuplicateKey);
        assert_eq!(err.line, 3);
        assert_eq!(
            err.suggestion.as_deref(),
            Some("Remove or rename this key (first defined on line 1)")
        );
    }

    #[test]
    fn test_nested_duplicate_key() {
        let err = parse("g:\n  fields:\n    x: {}\n    x: {}\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::DuplicateKey);
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_empty_value_is_null_on_key_line() {
        let doc = parse("a:\nb: 1\n").unwrap();
        let a = doc.root().get("a").unwrap();
        assert!(a.is_null());
        assert_eq!(a.line, 1);
    }

    #[test]
    fn test_scalar_on_later_line_keeps_its_line() {
        let doc = parse("a:\n  text on\n  two lines\n").unwrap();
        let a = doc.root().get("a").unwrap();
        assert_eq!(a.as_scalar(), Some(&Scalar::Str("text on two lines".into())));
        assert_eq!(a.line, 2);
    }

    #[test]
    fn test_block_scalar_keeps_key_line() {
        let doc = parse("p:\n  instructions: |\n    one\n    two\n").unwrap();
        let instructions = doc.root().get("p").unwrap().get("instructions").unwrap();
        assert_eq!(instructions.line, 2);
        assert_eq!(instructions.as_scalar(), Some(&Scalar::Str("one\ntwo\n".into())));
    }

    #[test]
    fn test_sequence_of_mappings() {
        let doc = parse("items:\n  - name: a\n    size: 1\n  -\n    name: b\n").unwrap();
        let items = doc.root().get("items").unwrap().as_sequence().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].get("size").unwrap().as_scalar(), Some(&Scalar::Int(1)));
        assert_eq!(items[1].line, 4);
    }

    #[test]
    fn test_root_scalar() {
        let doc = parse("just text\n").unwrap();
        assert_eq!(doc.root().kind(), NodeKind::Scalar);
    }

    #[test]
    fn test_unresolvable_alias_is_unparsable() {
        let err = parse("a: *missing\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::Unparsable);
        assert_eq!(err.line, 1);
        assert_eq!(err.message, "Unknown alias '*missing'");
        assert!(err.suggestion.unwrap().contains("'&missing'"));
    }

    #[test]
    fn test_alias_copies_anchored_mapping() {
        let doc = parse(
            "base: &p\n  identifiers: [m]\n  type: str\nother:\n  - &n 3\n  - *n\ncopy: *p\n",
        )
        .unwrap();
        let root = doc.root();
        let copy = root.get("copy").unwrap();
        assert_eq!(copy.line, 7);
        assert_eq!(copy.get("type").unwrap().as_scalar(), Some(&Scalar::Str("str".into())));
        assert_eq!(copy.get("type").unwrap().line, 3);
        let items = root.get("other").unwrap().as_sequence().unwrap();
        assert_eq!(items[1].as_scalar(), Some(&Scalar::Int(3)));
        assert_eq!(items[1].line, 6);
    }

    #[test]
    fn test_alias_before_anchor_is_unknown() {
        let err = parse("a: *p\nb: &p 1\n").unwrap_err();
        assert_eq!(err.message, "Unknown alias '*p'");
    }

    #[test]
    fn test_flow_duplicate_key() {
        let err = parse("g:\n  fields: {a: {}, a: {}}\n").unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::DuplicateKey);
        assert_eq!(err.line, 2);
    }
}
