//! Generic path-addressable node tree
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use crate::path::{Path, PathSegment};
use indexmap::IndexMap;
use std::fmt;

/// Resolved scalar value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Name of the scalar's type as used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Str(s) => serde_json::Value::String(s.clone()),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mapping => f.write_str("mapping"),
            Self::Sequence => f.write_str("sequence"),
            Self::Scalar => f.write_str("scalar"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Mapping(IndexMap<String, ParsedNode>),
    Sequence(Vec<ParsedNode>),
    Scalar(Scalar),
}

/// Node of the generic tree with the 1-based line it was introduced on
///
/// Mapping values carry the line of their key and sequence items the line of
/// their dash, except scalars that start on a later line, which keep their own.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    pub value: NodeValue,
    pub line: usize,
}

impl ParsedNode {
    pub fn new(value: NodeValue, line: usize) -> Self {
        Self { value, line }
    }

    pub fn null(line: usize) -> Self {
        Self::new(NodeValue::Scalar(Scalar::Null), line)
    }

    pub fn kind(&self) -> NodeKind {
        match self.value {
            NodeValue::Mapping(_) => NodeKind::Mapping,
            NodeValue::Sequence(_) => NodeKind::Sequence,
            NodeValue::Scalar(_) => NodeKind::Scalar,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, NodeValue::Scalar(Scalar::Null))
    }

    pub fn is_container(&self) -> bool {
        !matches!(self.value, NodeValue::Scalar(_))
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ParsedNode>> {
        match &self.value {
            NodeValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ParsedNode]> {
        match &self.value {
            NodeValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Child of a mapping by key
    pub fn get(&self, key: &str) -> Option<&ParsedNode> {
        self.as_mapping()?.get(key)
    }

    /// Descend along `path`
    pub fn at(&self, path: &Path) -> Option<&ParsedNode> {
        path.segments()
            .iter()
            .try_fold(self, |node, segment| match segment {
                PathSegment::Key(key) => node.get(key),
                PathSegment::Index(index) => node.as_sequence()?.get(*index),
            })
    }

    /// Plain JSON view of the subtree
    pub fn to_json(&self) -> serde_json::Value {
        match &self.value {
            NodeValue::Mapping(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_json()))
                    .collect(),
            ),
            NodeValue::Sequence(items) => {
                serde_json::Value::Array(items.iter().map(ParsedNode::to_json).collect())
            }
            NodeValue::Scalar(scalar) => scalar.to_json(),
        }
    }

    /// Build a subtree from a `serde_yaml` value, all nodes on `line`
    pub(crate) fn from_yaml(value: serde_yaml::Value, line: usize) -> Result<Self, String> {
        let value = match value {
            serde_yaml::Value::Null => NodeValue::Scalar(Scalar::Null),
            serde_yaml::Value::Bool(b) => NodeValue::Scalar(Scalar::Bool(b)),
            serde_yaml::Value::Number(n) => NodeValue::Scalar(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::Float(n.as_f64().unwrap_or(f64::NAN)),
            }),
            serde_yaml::Value::String(s) => NodeValue::Scalar(Scalar::Str(s)),
            serde_yaml::Value::Sequence(items) => NodeValue::Sequence(
                items
                    .into_iter()
                    .map(|item| Self::from_yaml(item, line))
                    .collect::<Result<_, _>>()?,
            ),
            serde_yaml::Value::Mapping(mapping) => {
                let mut entries = IndexMap::with_capacity(mapping.len());
                for (key, value) in mapping {
                    let key = match key {
                        serde_yaml::Value::String(s) => s,
                        serde_yaml::Value::Bool(b) => b.to_string(),
                        serde_yaml::Value::Number(n) => n.to_string(),
                        _ => return Err("Mapping keys must be scalars".to_string()),
                    };
                    entries.insert(key, Self::from_yaml(value, line)?);
                }
                NodeValue::Mapping(entries)
            }
            serde_yaml::Value::Tagged(tagged) => return Self::from_yaml(tagged.value, line),
        };
        Ok(Self::new(value, line))
    }
}
