//! Path to source line lookup table
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::node::{NodeValue, ParsedNode};
use crate::path::Path;
use indexmap::IndexMap;

/// Immutable map from structural path to 1-based line number
///
/// Holds an entry for every mapping key and every sequence index in the
/// source. Paths synthesized later (absent optional keys) have no entry and
/// lookups for them return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    lines: IndexMap<Path, usize>,
}

impl LineIndex {
    /// Walk the tree once, recording each key and index
    pub fn build(root: &ParsedNode) -> Self {
        let mut index = Self::default();
        index.visit(root, &Path::root());
        index
    }

    fn visit(&mut self, node: &ParsedNode, path: &Path) {
        match &node.value {
            NodeValue::Mapping(entries) => {
                for (key, child) in entries {
                    let child_path = path.child(key.as_str());
                    self.lines.insert(child_path.clone(), child.line);
                    self.visit(child, &child_path);
                }
            }
            NodeValue::Sequence(items) => {
                for (i, item) in items.iter().enumerate() {
                    let child_path = path.child_index(i);
                    self.lines.insert(child_path.clone(), item.line);
                    self.visit(item, &child_path);
                }
            }
            NodeValue::Scalar(_) => {}
        }
    }

    pub fn get(&self, path: &Path) -> Option<usize> {
        self.lines.get(path).copied()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.lines.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Entries in document order
    pub fn iter(&self) -> impl Iterator<Item = (&Path, usize)> {
        self.lines.iter().map(|(path, line)| (path, *line))
    }
}

impl FromIterator<(Path, usize)> for LineIndex {
    fn from_iter<I: IntoIterator<Item = (Path, usize)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}
