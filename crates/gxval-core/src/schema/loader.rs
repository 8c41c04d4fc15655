//! Schema loader: generic node tree to typed model
//!
//! The loader never stops at the first problem. Every shape violation becomes
//! a [`StructuralIssue`] and the offending attribute is recorded as
//! [`Attr::Invalid`], so later phases can still inspect the rest of the model.
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use super::model::{
    Attr, ContainerKind, Document, ExtractedField, Group, GroupFields, Prompt, TypeSpec,
};
use crate::issue::{IssueCode, ValidationIssue};
use crate::path::Path;
use crate::syntax::{LineIndex, NodeValue, ParsedNode, Scalar};
use indexmap::IndexMap;

/// Kind of shape violation found while loading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructuralKind {
    /// Document or group is not a mapping, or holds no groups
    InvalidStructure,
    UnknownField,
    RequiredMissing,
    WrongType,
    WrongContainer,
}

impl StructuralKind {
    pub fn code(self) -> IssueCode {
        match self {
            Self::InvalidStructure => IssueCode::InvalidStructure,
            Self::UnknownField => IssueCode::UnknownField,
            Self::RequiredMissing => IssueCode::MissingField,
            Self::WrongType => IssueCode::WrongType,
            Self::WrongContainer => IssueCode::WrongContainer,
        }
    }
}

/// Path-located shape violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralIssue {
    pub path: Path,
    pub message: String,
    pub kind: StructuralKind,
    pub suggestion: Option<String>,
}

impl StructuralIssue {
    fn new<M: Into<String>>(kind: StructuralKind, path: Path, message: M) -> Self {
        Self {
            path,
            message: message.into(),
            kind,
            suggestion: None,
        }
    }

    fn with_suggestion<S: Into<String>>(mut self, suggestion: S) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Error-severity issue located through the line index
    ///
    /// A missing key has no line of its own and takes its parent's.
    pub fn into_issue(self, index: &LineIndex) -> ValidationIssue {
        let line = index.get(&self.path).or_else(|| match self.kind {
            StructuralKind::RequiredMissing => self.path.parent().and_then(|p| index.get(&p)),
            _ => None,
        });
        let issue = ValidationIssue::new(self.kind.code(), self.message, self.path).with_line(line);
        match self.suggestion {
            Some(suggestion) => issue.with_suggestion(suggestion),
            None => issue,
        }
    }
}

/// Loader output: the issues found and, when the top level is a mapping, the
/// (possibly partial) model
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub model: Option<Document>,
    pub issues: Vec<StructuralIssue>,
}

impl LoadOutcome {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub required: bool,
}

const fn optional(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        required: false,
    }
}

/// Closed set of keys an object accepts
#[derive(Debug, Clone, Copy)]
pub struct ObjectSchema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl ObjectSchema {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn allowed(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub const PROMPT_SCHEMA: ObjectSchema = ObjectSchema {
    name: "prompt",
    fields: &[
        optional("identifiers"),
        optional("type"),
        optional("instructions"),
        optional("description"),
        optional("format"),
        optional("attr_name"),
        optional("default"),
        optional("required"),
    ],
};

pub const FIELD_SCHEMA: ObjectSchema = ObjectSchema {
    name: "field",
    fields: &[optional("prompt")],
};

pub const GROUP_SCHEMA: ObjectSchema = ObjectSchema {
    name: "group",
    fields: &[optional("prompt"), optional("fields")],
};

/// Load the typed model from a parsed tree
pub fn load(root: &ParsedNode) -> LoadOutcome {
    let mut loader = SchemaLoader::default();
    let model = loader.document(root);
    LoadOutcome {
        model,
        issues: loader.issues,
    }
}

#[derive(Debug, Default)]
struct SchemaLoader {
    issues: Vec<StructuralIssue>,
}

impl SchemaLoader {
    fn report(&mut self, issue: StructuralIssue) {
        self.issues.push(issue);
    }

    fn document(&mut self, root: &ParsedNode) -> Option<Document> {
        let Some(entries) = root.as_mapping() else {
            self.report(
                StructuralIssue::new(
                    StructuralKind::InvalidStructure,
                    Path::root(),
                    format!("Top-level must be a dictionary, got {}", describe(root)),
                )
                .with_suggestion("YAML should start with group names like 'statement:'"),
            );
            return None;
        };

        let mut document = Document::new();
        if entries.is_empty() {
            self.report(
                StructuralIssue::new(
                    StructuralKind::InvalidStructure,
                    Path::root(),
                    "YAML contains no groups",
                )
                .with_suggestion("Add at least one group, e.g., 'statement:'"),
            );
            return Some(document);
        }

        for (name, node) in entries {
            let path = Path::root().child(name.as_str());
            let group = match node.as_mapping() {
                Some(map) => Attr::Present(self.group(map, &path)),
                None => {
                    self.report(
                        StructuralIssue::new(
                            StructuralKind::InvalidStructure,
                            path,
                            format!("Group '{}' must be a dictionary", name),
                        )
                        .with_suggestion(format!(
                            "Define '{}' as a mapping with 'fields:' and optionally 'prompt:'",
                            name
                        )),
                    );
                    Attr::Invalid
                }
            };
            document.groups.insert(name.clone(), group);
        }
        Some(document)
    }

    fn group(&mut self, map: &IndexMap<String, ParsedNode>, path: &Path) -> Group {
        self.check_keys(&GROUP_SCHEMA, map, path);
        Group {
            prompt: self.prompt_attr(map.get("prompt"), &path.child("prompt")),
            fields: self.fields(map.get("fields"), &path.child("fields")),
        }
    }

    fn fields(&mut self, node: Option<&ParsedNode>, path: &Path) -> Option<GroupFields> {
        let node = node.filter(|n| !n.is_null())?;
        let entries = match &node.value {
            NodeValue::Mapping(entries) => entries,
            NodeValue::Sequence(_) => {
                self.wrong_container(path, "a dictionary of fields", node);
                return Some(GroupFields::Malformed(ContainerKind::Sequence));
            }
            NodeValue::Scalar(_) => {
                self.wrong_container(path, "a dictionary of fields", node);
                return Some(GroupFields::Malformed(ContainerKind::Scalar));
            }
        };

        let mut fields = IndexMap::new();
        let mut nested_group = false;
        for (name, entry) in entries {
            let field_path = path.child(name.as_str());
            let field = self.field(entry, &field_path);
            // A nested group is reported through its unknown `fields` key
            // and kept only as a key.
            if entry.get("fields").is_some() {
                nested_group = true;
                fields.insert(name.clone(), Attr::Invalid);
            } else {
                fields.insert(name.clone(), field);
            }
        }
        Some(GroupFields::Mapping {
            fields,
            nested_group,
        })
    }

    fn field(&mut self, node: &ParsedNode, path: &Path) -> Attr<ExtractedField> {
        match &node.value {
            NodeValue::Scalar(Scalar::Null) => Attr::Present(ExtractedField::default()),
            NodeValue::Mapping(map) => {
                self.check_keys(&FIELD_SCHEMA, map, path);
                Attr::Present(ExtractedField {
                    prompt: self.prompt_attr(map.get("prompt"), &path.child("prompt")),
                })
            }
            _ => {
                self.wrong_container(path, "a dictionary", node);
                Attr::Invalid
            }
        }
    }

    fn prompt_attr(&mut self, node: Option<&ParsedNode>, path: &Path) -> Attr<Prompt> {
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Attr::Absent;
        };
        let Some(map) = node.as_mapping() else {
            self.wrong_container(path, "a dictionary", node);
            return Attr::Invalid;
        };
        self.check_keys(&PROMPT_SCHEMA, map, path);
        Attr::Present(Prompt {
            identifiers: self.string_list(map.get("identifiers"), &path.child("identifiers")),
            type_spec: self.type_spec(map.get("type"), &path.child("type")),
            instructions: self.string(map.get("instructions"), &path.child("instructions")),
            description: self.string(map.get("description"), &path.child("description")),
            format: self.string(map.get("format"), &path.child("format")),
            attr_name: self.string(map.get("attr_name"), &path.child("attr_name")),
            default: map
                .get("default")
                .filter(|n| !n.is_null())
                .map(ParsedNode::to_json)
                .into(),
            required: self.boolean(map.get("required"), &path.child("required")),
        })
    }

    /// Report unknown keys and missing required keys of an object
    fn check_keys(&mut self, schema: &ObjectSchema, map: &IndexMap<String, ParsedNode>, path: &Path) {
        for key in map.keys() {
            if schema.field(key).is_none() {
                self.report(
                    StructuralIssue::new(
                        StructuralKind::UnknownField,
                        path.child(key.as_str()),
                        format!("Unknown field '{}' is not allowed", key),
                    )
                    .with_suggestion(format!(
                        "Remove '{}'; a {} accepts: {}",
                        key,
                        schema.name,
                        schema.allowed()
                    )),
                );
            }
        }
        for spec in schema.fields.iter().filter(|f| f.required) {
            if map.get(spec.name).map_or(true, ParsedNode::is_null) {
                self.report(
                    StructuralIssue::new(
                        StructuralKind::RequiredMissing,
                        path.child(spec.name),
                        format!("Required field '{}' is missing", spec.name),
                    )
                    .with_suggestion(format!("Add '{}:' to the {}", spec.name, schema.name)),
                );
            }
        }
    }

    fn string(&mut self, node: Option<&ParsedNode>, path: &Path) -> Attr<String> {
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Attr::Absent;
        };
        match &node.value {
            NodeValue::Scalar(Scalar::Str(s)) => Attr::Present(s.clone()),
            NodeValue::Scalar(other) => {
                self.wrong_type(path, "a string value", other);
                Attr::Invalid
            }
            _ => {
                self.wrong_container(path, "a string value", node);
                Attr::Invalid
            }
        }
    }

    fn boolean(&mut self, node: Option<&ParsedNode>, path: &Path) -> Attr<bool> {
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Attr::Absent;
        };
        match &node.value {
            NodeValue::Scalar(Scalar::Bool(b)) => Attr::Present(*b),
            NodeValue::Scalar(other) => {
                self.wrong_type(path, "a boolean value", other);
                Attr::Invalid
            }
            _ => {
                self.wrong_container(path, "a boolean value", node);
                Attr::Invalid
            }
        }
    }

    fn string_list(&mut self, node: Option<&ParsedNode>, path: &Path) -> Attr<Vec<String>> {
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Attr::Absent;
        };
        let Some(items) = node.as_sequence() else {
            self.wrong_container(path, "a list", node);
            return Attr::Invalid;
        };
        self.strings(items, path).map_or(Attr::Invalid, Attr::Present)
    }

    fn type_spec(&mut self, node: Option<&ParsedNode>, path: &Path) -> Attr<TypeSpec> {
        let Some(node) = node.filter(|n| !n.is_null()) else {
            return Attr::Absent;
        };
        match &node.value {
            NodeValue::Scalar(Scalar::Str(name)) => Attr::Present(TypeSpec::Single(name.clone())),
            NodeValue::Scalar(other) => {
                self.wrong_type(path, "a type name or a list of type names", other);
                Attr::Invalid
            }
            NodeValue::Sequence(items) => self
                .strings(items, path)
                .map_or(Attr::Invalid, |names| Attr::Present(TypeSpec::Union(names))),
            NodeValue::Mapping(_) => {
                self.wrong_container(path, "a type name or a list of type names", node);
                Attr::Invalid
            }
        }
    }

    /// Every item must be a string; all offending items are reported
    fn strings(&mut self, items: &[ParsedNode], path: &Path) -> Option<Vec<String>> {
        let mut values = Vec::with_capacity(items.len());
        let mut valid = true;
        for (i, item) in items.iter().enumerate() {
            match &item.value {
                NodeValue::Scalar(Scalar::Str(s)) => values.push(s.clone()),
                NodeValue::Scalar(other) => {
                    self.wrong_type(&path.child_index(i), "a string value", other);
                    valid = false;
                }
                _ => {
                    self.wrong_container(&path.child_index(i), "a string value", item);
                    valid = false;
                }
            }
        }
        valid.then_some(values)
    }

    fn wrong_type(&mut self, path: &Path, expected: &str, found: &Scalar) {
        self.report(StructuralIssue::new(
            StructuralKind::WrongType,
            path.clone(),
            format!("Expected {}, got {} '{}'", expected, found.type_name(), found),
        ));
    }

    fn wrong_container(&mut self, path: &Path, expected: &str, found: &ParsedNode) {
        self.report(StructuralIssue::new(
            StructuralKind::WrongContainer,
            path.clone(),
            format!("Expected {}, got {}", expected, describe(found)),
        ));
    }
}

fn describe(node: &ParsedNode) -> &'static str {
    match &node.value {
        NodeValue::Scalar(scalar) => scalar.type_name(),
        NodeValue::Mapping(_) => "a dictionary",
        NodeValue::Sequence(_) => "a list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn load_text(text: &str) -> LoadOutcome {
        load(parse(text).unwrap().root())
    }

    fn kinds(outcome: &LoadOutcome) -> Vec<(StructuralKind, String)> {
        outcome
            .issues
            .iter()
            .map(|i| (i.kind, i.path.to_string()))
            .collect()
    }

    #[test]
    fn test_loads_full_group() {
        let outcome = load_text(
            "statement:\n  prompt:\n    instructions: Extract\n  fields:\n    amount:\n      prompt:\n        identifiers: [\"Total\"]\n        type: [\"int\", \"float\"]\n        default: 0\n",
        );
        assert!(outcome.is_clean());
        let model = outcome.model.unwrap();
        let Attr::Present(group) = model.group("statement") else {
            panic!("statement should load");
        };
        assert_eq!(group.prompt.present().unwrap().instructions, Attr::Present("Extract".into()));
        let (name, field) = group.field_entries().next().unwrap();
        assert_eq!(name, "amount");
        let prompt = field.prompt.present().unwrap();
        assert_eq!(prompt.identifiers, Attr::Present(vec!["Total".to_string()]));
        assert_eq!(
            prompt.type_spec,
            Attr::Present(TypeSpec::Union(vec!["int".into(), "float".into()]))
        );
        assert_eq!(prompt.default, Attr::Present(serde_json::json!(0)));
    }

    #[test]
    fn test_non_mapping_top_level_has_no_model() {
        let outcome = load_text("- a\n- b\n");
        assert!(outcome.model.is_none());
        assert_eq!(kinds(&outcome), vec![(StructuralKind::InvalidStructure, "(root)".into())]);
    }

    #[test]
    fn test_empty_mapping_keeps_empty_model() {
        let outcome = load_text("{}\n");
        assert!(outcome.model.as_ref().unwrap().is_empty());
        assert_eq!(outcome.issues[0].message, "YAML contains no groups");
    }

    #[test]
    fn test_unknown_keys_are_reported_and_dropped() {
        let outcome = load_text("g:\n  prompt:\n    instructions: x\n    colour: red\n  extra: 1\n");
        assert_eq!(
            kinds(&outcome),
            vec![
                (StructuralKind::UnknownField, "g.extra".into()),
                (StructuralKind::UnknownField, "g.prompt.colour".into()),
            ]
        );
        assert!(outcome.model.unwrap().group("g").is_present());
    }

    #[test]
    fn test_wrong_types_mark_attributes_invalid() {
        let outcome = load_text(
            "g:\n  fields:\n    f:\n      prompt:\n        identifiers: \"one\"\n        type: 5\n        required: \"yes\"\n",
        );
        assert_eq!(
            kinds(&outcome),
            vec![
                (StructuralKind::WrongContainer, "g.fields.f.prompt.identifiers".into()),
                (StructuralKind::WrongType, "g.fields.f.prompt.type".into()),
                (StructuralKind::WrongType, "g.fields.f.prompt.required".into()),
            ]
        );
        let model = outcome.model.unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        let prompt = group.field_entries().next().unwrap().1.prompt.present().unwrap().clone();
        assert_eq!(prompt.identifiers, Attr::Invalid);
        assert_eq!(prompt.type_spec, Attr::Invalid);
        assert_eq!(prompt.required, Attr::Invalid);
    }

    #[test]
    fn test_non_string_identifier_items() {
        let outcome = load_text("g:\n  fields:\n    f:\n      prompt:\n        identifiers: [\"a\", 3, true]\n");
        assert_eq!(
            kinds(&outcome),
            vec![
                (StructuralKind::WrongType, "g.fields.f.prompt.identifiers[1]".into()),
                (StructuralKind::WrongType, "g.fields.f.prompt.identifiers[2]".into()),
            ]
        );
    }

    #[test]
    fn test_fields_container_kinds() {
        let seq = load_text("g:\n  fields:\n    - a\n");
        let model = seq.model.unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        assert_eq!(group.fields, Some(GroupFields::Malformed(ContainerKind::Sequence)));
        assert_eq!(seq.issues[0].kind, StructuralKind::WrongContainer);

        let nested = load_text("g:\n  fields:\n    inner:\n      fields:\n        x: {}\n");
        let model = nested.model.as_ref().unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        assert_eq!(
            group.fields.as_ref().and_then(GroupFields::malformed_kind),
            Some(ContainerKind::NestedGroup)
        );
        assert!(group.has_field("inner"));
        assert_eq!(group.field_entries().count(), 0);
        assert_eq!(
            kinds(&nested),
            vec![(StructuralKind::UnknownField, "g.fields.inner.fields".into())]
        );
    }

    #[test]
    fn test_nested_group_keeps_sibling_fields() {
        let outcome = load_text(
            "g:\n  fields:\n    meters: {}\n    inner:\n      fields:\n        x: {}\n    charges:\n      prompt:\n        type: str\n",
        );
        let model = outcome.model.unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        let names: Vec<_> = group.field_entries().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["meters", "charges"]);
        assert!(group.has_field("inner"));
        assert_eq!(
            group.fields.as_ref().and_then(GroupFields::malformed_kind),
            Some(ContainerKind::NestedGroup)
        );
    }

    #[test]
    fn test_scalar_field_entry_stays_as_invalid_key() {
        let outcome = load_text("g:\n  fields:\n    meters: 5\n    charges:\n");
        assert_eq!(
            kinds(&outcome),
            vec![(StructuralKind::WrongContainer, "g.fields.meters".into())]
        );
        let model = outcome.model.unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        let fields = group.fields.as_ref().and_then(GroupFields::as_mapping).unwrap();
        assert_eq!(fields.get("meters"), Some(&Attr::Invalid));
        assert!(fields["charges"].is_present());
        assert_eq!(group.fields.as_ref().and_then(GroupFields::malformed_kind), None);
    }

    #[test]
    fn test_null_values_are_absent() {
        let outcome = load_text("g:\n  prompt:\n  fields:\n    meters:\n");
        assert!(outcome.is_clean());
        let model = outcome.model.unwrap();
        let Attr::Present(group) = model.group("g") else {
            panic!("group should load");
        };
        assert!(group.prompt.is_absent());
        assert!(group.field_entries().next().unwrap().1.prompt.is_absent());
    }

    #[test]
    fn test_non_mapping_group_stays_listed() {
        let outcome = load_text("statement: 5\nother:\n  fields: {}\n");
        let model = outcome.model.unwrap();
        assert_eq!(model.keys().collect::<Vec<_>>(), vec!["statement", "other"]);
        assert_eq!(model.group("statement"), Attr::Invalid);
        assert_eq!(outcome.issues[0].message, "Group 'statement' must be a dictionary");
    }

    #[test]
    fn test_required_schema_keys() {
        const STRICT: ObjectSchema = ObjectSchema {
            name: "field",
            fields: &[FieldSpec {
                name: "prompt",
                required: true,
            }],
        };
        let doc = parse("f:\n  other: 1\n").unwrap();
        let mut loader = SchemaLoader::default();
        let map = doc.root().get("f").unwrap().as_mapping().unwrap();
        loader.check_keys(&STRICT, map, &Path::from(["f"]));
        let issues: Vec<_> = loader
            .issues
            .into_iter()
            .map(|i| i.into_issue(doc.line_index()))
            .collect();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[1].code(), IssueCode::MissingField);
        assert_eq!(issues[1].line(), Some(1));
    }

    #[test]
    fn test_structural_issue_lines() {
        let doc = parse("g:\n  prompt:\n    instructions: 12\n").unwrap();
        let outcome = load(doc.root());
        let issue = outcome.issues[0].clone().into_issue(doc.line_index());
        assert_eq!(issue.code(), IssueCode::WrongType);
        assert_eq!(issue.line(), Some(3));
        assert_eq!(issue.message(), "Expected a string value, got int '12'");
    }
}
