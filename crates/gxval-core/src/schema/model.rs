//! Typed domain model: groups, extracted fields and prompts
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

use indexmap::IndexMap;
use std::fmt;

/// Loaded value of an optional schema attribute
///
/// `Invalid` marks a key that was present in source but failed its shape
/// check; the loader has already reported it, so rules should leave it alone.
/// An explicit `null` loads as `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<T> {
    Absent,
    Invalid,
    Present(T),
}

impl<T> Attr<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Populated in source, valid or not
    pub fn is_set(&self) -> bool {
        !self.is_absent()
    }

    pub fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> Default for Attr<T> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<T> From<Option<T>> for Attr<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

/// Value of a prompt's `type`: one name or a union of names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Single(String),
    Union(Vec<String>),
}

impl TypeSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Union(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

/// Attributes a group prompt carries but never uses
pub const IGNORED_GROUP_ATTRIBUTES: [&str; 7] = [
    "identifiers",
    "type",
    "attr_name",
    "default",
    "description",
    "format",
    "required",
];

/// Shared attribute bundle attached to groups and fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub identifiers: Attr<Vec<String>>,
    pub type_spec: Attr<TypeSpec>,
    pub instructions: Attr<String>,
    pub description: Attr<String>,
    pub format: Attr<String>,
    pub attr_name: Attr<String>,
    pub default: Attr<serde_json::Value>,
    pub required: Attr<bool>,
}

impl Prompt {
    /// Whether the named attribute is populated in source
    pub fn is_set(&self, attribute: &str) -> bool {
        match attribute {
            "identifiers" => self.identifiers.is_set(),
            "type" => self.type_spec.is_set(),
            "instructions" => self.instructions.is_set(),
            "description" => self.description.is_set(),
            "format" => self.format.is_set(),
            "attr_name" => self.attr_name.is_set(),
            "default" => self.default.is_set(),
            "required" => self.required.is_set(),
            _ => false,
        }
    }

    /// Populated attributes a group prompt ignores, in reporting order
    pub fn ignored_group_attributes(&self) -> Vec<&'static str> {
        IGNORED_GROUP_ATTRIBUTES
            .iter()
            .copied()
            .filter(|attribute| self.is_set(attribute))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedField {
    pub prompt: Attr<Prompt>,
}

/// Shape a `fields` value had when it was not a mapping of fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    Scalar,
    /// A mapping whose entries include a nested group (`fields` inside a field)
    NestedGroup,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequence => f.write_str("a list"),
            Self::Scalar => f.write_str("a single value"),
            Self::NestedGroup => f.write_str("a nested group"),
        }
    }
}

/// Loaded `fields` value of a group
///
/// Entries whose value failed its shape check stay listed as
/// [`Attr::Invalid`], so required-field checks still see the key.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupFields {
    Mapping {
        fields: IndexMap<String, Attr<ExtractedField>>,
        /// Some entry nests a group of its own (`fields` inside a field)
        nested_group: bool,
    },
    Malformed(ContainerKind),
}

impl GroupFields {
    /// Well-formed mapping built from loaded fields
    pub fn from_fields<I, N>(fields: I) -> Self
    where
        I: IntoIterator<Item = (N, ExtractedField)>,
        N: Into<String>,
    {
        Self::Mapping {
            fields: fields
                .into_iter()
                .map(|(name, field)| (name.into(), Attr::Present(field)))
                .collect(),
            nested_group: false,
        }
    }

    /// Every entry of a mapping, including invalid ones
    pub fn as_mapping(&self) -> Option<&IndexMap<String, Attr<ExtractedField>>> {
        match self {
            Self::Mapping { fields, .. } => Some(fields),
            Self::Malformed(_) => None,
        }
    }

    /// Why the container cannot be read as a flat mapping of fields
    pub fn malformed_kind(&self) -> Option<ContainerKind> {
        match self {
            Self::Mapping {
                nested_group: true, ..
            } => Some(ContainerKind::NestedGroup),
            Self::Mapping { .. } => None,
            Self::Malformed(kind) => Some(*kind),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub prompt: Attr<Prompt>,
    pub fields: Option<GroupFields>,
}

impl Group {
    /// Loaded field entries; invalid entries and malformed containers are skipped
    pub fn field_entries(&self) -> impl Iterator<Item = (&str, &ExtractedField)> {
        self.fields
            .as_ref()
            .and_then(GroupFields::as_mapping)
            .into_iter()
            .flat_map(|fields| {
                fields
                    .iter()
                    .filter_map(|(name, field)| field.present().map(|f| (name.as_str(), f)))
            })
    }

    /// Whether `name` is a key of the fields mapping, valid or not
    pub fn has_field(&self, name: &str) -> bool {
        self.fields
            .as_ref()
            .and_then(GroupFields::as_mapping)
            .map_or(false, |fields| fields.contains_key(name))
    }
}

/// Top-level mapping of group name to group
///
/// Groups whose value was not a mapping stay listed as `Invalid` so that
/// top-level key checks still see them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub groups: IndexMap<String, Attr<Group>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_group<N: Into<String>>(mut self, name: N, group: Group) -> Self {
        self.groups.insert(name.into(), Attr::Present(group));
        self
    }

    /// Every top-level key in source order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    /// Well-formed groups in source order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &Group)> {
        self.groups
            .iter()
            .filter_map(|(name, group)| group.present().map(|g| (name.as_str(), g)))
    }

    pub fn group(&self, name: &str) -> Attr<&Group> {
        match self.groups.get(name) {
            None | Some(Attr::Absent) => Attr::Absent,
            Some(Attr::Invalid) => Attr::Invalid,
            Some(Attr::Present(group)) => Attr::Present(group),
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_group_attributes_order() {
        let prompt = Prompt {
            required: Attr::Present(true),
            identifiers: Attr::Present(vec![]),
            instructions: Attr::Present("Extract".into()),
            format: Attr::Invalid,
            ..Prompt::default()
        };
        assert_eq!(
            prompt.ignored_group_attributes(),
            vec!["identifiers", "format", "required"]
        );
    }

    #[test]
    fn test_document_keys_include_invalid_groups() {
        let mut doc = Document::new().with_group("statement", Group::default());
        doc.groups.insert("broken".into(), Attr::Invalid);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["statement", "broken"]);
        assert_eq!(doc.groups().count(), 1);
        assert_eq!(doc.group("broken"), Attr::Invalid);
        assert!(doc.group("missing").is_absent());
    }

    #[test]
    fn test_field_entries_skip_malformed() {
        let group = Group {
            fields: Some(GroupFields::Malformed(ContainerKind::Sequence)),
            ..Group::default()
        };
        assert_eq!(group.field_entries().count(), 0);
        assert!(!group.has_field("meters"));
    }

    #[test]
    fn test_invalid_field_entries_count_as_keys() {
        let mut fields = IndexMap::new();
        fields.insert("meters".to_string(), Attr::Invalid);
        fields.insert("charges".to_string(), Attr::Present(ExtractedField::default()));
        let group = Group {
            fields: Some(GroupFields::Mapping {
                fields,
                nested_group: true,
            }),
            ..Group::default()
        };
        assert!(group.has_field("meters"));
        assert_eq!(
            group.field_entries().map(|(name, _)| name).collect::<Vec<_>>(),
            vec!["charges"]
        );
        assert_eq!(
            group.fields.as_ref().and_then(GroupFields::malformed_kind),
            Some(ContainerKind::NestedGroup)
        );
        assert_eq!(GroupFields::from_fields(Vec::<(String, _)>::new()).malformed_kind(), None);
    }

    #[test]
    fn test_type_spec_names() {
        assert_eq!(TypeSpec::Single("str".into()).names(), vec!["str"]);
        assert_eq!(
            TypeSpec::Union(vec!["int".into(), "float".into()]).names(),
            vec!["int", "float"]
        );
    }
}
