//! Domain schema: typed model and the loader that builds it
//!
//! Copyright (c) 2025 Gxval Contributors
//! Licensed under the Apache-2.0 license

pub mod loader;
pub mod model;

pub use loader::{load, LoadOutcome, StructuralIssue, StructuralKind};
pub use model::{
    Attr, ContainerKind, Document, ExtractedField, Group, GroupFields, Prompt, TypeSpec,
    IGNORED_GROUP_ATTRIBUTES,
};
