//! Template relationship tables and where they come from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// One row of a relationship table: `(parent, child, rel, is_rank)`.
///
/// Templates are delivered in this shape and compiled ontologies are
/// emitted in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub parent: String,
    pub child: String,
    pub rel: String,
    #[serde(default)]
    pub is_rank: bool,
}

impl RelationshipRow {
    pub fn new(
        parent: impl Into<String>,
        child: impl Into<String>,
        rel: impl Into<String>,
        is_rank: bool,
    ) -> Self {
        Self {
            parent: parent.into(),
            child: child.into(),
            rel: rel.into(),
            is_rank,
        }
    }
}

/// Source of named template graphs.
pub trait TemplateRepository {
    fn relationships(&self, name: &str) -> Result<Vec<RelationshipRow>, TemplateError>;

    fn contains(&self, name: &str) -> bool {
        self.relationships(name).is_ok()
    }
}

impl<T: TemplateRepository + ?Sized> TemplateRepository for &T {
    fn relationships(&self, name: &str) -> Result<Vec<RelationshipRow>, TemplateError> {
        (**self).relationships(name)
    }

    fn contains(&self, name: &str) -> bool {
        (**self).contains(name)
    }
}

/// Templates held in memory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    templates: BTreeMap<String, Vec<RelationshipRow>>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, rows: Vec<RelationshipRow>) {
        self.templates.insert(name.into(), rows);
    }

    pub fn with_template(mut self, name: impl Into<String>, rows: Vec<RelationshipRow>) -> Self {
        self.insert(name, rows);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

impl TemplateRepository for InMemoryTemplates {
    fn relationships(&self, name: &str) -> Result<Vec<RelationshipRow>, TemplateError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }

    fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}
