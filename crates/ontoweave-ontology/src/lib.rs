//! Ontology instances and their rewrite operations
//!
//! An [`OntologyEntity`] is one instance of a named template: a directed graph
//! of terms ([`OntologyGraph`]) plus the bijection between the template's
//! variables and the names they currently resolve to ([`TermRegistry`]).
//!
//! ```text
//!   TemplateRepository ──load──► OntologyGraph ──┐
//!                                                ├──► OntologyEntity
//!                 variables ──identity──► TermRegistry ┘      │
//!                                                             ├─ define
//!                                                             ├─ link
//!                                                             ├─ bind (child)
//!                                                             └─ adopt
//! ```
//!
//! Every identity change goes through [`OntologyEntity::replace_node`], so the
//! registry always answers "which template variable became this term?".

pub mod entity;
pub mod error;
pub mod graph;
pub mod registry;
pub mod template;

pub use entity::{OntologyEntity, RelationshipKinds};
pub use error::{OntologyError, RegistryError, TemplateError};
pub use graph::{OntologyGraph, Relationship, TermNode};
pub use registry::TermRegistry;
pub use template::{InMemoryTemplates, RelationshipRow, TemplateRepository};
