use std::sync::Arc;

use ontoweave_dsl::TermParseError;
use ontoweave_ontology::{OntologyError, TemplateError};
use thiserror::Error;

/// Errors that abort one component. Other components still compile.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("diagram node `{node_id}` has no ontology instance")]
    MissingOntology { node_id: String },

    #[error("failed to instantiate diagram node `{node_id}`")]
    Instantiation {
        node_id: String,
        #[source]
        source: Arc<OntologyError>,
    },

    #[error("diagram node `{node_id}` is bound to itself")]
    SelfBinding { node_id: String },

    #[error("malformed term on diagram node `{node_id}`")]
    MalformedTerm {
        node_id: String,
        #[source]
        source: TermParseError,
    },

    #[error("component containing `{node_id}` has no root (cyclic relationships)")]
    NoRoot { node_id: String },

    #[error(transparent)]
    Ontology(#[from] OntologyError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}
