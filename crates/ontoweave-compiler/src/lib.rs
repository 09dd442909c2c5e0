//! Diagram compiler
//!
//! Turns a diagram's relationship table into one ontology per connected
//! component:
//!
//! 1. [`OperationGraph::build`] reads diagram elements and relationships,
//!    adds container connections and classifies elements (isolates,
//!    component roots).
//! 2. Every element whose label is an instantiation directive
//!    (`Name[Template|self_term]`) becomes an
//!    [`OntologyEntity`](ontoweave_ontology::OntologyEntity).
//! 3. [`OperationGraph::into_plan`] orders each component's edges
//!    (`adopt` > `link` > `define` > `bind`).
//! 4. [`Compiler::compile`] runs the operations, stitches cross-component
//!    relationships into root graphs and reports per component.
//!
//! ```no_run
//! use ontoweave_compiler::{Compiler, DiagramInput};
//! use ontoweave_ontology::InMemoryTemplates;
//!
//! let templates = InMemoryTemplates::new();
//! let diagram = DiagramInput::new()
//!     .relate(("m", "M[Motor|motor_]"), "mds:define", ("v", "3.5(speed_)"));
//! let compiled = Compiler::new(&templates).compile(&diagram);
//! for ontology in &compiled.ontologies {
//!     println!("{}: {} relationships", ontology.name, ontology.relationships.len());
//! }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod input;
pub mod operation;
pub mod plan;
pub mod report;

pub use compiler::Compiler;
pub use config::CompilerConfig;
pub use error::CompileError;
pub use input::{AreaMembership, DiagramInput, DiagramRelationship, NodeDesignation, RelatedLabel};
pub use operation::OperationKind;
pub use plan::{
    ComponentPlan, DiagramNode, ExecutionPlan, OperationGraph, PlannedOperation, RelIdGenerator,
    SecondaryRelationship,
};
pub use report::{
    CompileReport, CompiledDiagram, CompiledOntology, ComponentReport, SkippedBinding,
};
