//! Ontoweave term grammar
//!
//! Diagram nodes carry free text. A handful of tiny surface forms inside that
//! text drive compilation:
//!
//! - `Name[BaseOntology|SelfTerm]`: instantiate `BaseOntology` as `Name`,
//!   binding the template's `SelfTerm` node to the new instance.
//! - `Value(Variable)`: bind a template variable to a concrete value
//!   (used by `define` and `link` edges).
//!
//! Raw diagram labels are HTML fragments; they are reduced to plain text
//! before any matching happens (see [`text::strip_html`]).
//!
//! The marker conventions shared by the rest of the workspace (rank
//! separator, variable marker, placeholder marker, container marker) live in
//! [`markers`].

pub mod directive;
pub mod markers;
pub mod text;

pub use directive::{
    BindingDirective, Delimiters, InstantiationDirective, TermMapping, TermParseError,
};
pub use text::{clean_term, strip_html};
