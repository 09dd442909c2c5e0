//! Diagram relationship kinds and their scheduling weights.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Place,
    Bind,
    Define,
    Link,
    Adopt,
    /// Anything else drawn on the diagram; never executed.
    Other,
}

impl OperationKind {
    pub const PLACE: &'static str = "mds:place";
    pub const BIND: &'static str = "mds:bind";
    pub const DEFINE: &'static str = "mds:define";
    pub const LINK: &'static str = "mds:link";
    pub const ADOPT: &'static str = "mds:adopt";

    pub fn from_rel(rel: &str) -> Self {
        match rel.trim() {
            Self::PLACE => OperationKind::Place,
            Self::BIND => OperationKind::Bind,
            Self::DEFINE => OperationKind::Define,
            Self::LINK => OperationKind::Link,
            Self::ADOPT => OperationKind::Adopt,
            _ => OperationKind::Other,
        }
    }

    /// Higher weights run first within a component.
    pub fn weight(self) -> u8 {
        match self {
            OperationKind::Other => 0,
            OperationKind::Place => 1,
            OperationKind::Bind => 2,
            OperationKind::Define => 3,
            OperationKind::Link => 4,
            OperationKind::Adopt => 5,
        }
    }
}
