use ontoweave_ontology::RelationshipRow;
use serde::{Deserialize, Serialize};

/// The relationship table of one component root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledOntology {
    pub root_id: String,
    /// Root instance name with container markers removed.
    pub name: String,
    pub relationships: Vec<RelationshipRow>,
}

/// A `bind` whose child graph had no path from the parent's self term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBinding {
    pub rel_id: String,
    pub parent_id: String,
    pub child_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentReport {
    pub root_id: Option<String>,
    pub operations: usize,
    #[serde(default)]
    pub skipped: Vec<SkippedBinding>,
    #[serde(default)]
    pub unreached: Vec<String>,
    /// Set when the component failed; it then produced no ontology.
    #[serde(default)]
    pub error: Option<String>,
}

impl ComponentReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileReport {
    pub components: Vec<ComponentReport>,
    #[serde(default)]
    pub isolates: Vec<String>,
    /// Secondary relationships that no component could take.
    #[serde(default)]
    pub unplaced: Vec<String>,
}

impl CompileReport {
    pub fn failures(&self) -> impl Iterator<Item = &ComponentReport> {
        self.components.iter().filter(|c| !c.is_success())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &SkippedBinding> {
        self.components.iter().flat_map(|c| c.skipped.iter())
    }

    pub fn is_clean(&self) -> bool {
        self.components
            .iter()
            .all(|c| c.is_success() && c.skipped.is_empty())
            && self.unplaced.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledDiagram {
    pub ontologies: Vec<CompiledOntology>,
    pub report: CompileReport,
}

impl CompiledDiagram {
    pub fn ontology(&self, name: &str) -> Option<&CompiledOntology> {
        self.ontologies.iter().find(|o| o.name == name)
    }
}
