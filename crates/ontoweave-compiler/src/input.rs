//! Diagram relationship input, as produced by a diagram reader.

use serde::{Deserialize, Serialize};

/// One labeled edge between two diagram elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramRelationship {
    pub parent_id: String,
    /// Raw (possibly HTML) label of the parent element.
    pub parent: String,
    pub child_id: String,
    pub child: String,
    pub rel: String,
    pub rel_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedLabel {
    pub id: String,
    pub label: String,
}

/// A designated element and the labels related to it (inline term
/// declarations, nested containers).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDesignation {
    pub node_id: String,
    pub label: String,
    #[serde(default)]
    pub related: Vec<RelatedLabel>,
}

/// Containers (areas) an element is drawn inside of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaMembership {
    pub node_id: String,
    pub area_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagramInput {
    pub relationships: Vec<DiagramRelationship>,
    #[serde(default)]
    pub designations: Vec<NodeDesignation>,
    #[serde(default)]
    pub areas: Vec<AreaMembership>,
}

impl DiagramInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a relationship row; handy for building diagrams in code.
    pub fn relate(
        mut self,
        (parent_id, parent): (&str, &str),
        rel: &str,
        (child_id, child): (&str, &str),
    ) -> Self {
        let rel_id = format!("r{}", self.relationships.len() + 1);
        self.relationships.push(DiagramRelationship {
            parent_id: parent_id.to_string(),
            parent: parent.to_string(),
            child_id: child_id.to_string(),
            child: child.to_string(),
            rel: rel.to_string(),
            rel_id,
        });
        self
    }

    pub fn designate(mut self, node_id: &str, label: &str, related: &[(&str, &str)]) -> Self {
        self.designations.push(NodeDesignation {
            node_id: node_id.to_string(),
            label: label.to_string(),
            related: related
                .iter()
                .map(|(id, label)| RelatedLabel {
                    id: id.to_string(),
                    label: label.to_string(),
                })
                .collect(),
        });
        self
    }

    pub fn inside(mut self, node_id: &str, area_ids: &[&str]) -> Self {
        self.areas.push(AreaMembership {
            node_id: node_id.to_string(),
            area_ids: area_ids.iter().map(|id| id.to_string()).collect(),
        });
        self
    }
}
