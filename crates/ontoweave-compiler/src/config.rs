use ontoweave_ontology::RelationshipKinds;
use serde::{Deserialize, Serialize};

use crate::operation::OperationKind;

/// Knobs for [`Compiler`](crate::Compiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Relationship kinds that cross component boundaries. They are held out
    /// of the traversal and stitched into root graphs afterwards.
    pub secondary_rels: Vec<String>,
    /// Template the `link` operation unions in (holds the identifier
    /// placeholder).
    pub link_template: String,
    /// Reference template `adopt` splices subtrees from.
    pub adopt_template: String,
    pub relationship_kinds: RelationshipKinds,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            secondary_rels: vec![OperationKind::PLACE.to_string()],
            link_template: "db_identifier".to_string(),
            adopt_template: "motor_ref".to_string(),
            relationship_kinds: RelationshipKinds::default(),
        }
    }
}

impl CompilerConfig {
    pub fn is_secondary(&self, rel: &str) -> bool {
        self.secondary_rels.iter().any(|r| r == rel.trim())
    }
}
