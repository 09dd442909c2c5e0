//! Ontology instances and the rewrite operations between them.

use std::collections::{BTreeSet, HashSet};

use ontoweave_dsl::markers;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OntologyError;
use crate::graph::{OntologyGraph, Relationship};
use crate::registry::TermRegistry;
use crate::template::{RelationshipRow, TemplateRepository};

/// Relationship kinds and template terms the `link` operation relies on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipKinds {
    /// Marks the variable a link attaches to when none is named.
    pub characteristic: String,
    /// Kind of the edge from the variable to the linked identifier.
    pub resource: String,
    /// Identifier stand-in inside the linking template.
    pub identifier_placeholder: String,
}

impl Default for RelationshipKinds {
    fn default() -> Self {
        Self {
            characteristic: "pmd:characteristic".to_string(),
            resource: "pmd:resource".to_string(),
            identifier_placeholder: "db_identifier_".to_string(),
        }
    }
}

/// One instance of a template ontology.
///
/// Construction renames the template's self term to the instance name and
/// scopes every free variable below it as `"{name} {variable}"`, so several
/// instances of one template never share variable terms.
#[derive(Debug, Clone)]
pub struct OntologyEntity {
    name: String,
    self_term: String,
    base_ontology: String,
    graph: OntologyGraph,
    registry: TermRegistry,
    parent: Option<String>,
    children: BTreeSet<String>,
    child_connector: Option<String>,
    is_component: bool,
}

impl OntologyEntity {
    /// Load `base_ontology` from `repository` and instantiate it as `name`.
    pub fn instantiate(
        repository: &dyn TemplateRepository,
        name: &str,
        base_ontology: &str,
        self_term: &str,
    ) -> Result<Self, OntologyError> {
        let graph = OntologyGraph::load(repository, base_ontology)?;
        Self::from_graph(name, base_ontology, self_term, graph)
    }

    pub fn from_graph(
        name: &str,
        base_ontology: &str,
        self_term: &str,
        graph: OntologyGraph,
    ) -> Result<Self, OntologyError> {
        let registry = TermRegistry::identity(graph.variables());
        let mut entity = Self {
            name: name.to_string(),
            self_term: self_term.to_string(),
            base_ontology: base_ontology.to_string(),
            graph,
            registry,
            parent: None,
            children: BTreeSet::new(),
            child_connector: None,
            is_component: false,
        };
        entity.bind_self_term()?;
        entity.scope_free_variables()?;
        Ok(entity)
    }

    /// Mark this entity as a component root: children bound into it get
    /// their leftover free variables scoped under its name.
    pub fn with_component(mut self, is_component: bool) -> Self {
        self.is_component = is_component;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn self_term(&self) -> &str {
        &self.self_term
    }

    pub fn base_ontology(&self) -> &str {
        &self.base_ontology
    }

    pub fn graph(&self) -> &OntologyGraph {
        &self.graph
    }

    pub fn registry(&self) -> &TermRegistry {
        &self.registry
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn children(&self) -> &BTreeSet<String> {
        &self.children
    }

    /// Term directly above the most recently bound child's self term.
    pub fn child_connector(&self) -> Option<&str> {
        self.child_connector.as_deref()
    }

    pub fn is_component(&self) -> bool {
        self.is_component
    }

    /// The composed graph as a relationship table.
    pub fn relationships(&self) -> Vec<RelationshipRow> {
        self.graph.relationships()
    }

    /// Union another graph into this entity's graph without touching the
    /// registry.
    pub fn compose_graph(&mut self, other: &OntologyGraph) {
        self.graph.compose(other);
    }

    pub fn add_relationship(&mut self, parent: &str, child: &str, relationship: Relationship) {
        self.graph.add_relationship(parent, child, relationship);
    }

    /// The only sanctioned identity change: relabel `old` as `new` and,
    /// unless `ignore_ref`, record the rename in the registry.
    pub fn replace_node(
        &mut self,
        old: &str,
        new: &str,
        ignore_ref: bool,
    ) -> Result<(), OntologyError> {
        if old == new {
            return Ok(());
        }
        if !self.graph.relabel(old, new) {
            return Err(OntologyError::UnknownTerm {
                entity: self.name.clone(),
                term: old.to_string(),
            });
        }
        if !ignore_ref {
            self.registry.record_rename(old, new);
        }
        Ok(())
    }

    fn graph_map(&mut self, substitutions: Vec<(String, String)>) -> Result<(), OntologyError> {
        for (old, new) in substitutions {
            self.replace_node(&old, &new, false)?;
        }
        Ok(())
    }

    fn bind_self_term(&mut self) -> Result<(), OntologyError> {
        let current = self
            .registry
            .get(&self.self_term)
            .unwrap_or(self.self_term.as_str())
            .to_string();
        let name = self.name.clone();
        self.replace_node(&current, &name, false)
    }

    /// Scope every free variable reachable from the instance term.
    fn scope_free_variables(&mut self) -> Result<(), OntologyError> {
        let substitutions = self
            .graph
            .descendants(&self.name)
            .into_iter()
            .filter(|label| markers::is_free_variable(label))
            .map(|label| {
                let scoped = markers::scoped_variable(&self.name, &label);
                (label, scoped)
            })
            .collect();
        self.graph_map(substitutions)
    }

    /// Scope every remaining free variable under the parent's name.
    fn scope_under(&mut self, parent_name: &str) -> Result<(), OntologyError> {
        let substitutions = self
            .graph
            .variables()
            .into_iter()
            .filter(|label| markers::is_free_variable(label))
            .map(|label| {
                let scoped = markers::scoped_variable(parent_name, &label);
                (label, scoped)
            })
            .collect();
        self.graph_map(substitutions)
    }

    /// Rename the term `key` resolves to as `value`.
    pub fn define(&mut self, key: &str, value: &str) -> Result<(), OntologyError> {
        let current = self.registry.resolve(key)?.to_string();
        debug!(entity = %self.name, key, from = %current, to = value, "define");
        self.replace_node(&current, value, false)
    }

    /// [`link_with`](Self::link_with) using the default relationship kinds.
    pub fn link(
        &mut self,
        target: &OntologyGraph,
        id: &str,
        variable: Option<&str>,
    ) -> Result<(), OntologyError> {
        self.link_with(target, id, variable, &RelationshipKinds::default())
    }

    /// Attach identifier `id` to a variable of this entity.
    ///
    /// Without an explicit `variable`, the endpoint of the single
    /// characteristic relationship is used.
    pub fn link_with(
        &mut self,
        target: &OntologyGraph,
        id: &str,
        variable: Option<&str>,
        kinds: &RelationshipKinds,
    ) -> Result<(), OntologyError> {
        let resolved = match variable {
            Some(variable) => self.registry.resolve(variable)?.to_string(),
            None => self.infer_link_variable(&kinds.characteristic)?,
        };
        if !self.graph.contains(&resolved) {
            return Err(OntologyError::UnknownTerm {
                entity: self.name.clone(),
                term: resolved,
            });
        }
        debug!(entity = %self.name, variable = %resolved, id, "link");

        self.graph.compose(target);
        self.graph.add_relationship(
            &resolved,
            &kinds.identifier_placeholder,
            Relationship::new(kinds.resource.clone(), false),
        );
        self.replace_node(&kinds.identifier_placeholder, id, true)
    }

    fn infer_link_variable(&self, characteristic: &str) -> Result<String, OntologyError> {
        let candidates: BTreeSet<&str> = self
            .graph
            .relationships_of_kind(characteristic)
            .map(|(_, child)| child)
            .collect();
        let mut candidates = candidates.into_iter();
        match (candidates.next(), candidates.next()) {
            (Some(only), None) => Ok(only.to_string()),
            (first, second) => {
                let candidates = first
                    .into_iter()
                    .chain(second)
                    .chain(candidates)
                    .map(str::to_string)
                    .collect();
                Err(OntologyError::AmbiguousLink {
                    entity: self.name.clone(),
                    candidates,
                })
            }
        }
    }

    /// Compose `child` into this entity.
    ///
    /// The child's graph must contain a path from this entity's self-term
    /// label to the child's instance term. Path terms that are still
    /// unresolved template variables this entity also knows are renamed to
    /// this entity's resolution, so the two graphs share them after the union
    /// instead of duplicating the connecting chain.
    ///
    /// Nothing is mutated when the bind fails.
    pub fn bind(&mut self, child: &mut OntologyEntity) -> Result<(), OntologyError> {
        if let Some(parent) = &child.parent {
            return Err(OntologyError::Reparent {
                child: child.name.clone(),
                parent: parent.clone(),
            });
        }

        let child_term = child
            .registry
            .get(&child.self_term)
            .unwrap_or(child.self_term.as_str())
            .to_string();
        let path = child
            .graph
            .shortest_path(&self.self_term, &child_term)
            .filter(|path| path.len() >= 2)
            .ok_or_else(|| OntologyError::StructuralPath {
                parent: self.name.clone(),
                child: child.name.clone(),
                from: self.self_term.clone(),
                to: child_term.clone(),
            })?;

        let mut connector = path[path.len() - 2].clone();
        let mut substitutions = Vec::new();
        for node in &path {
            let key = child.registry.key_of(node).unwrap_or(node.as_str());
            if key != node.as_str() {
                continue;
            }
            if let Some(value) = self.registry.get(key) {
                if value != node.as_str() {
                    if *node == connector {
                        connector = value.to_string();
                    }
                    substitutions.push((node.clone(), value.to_string()));
                }
            }
        }
        debug!(
            parent = %self.name,
            child = %child.name,
            path = ?path,
            shared = substitutions.len(),
            "bind"
        );
        child.graph_map(substitutions)?;

        if self.is_component {
            child.scope_under(&self.name)?;
        }

        child.parent = Some(self.name.clone());
        self.children.insert(child.name.clone());
        self.child_connector = Some(connector);
        self.graph.compose(&child.graph);
        Ok(())
    }

    /// Splice `model_node` and everything below it from `template` into this
    /// entity, along with the rank ancestors of every spliced term.
    ///
    /// `model_node` itself becomes this entity's instance term. Placeholder
    /// terms are purged afterwards and new free variables are scoped.
    pub fn adopt(&mut self, template: &OntologyGraph, model_node: &str) -> Result<(), OntologyError> {
        if !template.contains(model_node) {
            return Err(OntologyError::UnknownModel {
                entity: self.name.clone(),
                model: model_node.to_string(),
            });
        }

        let mut keep: HashSet<String> = template.descendants(model_node).into_iter().collect();
        keep.insert(model_node.to_string());
        let ancestors: Vec<String> = keep
            .iter()
            .flat_map(|label| template.rank_ancestors(label))
            .collect();
        keep.extend(ancestors);

        let mut spliced = template.clone();
        spliced.retain_nodes(&keep);
        spliced.relabel(model_node, &self.name);
        debug!(entity = %self.name, model = model_node, terms = spliced.len(), "adopt");

        self.graph.compose(&spliced);
        self.graph
            .remove_nodes_where(|node| markers::is_placeholder(&node.label));
        self.scope_free_variables()
    }
}
