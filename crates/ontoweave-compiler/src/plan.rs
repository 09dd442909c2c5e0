//! The operation graph and the order its edges are executed in.
//!
//! Diagram elements become nodes and diagram relationships become edges.
//! Cross-component relationships (`mds:place` by default) are held out of the
//! graph and stitched in after every component has been compiled.
//!
//! Within a weakly connected component the root is the first element with no
//! incoming edge. Edges are collected breadth-first from the root, reversed so
//! the deepest operations come first, then stably sorted by descending
//! [`OperationKind::weight`]: every `adopt` runs before any `link`, every
//! `link` before any `define`, and structural `bind`s run last.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet, VecDeque};

use ontoweave_dsl::markers::is_container_label;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, IntoEdgeReferences, NodeIndexable};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::CompilerConfig;
use crate::input::DiagramInput;
use crate::operation::OperationKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramNode {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OperationEdge {
    rel: String,
    rel_id: String,
    kind: OperationKind,
    /// Synthesized from a container designation rather than drawn.
    area_connection: bool,
}

/// A relationship stitched into root graphs after compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryRelationship {
    pub rel_id: String,
    pub parent_id: String,
    pub child_id: String,
    pub rel: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedOperation {
    pub rel_id: String,
    pub kind: OperationKind,
    pub rel: String,
    pub parent_id: String,
    pub child_id: String,
    /// Raw label of the child element; carries the operation's argument.
    pub child: String,
}

impl PlannedOperation {
    pub fn weight(&self) -> u8 {
        self.kind.weight()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentPlan {
    /// `None` when every element has an incoming edge.
    pub root_id: Option<String>,
    pub nodes: Vec<String>,
    pub operations: Vec<PlannedOperation>,
    pub secondary: Vec<SecondaryRelationship>,
    /// Edges of the component the traversal from the root never reaches.
    pub unreached: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    pub components: Vec<ComponentPlan>,
    /// Elements with no relationships that are not containers.
    pub isolates: Vec<String>,
    /// Secondary relationships whose endpoints are both isolated.
    pub unplaced: Vec<SecondaryRelationship>,
}

/// Hands out ids for synthesized edges: a random header plus a counter.
#[derive(Debug, Clone)]
pub struct RelIdGenerator {
    header: String,
    next: usize,
}

impl RelIdGenerator {
    pub fn new() -> Self {
        let uuid = Uuid::new_v4().to_string();
        let header = uuid.rsplit('-').next().unwrap_or_default().to_string();
        Self::with_header(header)
    }

    pub fn with_header(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            next: 0,
        }
    }

    pub fn next_id(&mut self) -> String {
        self.next += 1;
        format!("{}-{}", self.header, self.next)
    }
}

impl Default for RelIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct OperationGraph {
    graph: StableDiGraph<DiagramNode, OperationEdge>,
    index: HashMap<String, NodeIndex>,
    secondary: Vec<SecondaryRelationship>,
    isolates: Vec<String>,
    area_nodes: HashSet<String>,
    component_roots: Vec<String>,
}

impl OperationGraph {
    /// Build the graph from diagram input, add container connections and
    /// container-to-root binds, and classify elements.
    pub fn build(
        input: &DiagramInput,
        config: &CompilerConfig,
        rel_ids: &mut RelIdGenerator,
    ) -> Self {
        let mut this = Self {
            graph: StableDiGraph::new(),
            index: HashMap::new(),
            secondary: Vec::new(),
            isolates: Vec::new(),
            area_nodes: HashSet::new(),
            component_roots: Vec::new(),
        };

        for row in &input.relationships {
            let parent = this.ensure_node(&row.parent_id, &row.parent);
            let child = this.ensure_node(&row.child_id, &row.child);
            if config.is_secondary(&row.rel) {
                this.secondary.push(SecondaryRelationship {
                    rel_id: row.rel_id.clone(),
                    parent_id: row.parent_id.clone(),
                    child_id: row.child_id.clone(),
                    rel: row.rel.trim().to_string(),
                });
                continue;
            }
            this.graph.update_edge(
                parent,
                child,
                OperationEdge {
                    rel: row.rel.trim().to_string(),
                    rel_id: row.rel_id.clone(),
                    kind: OperationKind::from_rel(&row.rel),
                    area_connection: false,
                },
            );
        }

        for designation in &input.designations {
            let node = this.ensure_node(&designation.node_id, &designation.label);
            for related in &designation.related {
                if !is_container_label(&related.label) {
                    continue;
                }
                let area = this.ensure_node(&related.id, &related.label);
                this.graph.update_edge(
                    node,
                    area,
                    OperationEdge {
                        rel: OperationKind::BIND.to_string(),
                        rel_id: rel_ids.next_id(),
                        kind: OperationKind::Bind,
                        area_connection: true,
                    },
                );
            }
        }

        this.classify();
        this.bind_innermost_areas(input, rel_ids);
        this
    }

    fn ensure_node(&mut self, id: &str, content: &str) -> NodeIndex {
        if let Some(&node) = self.index.get(id) {
            return node;
        }
        let node = self.graph.add_node(DiagramNode {
            id: id.to_string(),
            content: content.to_string(),
        });
        self.index.insert(id.to_string(), node);
        node
    }

    fn classify(&mut self) {
        self.isolates = self
            .graph
            .node_indices()
            .filter(|&node| self.graph.neighbors_undirected(node).next().is_none())
            .map(|node| &self.graph[node])
            .filter(|node| !is_container_label(&node.content))
            .map(|node| node.id.clone())
            .collect();

        self.area_nodes = self
            .graph
            .edge_references()
            .filter(|edge| edge.weight().area_connection)
            .flat_map(|edge| [edge.source(), edge.target()])
            .map(|node| self.graph[node].id.clone())
            .collect();

        let isolates: HashSet<&str> = self.isolates.iter().map(String::as_str).collect();
        self.component_roots = self
            .components()
            .iter()
            .filter_map(|members| self.topological_head(members))
            .map(|node| self.graph[node].id.clone())
            .filter(|id| !isolates.contains(id.as_str()))
            .collect();
    }

    /// Bind each component root to the innermost containers it sits in.
    fn bind_innermost_areas(&mut self, input: &DiagramInput, rel_ids: &mut RelIdGenerator) {
        for membership in &input.areas {
            if !self.component_roots.contains(&membership.node_id) {
                continue;
            }
            let Some(&root) = self.index.get(&membership.node_id) else {
                continue;
            };
            for area_id in &membership.area_ids {
                let Some(&area) = self.index.get(area_id) else {
                    warn!(area = %area_id, node = %membership.node_id, "unknown container, skipping");
                    continue;
                };
                if self.has_nested_areas(area) {
                    continue;
                }
                self.graph.update_edge(
                    area,
                    root,
                    OperationEdge {
                        rel: OperationKind::BIND.to_string(),
                        rel_id: rel_ids.next_id(),
                        kind: OperationKind::Bind,
                        area_connection: false,
                    },
                );
            }
        }
    }

    fn has_nested_areas(&self, area: NodeIndex) -> bool {
        self.graph
            .edges_directed(area, Direction::Outgoing)
            .any(|edge| edge.weight().area_connection)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Elements in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.graph.node_indices().map(move |node| &self.graph[node])
    }

    pub fn node(&self, id: &str) -> Option<&DiagramNode> {
        self.index.get(id).map(|&node| &self.graph[node])
    }

    pub fn isolates(&self) -> &[String] {
        &self.isolates
    }

    pub fn secondary(&self) -> &[SecondaryRelationship] {
        &self.secondary
    }

    /// A component root that is not itself part of a container hierarchy.
    /// Children bound into it get their free variables scoped.
    pub fn is_component(&self, id: &str) -> bool {
        self.component_roots.iter().any(|root| root == id) && !self.area_nodes.contains(id)
    }

    pub fn contains_edge(&self, parent_id: &str, child_id: &str) -> bool {
        match (self.index.get(parent_id), self.index.get(child_id)) {
            (Some(&parent), Some(&child)) => self.graph.find_edge(parent, child).is_some(),
            _ => false,
        }
    }

    /// Drop isolated elements, then order every component's edges.
    pub fn into_plan(mut self) -> ExecutionPlan {
        for id in &self.isolates {
            if let Some(node) = self.index.remove(id) {
                self.graph.remove_node(node);
            }
        }

        let mut components = Vec::new();
        let mut component_of: HashMap<&str, usize> = HashMap::new();
        for (position, members) in self.components().into_iter().enumerate() {
            for &node in &members {
                component_of.insert(self.graph[node].id.as_str(), position);
            }
            components.push(self.component_plan(&members));
        }

        let isolates: HashSet<&str> = self.isolates.iter().map(String::as_str).collect();
        let mut unplaced = Vec::new();
        for relationship in &self.secondary {
            let owner = match component_of.get(relationship.parent_id.as_str()) {
                Some(&position) => Some(position),
                None if isolates.contains(relationship.parent_id.as_str()) => {
                    component_of.get(relationship.child_id.as_str()).copied()
                }
                None => None,
            };
            match owner {
                Some(position) => components[position].secondary.push(relationship.clone()),
                None => {
                    warn!(rel_id = %relationship.rel_id, "secondary relationship between isolated elements");
                    unplaced.push(relationship.clone());
                }
            }
        }

        ExecutionPlan {
            components,
            isolates: self.isolates.clone(),
            unplaced,
        }
    }

    fn component_plan(&self, members: &[NodeIndex]) -> ComponentPlan {
        let nodes = members
            .iter()
            .map(|&node| self.graph[node].id.clone())
            .collect();
        let Some(root) = self.topological_head(members) else {
            return ComponentPlan {
                root_id: None,
                nodes,
                operations: Vec::new(),
                secondary: Vec::new(),
                unreached: Vec::new(),
            };
        };

        let mut order = self.edge_bfs(root);
        let reached: HashSet<EdgeIndex> = order.iter().copied().collect();
        let mut unreached: Vec<EdgeIndex> = members
            .iter()
            .flat_map(|&node| self.graph.edges_directed(node, Direction::Outgoing))
            .map(|edge| edge.id())
            .filter(|edge| !reached.contains(edge))
            .collect();
        unreached.sort();

        order.reverse();
        let mut operations: Vec<PlannedOperation> = order
            .into_iter()
            .filter_map(|edge| self.planned(edge))
            .collect();
        operations.sort_by_key(|op| Reverse(op.weight()));

        let unreached: Vec<String> = unreached
            .into_iter()
            .map(|edge| self.graph[edge].rel_id.clone())
            .collect();
        if !unreached.is_empty() {
            warn!(root = %self.graph[root].id, count = unreached.len(), "edges unreachable from component root");
        }
        debug!(root = %self.graph[root].id, operations = operations.len(), "component scheduled");

        ComponentPlan {
            root_id: Some(self.graph[root].id.clone()),
            nodes,
            operations,
            secondary: Vec::new(),
            unreached,
        }
    }

    fn planned(&self, edge: EdgeIndex) -> Option<PlannedOperation> {
        let (parent, child) = self.graph.edge_endpoints(edge)?;
        let weight = &self.graph[edge];
        Some(PlannedOperation {
            rel_id: weight.rel_id.clone(),
            kind: weight.kind,
            rel: weight.rel.clone(),
            parent_id: self.graph[parent].id.clone(),
            child_id: self.graph[child].id.clone(),
            child: self.graph[child].content.clone(),
        })
    }

    /// Every out-edge of every node reachable from `root`, breadth-first,
    /// each node's edges in insertion order.
    fn edge_bfs(&self, root: NodeIndex) -> Vec<EdgeIndex> {
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut edges = Vec::new();
        while let Some(node) = queue.pop_front() {
            for edge in self.out_edges(node) {
                let Some((_, child)) = self.graph.edge_endpoints(edge) else {
                    continue;
                };
                if visited.insert(child) {
                    queue.push_back(child);
                }
                edges.push(edge);
            }
        }
        edges
    }

    fn out_edges(&self, node: NodeIndex) -> Vec<EdgeIndex> {
        let mut edges: Vec<EdgeIndex> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| edge.id())
            .collect();
        edges.sort();
        edges
    }

    fn topological_head(&self, members: &[NodeIndex]) -> Option<NodeIndex> {
        members.iter().copied().find(|&node| {
            self.graph
                .neighbors_directed(node, Direction::Incoming)
                .next()
                .is_none()
        })
    }

    /// Weakly connected components, each in node order, ordered by their
    /// first node.
    fn components(&self) -> Vec<Vec<NodeIndex>> {
        let mut sets = UnionFind::new(self.graph.node_bound());
        for edge in self.graph.edge_references() {
            sets.union(edge.source().index(), edge.target().index());
        }

        let mut groups: Vec<Vec<NodeIndex>> = Vec::new();
        let mut slots: HashMap<usize, usize> = HashMap::new();
        for node in self.graph.node_indices() {
            let slot = *slots.entry(sets.find(node.index())).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(node);
        }
        groups
    }
}
