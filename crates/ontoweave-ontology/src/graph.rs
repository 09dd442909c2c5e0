//! Ontology graph store.
//!
//! Terms live in a `StableDiGraph` arena: node handles survive removals, and a
//! label → handle index gives O(1) lookup by term. Relabeling a term only
//! rewrites its index entry; composing two graphs merges their arenas,
//! unifying nodes with equal labels.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use ontoweave_dsl::markers;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::{EdgeRef, NodeIndexable};
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::error::TemplateError;
use crate::template::{RelationshipRow, TemplateRepository};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermNode {
    pub label: String,
    /// True for class-hierarchy terms (`pmd:Motor`).
    pub is_rank: bool,
    /// Root of the rank-only component this term belongs to, if any.
    pub term_type: Option<String>,
}

impl TermNode {
    fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            is_rank: markers::is_rank_term(label),
            term_type: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub rel: String,
    pub is_rank: bool,
}

impl Relationship {
    pub fn new(rel: impl Into<String>, is_rank: bool) -> Self {
        Self {
            rel: rel.into(),
            is_rank,
        }
    }
}

/// Directed graph of terms with unique labels. At most one relationship per
/// ordered pair of terms; re-adding a pair overwrites it.
#[derive(Debug, Clone, Default)]
pub struct OntologyGraph {
    graph: StableDiGraph<TermNode, Relationship>,
    index: HashMap<String, NodeIndex>,
}

impl OntologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch `name` from `repository` and build its graph with derived
    /// `is_rank` / `term_type` attributes.
    pub fn load(repository: &dyn TemplateRepository, name: &str) -> Result<Self, TemplateError> {
        let rows = repository.relationships(name)?;
        if rows.is_empty() {
            return Err(TemplateError::Malformed {
                name: name.to_string(),
                message: "template has no relationships".to_string(),
            });
        }
        Self::from_relationships(rows)
    }

    pub fn from_relationships<I>(rows: I) -> Result<Self, TemplateError>
    where
        I: IntoIterator<Item = RelationshipRow>,
    {
        let mut graph = Self::new();
        for row in rows {
            graph.add_relationship(&row.parent, &row.child, Relationship::new(row.rel, row.is_rank));
        }
        graph.derive_term_types()?;
        Ok(graph)
    }

    /// Assign each term in a rank-only weakly connected component the
    /// component's topological root.
    fn derive_term_types(&mut self) -> Result<(), TemplateError> {
        let rank_edges: Vec<(NodeIndex, NodeIndex)> = self
            .graph
            .edge_indices()
            .filter(|&e| self.graph[e].is_rank)
            .filter_map(|e| self.graph.edge_endpoints(e))
            .collect();
        if rank_edges.is_empty() {
            return Ok(());
        }

        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut in_degree: HashMap<NodeIndex, usize> = HashMap::new();
        let mut components = UnionFind::new(self.graph.node_bound());
        for &(source, target) in &rank_edges {
            for node in [source, target] {
                if seen.insert(node) {
                    order.push(node);
                }
            }
            *in_degree.entry(target).or_default() += 1;
            components.union(source.index(), target.index());
        }

        let mut grouped: BTreeMap<usize, Vec<NodeIndex>> = BTreeMap::new();
        for &node in &order {
            grouped.entry(components.find(node.index())).or_default().push(node);
        }

        for members in grouped.values() {
            let root = members
                .iter()
                .copied()
                .find(|node| in_degree.get(node).copied().unwrap_or(0) == 0)
                .ok_or_else(|| TemplateError::CyclicRankHierarchy {
                    members: members.iter().map(|&n| self.graph[n].label.clone()).collect(),
                })?;
            let root_label = self.graph[root].label.clone();
            for &node in members {
                self.graph[node].term_type = Some(root_label.clone());
            }
        }
        Ok(())
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

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn node(&self, label: &str) -> Option<&TermNode> {
        self.index.get(label).map(|&ix| &self.graph[ix])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TermNode> {
        self.graph.node_indices().map(move |ix| &self.graph[ix])
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.nodes().map(|node| node.label.as_str())
    }

    /// Labels ending with the variable marker, placeholders included.
    pub fn variables(&self) -> Vec<String> {
        self.labels()
            .filter(|label| markers::is_variable(label))
            .map(str::to_string)
            .collect()
    }

    fn ensure_node(&mut self, label: &str) -> NodeIndex {
        if let Some(&ix) = self.index.get(label) {
            return ix;
        }
        let ix = self.graph.add_node(TermNode::new(label));
        self.index.insert(label.to_string(), ix);
        ix
    }

    pub fn add_node(&mut self, label: &str) {
        self.ensure_node(label);
    }

    pub fn add_relationship(&mut self, parent: &str, child: &str, relationship: Relationship) {
        let source = self.ensure_node(parent);
        let target = self.ensure_node(child);
        self.graph.update_edge(source, target, relationship);
    }

    pub fn relationship(&self, parent: &str, child: &str) -> Option<&Relationship> {
        let source = *self.index.get(parent)?;
        let target = *self.index.get(child)?;
        self.graph
            .find_edge(source, target)
            .map(|edge| &self.graph[edge])
    }

    /// The graph as a relationship table, in edge order.
    pub fn relationships(&self) -> Vec<RelationshipRow> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (source, target) = self.graph.edge_endpoints(edge)?;
                let relationship = &self.graph[edge];
                Some(RelationshipRow {
                    parent: self.graph[source].label.clone(),
                    child: self.graph[target].label.clone(),
                    rel: relationship.rel.clone(),
                    is_rank: relationship.is_rank,
                })
            })
            .collect()
    }

    /// `(parent, child)` pairs of every relationship of kind `rel`.
    pub fn relationships_of_kind<'a>(
        &'a self,
        rel: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.graph.edge_indices().filter_map(move |edge| {
            if self.graph[edge].rel != rel {
                return None;
            }
            let (source, target) = self.graph.edge_endpoints(edge)?;
            Some((
                self.graph[source].label.as_str(),
                self.graph[target].label.as_str(),
            ))
        })
    }

    /// Rename `old` to `new`. If `new` already exists the two terms merge:
    /// edges are carried over and `old`'s attributes win.
    ///
    /// Returns `false` when `old` is not in the graph.
    pub fn relabel(&mut self, old: &str, new: &str) -> bool {
        if old == new {
            return self.contains(old);
        }
        let Some(old_ix) = self.index.remove(old) else {
            return false;
        };
        let Some(&new_ix) = self.index.get(new) else {
            self.graph[old_ix].label = new.to_string();
            self.index.insert(new.to_string(), old_ix);
            return true;
        };

        let outgoing = self.sorted_edges(old_ix, Direction::Outgoing);
        let incoming = self.sorted_edges(old_ix, Direction::Incoming);
        let redirect = |ix: NodeIndex| if ix == old_ix { new_ix } else { ix };
        let outgoing: Vec<(NodeIndex, Relationship)> = outgoing
            .into_iter()
            .map(|(_, target, rel)| (redirect(target), rel))
            .collect();
        let incoming: Vec<(NodeIndex, Relationship)> = incoming
            .into_iter()
            .map(|(source, _, rel)| (redirect(source), rel))
            .collect();

        if let Some(mut merged) = self.graph.remove_node(old_ix) {
            merged.label = new.to_string();
            self.graph[new_ix] = merged;
        }
        for (target, rel) in outgoing {
            self.graph.update_edge(new_ix, target, rel);
        }
        for (source, rel) in incoming {
            self.graph.update_edge(source, new_ix, rel);
        }
        true
    }

    pub fn remove_node(&mut self, label: &str) -> bool {
        match self.index.remove(label) {
            Some(ix) => self.graph.remove_node(ix).is_some(),
            None => false,
        }
    }

    /// Remove every term matching `predicate`; returns how many went.
    pub fn remove_nodes_where<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&TermNode) -> bool,
    {
        let doomed: Vec<String> = self
            .nodes()
            .filter(|node| predicate(node))
            .map(|node| node.label.clone())
            .collect();
        doomed.iter().filter(|label| self.remove_node(label)).count()
    }

    pub fn retain_nodes(&mut self, keep: &HashSet<String>) {
        self.remove_nodes_where(|node| !keep.contains(&node.label));
    }

    /// Union `other` into `self`. Shared terms and relationships take
    /// `other`'s attributes.
    pub fn compose(&mut self, other: &OntologyGraph) {
        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(other.len());
        for other_ix in other.graph.node_indices() {
            let node = &other.graph[other_ix];
            let ix = match self.index.get(&node.label) {
                Some(&ix) => {
                    self.graph[ix] = node.clone();
                    ix
                }
                None => {
                    let ix = self.graph.add_node(node.clone());
                    self.index.insert(node.label.clone(), ix);
                    ix
                }
            };
            mapping.insert(other_ix, ix);
        }
        for edge in other.graph.edge_indices() {
            let Some((source, target)) = other.graph.edge_endpoints(edge) else {
                continue;
            };
            if let (Some(&s), Some(&t)) = (mapping.get(&source), mapping.get(&target)) {
                self.graph.update_edge(s, t, other.graph[edge].clone());
            }
        }
    }

    /// Every term reachable from `label`, breadth-first, excluding `label`.
    pub fn descendants(&self, label: &str) -> Vec<String> {
        self.walk(label, Direction::Outgoing, |_| true)
    }

    /// Every term reachable from `label` by walking rank relationships
    /// backwards, excluding `label`.
    pub fn rank_ancestors(&self, label: &str) -> Vec<String> {
        self.walk(label, Direction::Incoming, |rel| rel.is_rank)
    }

    /// Shortest directed path `from → to` (both ends included). Ties resolve
    /// toward earlier relationships.
    pub fn shortest_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let start = *self.index.get(from)?;
        let goal = *self.index.get(to)?;

        let mut predecessor: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(ix) = queue.pop_front() {
            if ix == goal {
                let mut path = vec![self.graph[goal].label.clone()];
                let mut cursor = goal;
                while let Some(&prev) = predecessor.get(&cursor) {
                    path.push(self.graph[prev].label.clone());
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for (_, next, _) in self.sorted_edges(ix, Direction::Outgoing) {
                if visited.insert(next) {
                    predecessor.insert(next, ix);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    fn walk<F>(&self, label: &str, direction: Direction, follow: F) -> Vec<String>
    where
        F: Fn(&Relationship) -> bool,
    {
        let Some(&start) = self.index.get(label) else {
            return Vec::new();
        };
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        let mut out = Vec::new();
        while let Some(ix) = queue.pop_front() {
            for (source, target, rel) in self.sorted_edges(ix, direction) {
                if !follow(&rel) {
                    continue;
                }
                let next = match direction {
                    Direction::Outgoing => target,
                    Direction::Incoming => source,
                };
                if visited.insert(next) {
                    out.push(self.graph[next].label.clone());
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// Edges touching `ix` in `direction`, in insertion order.
    fn sorted_edges(
        &self,
        ix: NodeIndex,
        direction: Direction,
    ) -> Vec<(NodeIndex, NodeIndex, Relationship)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex, NodeIndex, Relationship)> = self
            .graph
            .edges_directed(ix, direction)
            .map(|e| (e.id(), e.source(), e.target(), e.weight().clone()))
            .collect();
        edges.sort_by_key(|(id, ..)| id.index());
        edges
            .into_iter()
            .map(|(_, source, target, rel)| (source, target, rel))
            .collect()
    }
}
