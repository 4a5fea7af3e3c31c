//! Concept hierarchy index
//!
//! Stores the concept DAG as a petgraph arena (edges point parent -> child)
//! plus a code -> node index map, and memoizes the transitive ancestor and
//! descendant closures of every node on first use.
//!
//! # Preconditions
//!
//! The hierarchy MUST be acyclic. Construction does not check this, and
//! closure queries on a cyclic hierarchy never terminate normally. Callers
//! that accept hierarchies from outside should run [`Hierarchy::validate`]
//! before querying.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;
use thiserror::Error;

use super::code::Code;

#[derive(Debug, Error, PartialEq)]
pub enum HierarchyError {
    #[error("Concept not found: {0}")]
    UnknownConcept(String),

    #[error("Hierarchy contains a cycle through {0}")]
    CycleDetected(Code),

    #[error("Edge {parent} -> {child} appears in only one of the parent and child maps")]
    InconsistentEdge { parent: Code, child: Code },
}

/// A concept hierarchy with memoized ancestor/descendant closures.
///
/// The closures are write-once per node, so a `Hierarchy` can be shared
/// between threads once built.
#[derive(Debug)]
pub struct Hierarchy {
    /// Concept DAG; edges run parent -> child
    graph: DiGraph<Code, ()>,

    /// Map from code to node index
    node_map: HashMap<Code, NodeIndex>,

    /// Edges declared in only one of the parent/child maps
    one_sided: Vec<(NodeIndex, NodeIndex)>,

    ancestors: Vec<OnceLock<HashSet<NodeIndex>>>,
    descendants: Vec<OnceLock<HashSet<NodeIndex>>>,
}

#[derive(Default)]
struct Builder {
    graph: DiGraph<Code, ()>,
    node_map: HashMap<Code, NodeIndex>,
}

impl Builder {
    fn node(&mut self, code: &Code) -> NodeIndex {
        if let Some(idx) = self.node_map.get(code) {
            return *idx;
        }
        let idx = self.graph.add_node(code.clone());
        self.node_map.insert(code.clone(), idx);
        idx
    }

    fn finish(
        mut self,
        edges: BTreeSet<(NodeIndex, NodeIndex)>,
        one_sided: Vec<(NodeIndex, NodeIndex)>,
    ) -> Hierarchy {
        for (parent, child) in edges {
            self.graph.add_edge(parent, child, ());
        }

        let count = self.graph.node_count();
        Hierarchy {
            graph: self.graph,
            node_map: self.node_map,
            one_sided,
            ancestors: (0..count).map(|_| OnceLock::new()).collect(),
            descendants: (0..count).map(|_| OnceLock::new()).collect(),
        }
    }
}

/// Map entries sorted by key, so node indices do not depend on hash order
fn sorted_entries(map: &HashMap<Code, Vec<Code>>) -> Vec<(&Code, &Vec<Code>)> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_by_key(|(code, _)| *code);
    entries
}

impl Hierarchy {
    /// Builds a hierarchy from caller-supplied parent and child maps.
    ///
    /// The node set is every code appearing as a key or value in either map.
    /// An edge declared in only one map is still used, and reported by
    /// [`Hierarchy::validate`].
    pub fn from_maps(
        parent_map: &HashMap<Code, Vec<Code>>,
        child_map: &HashMap<Code, Vec<Code>>,
    ) -> Self {
        let mut builder = Builder::default();

        let mut declared_down = BTreeSet::new();
        for (parent, children) in sorted_entries(child_map) {
            let p = builder.node(parent);
            for child in children {
                declared_down.insert((p, builder.node(child)));
            }
        }

        let mut declared_up = BTreeSet::new();
        for (child, parents) in sorted_entries(parent_map) {
            let c = builder.node(child);
            for parent in parents {
                declared_up.insert((builder.node(parent), c));
            }
        }

        let one_sided = declared_down
            .symmetric_difference(&declared_up)
            .copied()
            .collect();
        let edges = declared_down.union(&declared_up).copied().collect();

        builder.finish(edges, one_sided)
    }

    /// Builds a hierarchy from a child map alone, deriving the parents
    pub fn from_child_map(child_map: &HashMap<Code, Vec<Code>>) -> Self {
        let mut builder = Builder::default();
        let mut edges = BTreeSet::new();

        for (parent, children) in sorted_entries(child_map) {
            let p = builder.node(parent);
            for child in children {
                edges.insert((p, builder.node(child)));
            }
        }

        builder.finish(edges, Vec::new())
    }

    /// Builds a hierarchy from `(parent, child)` pairs
    pub fn from_edges(edges: impl IntoIterator<Item = (Code, Code)>) -> Self {
        let mut builder = Builder::default();
        let edges = edges
            .into_iter()
            .map(|(parent, child)| (builder.node(&parent), builder.node(&child)))
            .collect();

        builder.finish(edges, Vec::new())
    }

    /// Checks the acyclicity and parent/child consistency preconditions
    pub fn validate(&self) -> Result<(), HierarchyError> {
        toposort(&self.graph, None)
            .map_err(|cycle| HierarchyError::CycleDetected(self.graph[cycle.node_id()].clone()))?;

        if let Some(&(parent, child)) = self.one_sided.first() {
            return Err(HierarchyError::InconsistentEdge {
                parent: self.graph[parent].clone(),
                child: self.graph[child].clone(),
            });
        }

        Ok(())
    }

    /// Returns true if the hierarchy contains the concept
    pub fn contains(&self, code: &str) -> bool {
        self.node_map.contains_key(code)
    }

    /// Returns the number of concepts
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the hierarchy has no concepts
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns every concept code, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Code> {
        self.graph.node_weights()
    }

    /// Returns the concepts without parents, sorted by code
    pub fn roots(&self) -> Vec<&Code> {
        let mut roots: Vec<_> = self
            .graph
            .node_indices()
            .filter(|idx| {
                self.graph
                    .neighbors_directed(*idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| &self.graph[idx])
            .collect();
        roots.sort();
        roots
    }

    /// Returns the direct parents of a concept, sorted by code
    pub fn parents(&self, code: &str) -> Vec<&Code> {
        self.linked(code, Direction::Incoming)
    }

    /// Returns the direct children of a concept, sorted by code
    pub fn children(&self, code: &str) -> Vec<&Code> {
        self.linked(code, Direction::Outgoing)
    }

    fn linked(&self, code: &str, direction: Direction) -> Vec<&Code> {
        let idx = match self.index(code) {
            Some(idx) => idx,
            None => return vec![],
        };

        let mut linked: Vec<_> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| &self.graph[n])
            .collect();
        linked.sort();
        linked
    }

    /// Returns all ancestors of a concept.
    ///
    /// Empty for roots and for codes outside the hierarchy.
    pub fn ancestors(&self, code: &str) -> BTreeSet<&str> {
        self.closure_codes(code, Direction::Incoming)
    }

    /// Returns all descendants of a concept.
    ///
    /// Empty for leaves and for codes outside the hierarchy.
    pub fn descendants(&self, code: &str) -> BTreeSet<&str> {
        self.closure_codes(code, Direction::Outgoing)
    }

    /// Returns true if `ancestor` is a (transitive) ancestor of `code`
    pub fn is_ancestor(&self, ancestor: &str, code: &str) -> bool {
        match (self.index(ancestor), self.index(code)) {
            (Some(a), Some(c)) => self.ancestor_indices(c).contains(&a),
            _ => false,
        }
    }

    fn closure_codes(&self, code: &str, direction: Direction) -> BTreeSet<&str> {
        match self.index(code) {
            Some(idx) => self
                .closure(idx, direction)
                .iter()
                .map(|n| self.graph[*n].as_str())
                .collect(),
            None => BTreeSet::new(),
        }
    }

    pub(crate) fn index(&self, code: &str) -> Option<NodeIndex> {
        self.node_map.get(code).copied()
    }

    pub(crate) fn code(&self, idx: NodeIndex) -> &Code {
        &self.graph[idx]
    }

    pub(crate) fn ancestor_indices(&self, idx: NodeIndex) -> &HashSet<NodeIndex> {
        self.closure(idx, Direction::Incoming)
    }

    pub(crate) fn descendant_indices(&self, idx: NodeIndex) -> &HashSet<NodeIndex> {
        self.closure(idx, Direction::Outgoing)
    }

    /// Transitive closure in one direction, computed once per node
    fn closure(&self, idx: NodeIndex, direction: Direction) -> &HashSet<NodeIndex> {
        let cells = match direction {
            Direction::Incoming => &self.ancestors,
            Direction::Outgoing => &self.descendants,
        };

        cells[idx.index()].get_or_init(|| {
            let mut reached = HashSet::new();
            for next in self.graph.neighbors_directed(idx, direction) {
                reached.insert(next);
                reached.extend(self.closure(next, direction));
            }
            reached
        })
    }
}
