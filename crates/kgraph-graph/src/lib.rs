//! kgraph Graph - In-memory knowledge graph
//!
//! Nodes are entity or relation strings identified by exact text; edges are
//! directed and carry a relation label. At most one edge exists per ordered
//! node pair. The graph is built fresh per document and handed to a renderer
//! through [`KnowledgeGraph::nodes`] / [`KnowledgeGraph::edges`] or one of the
//! DOT / JSON exports.

use std::collections::HashMap;

use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

pub mod assembler;

pub use assembler::{AssemblyEvent, GraphAssembler, ACTION_RELATION};

// ============================================================================
// Knowledge graph
// ============================================================================

/// Directed graph of text nodes and labeled edges
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    node_index: HashMap<String, NodeIndex>,
}

impl KnowledgeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensure a node exists; returns its index and whether it was created
    fn ensure_node(&mut self, name: &str) -> (NodeIndex, bool) {
        if let Some(&idx) = self.node_index.get(name) {
            return (idx, false);
        }
        let idx = self.graph.add_node(name.to_string());
        self.node_index.insert(name.to_string(), idx);
        (idx, true)
    }

    /// Add a node; returns `true` if it did not exist yet
    pub fn add_node(&mut self, name: &str) -> bool {
        self.ensure_node(name).1
    }

    /// Add or relabel the edge `from -> to`, creating missing endpoints.
    ///
    /// Returns the previous label when an edge between the pair already
    /// existed; the new label always wins.
    pub fn add_edge(&mut self, from: &str, to: &str, relation: &str) -> Option<String> {
        let (a, _) = self.ensure_node(from);
        let (b, _) = self.ensure_node(to);

        match self.graph.find_edge(a, b) {
            Some(edge) => Some(std::mem::replace(
                &mut self.graph[edge],
                relation.to_string(),
            )),
            None => {
                self.graph.add_edge(a, b, relation.to_string());
                None
            }
        }
    }

    pub fn contains_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Label of the edge `from -> to`, if any
    pub fn edge(&self, from: &str, to: &str) -> Option<&str> {
        let a = *self.node_index.get(from)?;
        let b = *self.node_index.get(to)?;
        self.graph
            .find_edge(a, b)
            .map(|edge| self.graph[edge].as_str())
    }

    /// Node names in insertion order
    pub fn nodes(&self) -> Vec<&str> {
        self.graph
            .node_indices()
            .map(|idx| self.graph[idx].as_str())
            .collect()
    }

    /// Edges as `(from, to, relation)` in insertion order
    pub fn edges(&self) -> Vec<(&str, &str, &str)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].as_str(),
                    self.graph[edge.target()].as_str(),
                    edge.weight().as_str(),
                )
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Summary counts
    pub fn stats(&self) -> GraphStats {
        let action_edges = self
            .graph
            .edge_references()
            .filter(|edge| edge.weight() == ACTION_RELATION)
            .count();
        let isolated_nodes = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .neighbors_directed(idx, Direction::Outgoing)
                    .next()
                    .is_none()
                    && self
                        .graph
                        .neighbors_directed(idx, Direction::Incoming)
                        .next()
                        .is_none()
            })
            .count();

        GraphStats {
            nodes: self.graph.node_count(),
            edges: self.graph.edge_count(),
            action_edges,
            isolated_nodes,
        }
    }

    /// Graphviz DOT rendering with node and edge labels
    pub fn to_dot(&self) -> String {
        Dot::new(&self.graph).to_string()
    }

    /// Snapshot for serialization
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes().into_iter().map(str::to_string).collect(),
            edges: self
                .edges()
                .into_iter()
                .map(|(from, to, relation)| ExportedEdge {
                    from: from.to_string(),
                    to: to.to_string(),
                    relation: relation.to_string(),
                })
                .collect(),
        }
    }

    /// Pretty-printed JSON export
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.export())
    }
}

// ============================================================================
// Export types
// ============================================================================

/// Serializable form of a [`KnowledgeGraph`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<String>,
    pub edges: Vec<ExportedEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEdge {
    pub from: String,
    pub to: String,
    pub relation: String,
}

/// Graph statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    /// Edges produced by object-less triplets
    pub action_edges: usize,
    pub isolated_nodes: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} nodes, {} edges ({} action), {} isolated",
            self.nodes, self.edges, self.action_edges, self.isolated_nodes
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
