//! Graph Assembler
//!
//! Folds triplets into a [`KnowledgeGraph`]. A triplet with an object becomes
//! `subject -[relation]-> object`; one without becomes
//! `subject -[action]-> relation`. Nothing is validated, so self-loops are
//! kept and a later triplet relabels an earlier edge between the same pair.
//!
//! Author: hephaex@gmail.com

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kgraph_core::Triplet;

use crate::KnowledgeGraph;

/// Edge label used for object-less triplets
pub const ACTION_RELATION: &str = "action";

/// One observable change made while assembling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AssemblyEvent {
    NodeAdded {
        name: String,
    },
    EdgeAdded {
        from: String,
        to: String,
        relation: String,
    },
    /// An existing edge got a new label; the previous one is lost
    EdgeRelabeled {
        from: String,
        to: String,
        previous: String,
        relation: String,
    },
}

impl std::fmt::Display for AssemblyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NodeAdded { name } => write!(f, "node added: {name}"),
            Self::EdgeAdded { from, to, relation } => {
                write!(f, "edge added: {from} -[{relation}]-> {to}")
            }
            Self::EdgeRelabeled {
                from,
                to,
                previous,
                relation,
            } => write!(f, "edge relabeled: {from} -[{previous} => {relation}]-> {to}"),
        }
    }
}

/// Builds knowledge graphs from triplets
#[derive(Debug, Clone, Default)]
pub struct GraphAssembler;

impl GraphAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Build a fresh graph from `triplets`
    pub fn assemble(&self, triplets: &[Triplet]) -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        self.assemble_into(&mut graph, triplets);
        graph
    }

    /// Fold `triplets` into an existing graph, returning the changes in order
    pub fn assemble_into(
        &self,
        graph: &mut KnowledgeGraph,
        triplets: &[Triplet],
    ) -> Vec<AssemblyEvent> {
        let mut events = Vec::new();
        for triplet in triplets {
            debug!(%triplet, "adding to graph");
            self.add_triplet(graph, triplet, &mut events);
        }

        info!(
            triplets = triplets.len(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "graph assembled"
        );
        events
    }

    fn add_triplet(
        &self,
        graph: &mut KnowledgeGraph,
        triplet: &Triplet,
        events: &mut Vec<AssemblyEvent>,
    ) {
        let (target, label) = if triplet.is_degenerate() {
            (triplet.relation.as_str(), ACTION_RELATION)
        } else {
            (triplet.object.as_str(), triplet.relation.as_str())
        };

        for name in [triplet.subject.as_str(), target] {
            if graph.add_node(name) {
                record(
                    events,
                    AssemblyEvent::NodeAdded {
                        name: name.to_string(),
                    },
                );
            }
        }

        match graph.add_edge(&triplet.subject, target, label) {
            None => record(
                events,
                AssemblyEvent::EdgeAdded {
                    from: triplet.subject.clone(),
                    to: target.to_string(),
                    relation: label.to_string(),
                },
            ),
            Some(previous) if previous != label => record(
                events,
                AssemblyEvent::EdgeRelabeled {
                    from: triplet.subject.clone(),
                    to: target.to_string(),
                    previous,
                    relation: label.to_string(),
                },
            ),
            Some(_) => {}
        }
    }
}

fn record(events: &mut Vec<AssemblyEvent>, event: AssemblyEvent) {
    debug!(%event, "graph event");
    events.push(event);
}
