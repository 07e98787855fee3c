//! Property tests for graph assembly

use std::collections::{BTreeSet, HashMap};

use kgraph_core::Triplet;
use kgraph_graph::{GraphAssembler, ACTION_RELATION};
use proptest::prelude::*;

/// Small vocabularies so that merges, relabels and self-loops actually occur
fn triplet_strategy() -> impl Strategy<Value = Triplet> {
    let entity = prop::sample::select(vec!["The cat", "the mouse", "Dogs", "cats", "she", "ran"]);
    let relation = prop::sample::select(vec!["chased", "ran", "buys", "sells", "is"]);
    let object = prop::sample::select(vec!["", "", "the mouse", "cats", "The cat", "ran"]);

    (entity, relation, object).prop_map(|(s, r, o)| Triplet::new(s, r, o))
}

proptest! {
    #[test]
    fn test_every_triplet_is_represented(
        triplets in prop::collection::vec(triplet_strategy(), 0..40)
    ) {
        let graph = GraphAssembler::new().assemble(&triplets);
        let nodes: BTreeSet<&str> = graph.nodes().into_iter().collect();

        for triplet in &triplets {
            prop_assert!(nodes.contains(triplet.subject.as_str()));
            if triplet.is_degenerate() {
                prop_assert!(nodes.contains(triplet.relation.as_str()));
                prop_assert!(graph.edge(&triplet.subject, &triplet.relation).is_some());
            } else {
                prop_assert!(nodes.contains(triplet.object.as_str()));
                prop_assert!(graph.edge(&triplet.subject, &triplet.object).is_some());
            }
        }
    }

    #[test]
    fn test_edge_endpoints_are_nodes(triplets in prop::collection::vec(triplet_strategy(), 0..40)) {
        let graph = GraphAssembler::new().assemble(&triplets);
        let nodes: BTreeSet<&str> = graph.nodes().into_iter().collect();

        // No duplicate nodes
        prop_assert_eq!(nodes.len(), graph.node_count());
        for (from, to, _) in graph.edges() {
            prop_assert!(nodes.contains(from));
            prop_assert!(nodes.contains(to));
        }
    }

    #[test]
    fn test_last_write_wins(triplets in prop::collection::vec(triplet_strategy(), 0..40)) {
        let graph = GraphAssembler::new().assemble(&triplets);

        let mut expected: HashMap<(&str, &str), &str> = HashMap::new();
        for triplet in &triplets {
            if triplet.is_degenerate() {
                expected.insert(
                    (triplet.subject.as_str(), triplet.relation.as_str()),
                    ACTION_RELATION,
                );
            } else {
                expected.insert(
                    (triplet.subject.as_str(), triplet.object.as_str()),
                    triplet.relation.as_str(),
                );
            }
        }

        prop_assert_eq!(graph.edge_count(), expected.len());
        for ((from, to), relation) in expected {
            prop_assert_eq!(graph.edge(from, to), Some(relation));
        }
    }

    #[test]
    fn test_assembly_is_idempotent(triplets in prop::collection::vec(triplet_strategy(), 0..40)) {
        let assembler = GraphAssembler::new();
        let once = assembler.assemble(&triplets);

        let mut twice = assembler.assemble(&triplets);
        assembler.assemble_into(&mut twice, &triplets);

        let nodes_once: BTreeSet<&str> = once.nodes().into_iter().collect();
        let nodes_twice: BTreeSet<&str> = twice.nodes().into_iter().collect();
        prop_assert_eq!(nodes_once, nodes_twice);
        prop_assert_eq!(once.node_count(), twice.node_count());

        let edges_once: BTreeSet<_> = once.edges().into_iter().collect();
        let edges_twice: BTreeSet<_> = twice.edges().into_iter().collect();
        prop_assert_eq!(edges_once, edges_twice);
    }
}

#[test]
fn test_empty_triplets_empty_graph() {
    let graph = GraphAssembler::new().assemble(&[]);
    assert!(graph.nodes().is_empty());
    assert!(graph.edges().is_empty());
}
