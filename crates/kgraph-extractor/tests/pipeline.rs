//! Pipeline Integration Tests
//!
//! Annotator output -> extractor -> graph assembler, as the CLI wires them.
//!
//! Author: hephaex@gmail.com

use kgraph_annotator::{annotate_document, ConlluReader, JsonReader};
use kgraph_core::{DegeneratePolicy, ExtractionConfig, ExtractionMode, Triplet};
use kgraph_extractor::{evaluate, parse_gold, Extractor, Summarizer, TripletExtractor};
use kgraph_graph::{GraphAssembler, ACTION_RELATION};

const CAT_CONLLU: &str = "\
# text = The cat that chased the mouse ran away.
1\tThe\tthe\tDET\tDT\t_\t2\tdet\t_\t_
2\tcat\tcat\tNOUN\tNN\t_\t7\tnsubj\t_\t_
3\tthat\tthat\tPRON\tWDT\t_\t4\tnsubj\t_\t_
4\tchased\tchase\tVERB\tVBD\t_\t2\tacl:relcl\t_\t_
5\tthe\tthe\tDET\tDT\t_\t6\tdet\t_\t_
6\tmouse\tmouse\tNOUN\tNN\t_\t4\tobj\t_\t_
7\tran\trun\tVERB\tVBD\t_\t0\troot\t_\t_
8\taway\taway\tADV\tRB\t_\t7\tadvmod\t_\tSpaceAfter=No
9\t.\t.\tPUNCT\t.\t_\t7\tpunct\t_\t_

# text = She walked to the park.
1\tShe\tshe\tPRON\tPRP\t_\t2\tnsubj\t_\t_
2\twalked\twalk\tVERB\tVBD\t_\t0\troot\t_\t_
3\tto\tto\tADP\tIN\t_\t5\tcase\t_\t_
4\tthe\tthe\tDET\tDT\t_\t5\tdet\t_\t_
5\tpark\tpark\tNOUN\tNN\t_\t2\tobl\t_\tSpaceAfter=No
6\t.\t.\tPUNCT\t.\t_\t2\tpunct\t_\t_
";

const FLAT_JSON: &str = r#"{"sentences": [{"tokens": [
    {"text": "Dogs", "tag": "NNS"},
    {"text": "chase", "tag": "VBP"},
    {"text": "cats", "tag": "NNS"},
    {"text": "and", "tag": "CC"},
    {"text": "birds", "tag": "NNS"}
]}]}"#;

#[test]
fn test_dependency_pipeline() {
    let sentences = annotate_document(&ConlluReader::new(), CAT_CONLLU).unwrap();
    assert_eq!(sentences.len(), 2);

    let triplets = Extractor::default().extract(&sentences).unwrap();
    assert_eq!(
        triplets,
        vec![
            Triplet::new("The cat", "chased", "the mouse"),
            Triplet::degenerate("The cat", "ran"),
            Triplet::new("She", "walked", "the park"),
        ]
    );

    let graph = GraphAssembler::new().assemble(&triplets);
    let nodes = graph.nodes();
    for name in ["The cat", "the mouse", "ran", "She", "the park"] {
        assert!(nodes.contains(&name), "missing node {name}");
    }
    assert_eq!(graph.edge("The cat", "ran"), Some(ACTION_RELATION));
    assert_eq!(graph.edge("The cat", "the mouse"), Some("chased"));
}

#[test]
fn test_childless_policy_drops_ran() {
    let config = ExtractionConfig {
        degenerate_policy: DegeneratePolicy::Childless,
        ..Default::default()
    };
    let sentences = ConlluReader::new().parse(CAT_CONLLU).unwrap();
    let triplets = Extractor::new(&config).extract(&sentences).unwrap();

    assert!(!triplets.iter().any(Triplet::is_degenerate));
    assert!(triplets.contains(&Triplet::new("The cat", "chased", "the mouse")));
}

#[test]
fn test_flat_pipeline() {
    let sentences = annotate_document(&JsonReader::new(), FLAT_JSON).unwrap();
    let triplets = Extractor::default().extract(&sentences).unwrap();

    assert_eq!(
        triplets,
        vec![
            Triplet::new("dogs", "chase", "cats"),
            Triplet::new("dogs", "chase", "birds"),
        ]
    );

    let graph = GraphAssembler::new().assemble(&triplets);
    assert_eq!(graph.nodes(), vec!["dogs", "cats", "birds"]);
    assert_eq!(graph.stats().action_edges, 0);
}

#[test]
fn test_forced_flat_on_parsed_input() {
    let config = ExtractionConfig {
        mode: ExtractionMode::Flat,
        ..Default::default()
    };
    let sentences = ConlluReader::new().parse(CAT_CONLLU).unwrap();
    let triplets = Extractor::new(&config).extract(&sentences).unwrap();

    // First noun, first verb, every later noun; a pronoun is not a subject
    assert_eq!(triplets, vec![Triplet::new("cat", "chased", "mouse")]);
}

#[test]
fn test_summary_pipeline() {
    let sentences = ConlluReader::new().parse(CAT_CONLLU).unwrap();
    let summary = Summarizer::default().summarize(&sentences).unwrap();

    assert!(summary.entities.contains("The cat"));
    assert!(summary.entities.contains("the park"));
    assert!(summary.relations.contains("chase"));
    assert!(summary.relations.contains("walk"));
}

#[test]
fn test_evaluate_against_gold() {
    let sentences = ConlluReader::new().parse(CAT_CONLLU).unwrap();
    let triplets = Extractor::default().extract(&sentences).unwrap();
    let gold =
        parse_gold("The cat\tchased\tthe mouse\nThe cat\tran\nShe\twalked\tthe park\n").unwrap();

    let metrics = evaluate(&triplets, &gold);
    assert_eq!(metrics.true_positives, 3);
    assert!((metrics.f1_score() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_empty_document() {
    let sentences = annotate_document(&ConlluReader::new(), "   \n").unwrap();
    let triplets = Extractor::default().extract(&sentences).unwrap();
    let graph = GraphAssembler::new().assemble(&triplets);

    assert!(triplets.is_empty());
    assert!(graph.is_empty());
}
