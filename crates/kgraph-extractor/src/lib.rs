//! kgraph Extractor - Triplet extraction pipeline
//!
//! Turns annotated sentences into (subject, relation, object) triplets.
//! Two strategies share the [`TripletExtractor`] trait:
//! - [`FlatTagExtractor`] for POS-tagged sentences without a parse
//! - [`DependencyExtractor`] for dependency trees, with clause recursion
//!
//! [`Extractor`] picks one per sentence from the sentence's annotation shape.

use tracing::info;

use kgraph_core::{AnnotatedSentence, ExtractionConfig, ExtractionMode, Result, Triplet};

pub mod adapter;
pub mod dependency;
pub mod flat;
pub mod metrics;
pub mod summary;

pub use adapter::{adapt, DependencyTree, FlatSentence, SentenceShape};
pub use dependency::DependencyExtractor;
pub use flat::FlatTagExtractor;
pub use metrics::{evaluate, parse_gold, GoldFormatError, TripletMetrics};
pub use summary::{Summarizer, Summary};

/// Trait for triplet extractors
pub trait TripletExtractor: Send + Sync {
    /// Extract triplets from one sentence; `index` is its position in the document
    fn extract_sentence(&self, index: usize, sentence: &AnnotatedSentence) -> Result<Vec<Triplet>>;

    /// Extract triplets from a document, in sentence order
    fn extract(&self, sentences: &[AnnotatedSentence]) -> Result<Vec<Triplet>> {
        let mut triplets = Vec::new();
        for (index, sentence) in sentences.iter().enumerate() {
            triplets.extend(self.extract_sentence(index, sentence)?);
        }

        info!(
            sentences = sentences.len(),
            triplets = triplets.len(),
            "extraction complete"
        );
        Ok(triplets)
    }
}

/// Extractor that dispatches on annotation shape
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    mode: ExtractionMode,
    flat: FlatTagExtractor,
    dependency: DependencyExtractor,
}

impl Extractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            mode: config.mode,
            flat: FlatTagExtractor::new(),
            dependency: DependencyExtractor::from_config(config),
        }
    }

    pub fn mode(&self) -> ExtractionMode {
        self.mode
    }
}

impl TripletExtractor for Extractor {
    fn extract_sentence(&self, index: usize, sentence: &AnnotatedSentence) -> Result<Vec<Triplet>> {
        match adapt(sentence, index, self.mode)? {
            SentenceShape::Flat(flat) => Ok(self.flat.extract_flat(&flat)),
            SentenceShape::Tree(tree) => Ok(self.dependency.extract_tree(&tree)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::{KgError, Token};

    fn flat_sentence() -> AnnotatedSentence {
        AnnotatedSentence::new(vec![
            Token::new(0, "Dogs", "NNS"),
            Token::new(1, "chase", "VBP"),
            Token::new(2, "cats", "NNS"),
        ])
    }

    fn tree_sentence() -> AnnotatedSentence {
        AnnotatedSentence::new(vec![
            Token::new(0, "Dogs", "NOUN").with_dependency("nsubj", 1),
            Token::new(1, "chase", "VERB").as_root(),
            Token::new(2, "cats", "NOUN").with_dependency("dobj", 1),
        ])
    }

    #[test]
    fn test_auto_mode_mixes_shapes() {
        let extractor = Extractor::default();
        let triplets = extractor
            .extract(&[flat_sentence(), tree_sentence()])
            .unwrap();

        assert_eq!(
            triplets,
            vec![
                Triplet::new("dogs", "chase", "cats"),
                Triplet::new("Dogs", "chase", "cats"),
            ]
        );
    }

    #[test]
    fn test_forced_flat_mode() {
        let config = ExtractionConfig {
            mode: ExtractionMode::Flat,
            ..Default::default()
        };
        let triplets = Extractor::new(&config).extract(&[tree_sentence()]).unwrap();
        assert_eq!(triplets, vec![Triplet::new("dogs", "chase", "cats")]);
    }

    #[test]
    fn test_tree_mode_failure_aborts_document() {
        let config = ExtractionConfig {
            mode: ExtractionMode::Tree,
            ..Default::default()
        };
        let result = Extractor::new(&config).extract(&[tree_sentence(), flat_sentence()]);
        assert!(matches!(
            result,
            Err(KgError::InvalidAnnotation { sentence: 1, .. })
        ));
    }

    #[test]
    fn test_empty_document() {
        assert!(Extractor::default().extract(&[]).unwrap().is_empty());
    }
}
