//! Flat-tag triplet extraction
//!
//! Positional heuristic for sentences without a dependency tree: the first
//! noun is the subject, the first verb is the relation, and every noun after
//! that verb is an object. Everything is lower-cased.

use tracing::debug;

use kgraph_core::{AnnotatedSentence, Result, Triplet};

use crate::adapter::FlatSentence;
use crate::TripletExtractor;

/// Extractor for POS-tagged sentences
#[derive(Debug, Clone, Default)]
pub struct FlatTagExtractor;

impl FlatTagExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract triplets from a flat sentence
    pub fn extract_flat(&self, sentence: &FlatSentence<'_>) -> Vec<Triplet> {
        let tokens = sentence.tokens();
        let mut subject: Option<&str> = None;

        for (i, token) in tokens.iter().enumerate() {
            if token.pos.is_noun_like() && subject.is_none() {
                subject = Some(&token.lower);
            } else if token.pos.is_verb_like() {
                let Some(subject) = subject else {
                    debug!(sentence = sentence.index(), "verb before any noun, no subject");
                    return Vec::new();
                };

                let triplets: Vec<Triplet> = tokens[i + 1..]
                    .iter()
                    .filter(|t| t.pos.is_noun_like())
                    .map(|object| Triplet::new(subject, &token.lower, &object.lower))
                    .collect();

                if triplets.is_empty() {
                    debug!(
                        sentence = sentence.index(),
                        relation = %token.lower,
                        "no object after relation"
                    );
                }
                for triplet in &triplets {
                    debug!(sentence = sentence.index(), %triplet, "accepted triplet");
                }
                return triplets;
            }
        }

        debug!(sentence = sentence.index(), "no relation found");
        Vec::new()
    }
}

impl TripletExtractor for FlatTagExtractor {
    fn extract_sentence(&self, index: usize, sentence: &AnnotatedSentence) -> Result<Vec<Triplet>> {
        Ok(self.extract_flat(&FlatSentence::new(index, sentence)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::Token;

    fn tagged(words: &[(&str, &str)]) -> AnnotatedSentence {
        AnnotatedSentence::new(
            words
                .iter()
                .enumerate()
                .map(|(i, (text, tag))| Token::new(i, *text, *tag))
                .collect(),
        )
    }

    #[test]
    fn test_one_triplet_per_object() {
        let sentence = tagged(&[
            ("Dogs", "NOUN"),
            ("chase", "VERB"),
            ("cats", "NOUN"),
            ("and", "CCONJ"),
            ("birds", "NOUN"),
        ]);

        let triplets = FlatTagExtractor::new().extract_sentence(0, &sentence).unwrap();
        assert_eq!(
            triplets,
            vec![
                Triplet::new("dogs", "chase", "cats"),
                Triplet::new("dogs", "chase", "birds"),
            ]
        );
    }

    #[test]
    fn test_penn_tags_and_lowercasing() {
        let sentence = tagged(&[
            ("The", "DT"),
            ("Committee", "NNP"),
            ("Approved", "VBD"),
            ("the", "DT"),
            ("Budget", "NN"),
            (".", "."),
        ]);

        let triplets = FlatTagExtractor::new().extract_sentence(0, &sentence).unwrap();
        assert_eq!(triplets, vec![Triplet::new("committee", "approved", "budget")]);
    }

    #[test]
    fn test_subject_captured_once() {
        // Nouns between subject and verb are neither subject nor object
        let sentence = tagged(&[
            ("Alice", "NNP"),
            ("Bob", "NNP"),
            ("met", "VBD"),
            ("Carol", "NNP"),
        ]);

        let triplets = FlatTagExtractor::new().extract_sentence(0, &sentence).unwrap();
        assert_eq!(triplets, vec![Triplet::new("alice", "met", "carol")]);
    }

    #[test]
    fn test_only_first_verb_is_relation() {
        let sentence = tagged(&[
            ("Dogs", "NNS"),
            ("chase", "VBP"),
            ("cats", "NNS"),
            ("and", "CC"),
            ("eat", "VBP"),
            ("food", "NN"),
        ]);

        let triplets = FlatTagExtractor::new().extract_sentence(0, &sentence).unwrap();
        assert_eq!(triplets.len(), 2);
        assert!(triplets.iter().all(|t| t.relation == "chase"));
        assert_eq!(triplets[1].object, "food");
    }

    #[test]
    fn test_gaps_yield_nothing() {
        let extractor = FlatTagExtractor::new();

        let no_subject = tagged(&[("Run", "VB"), ("home", "NN")]);
        assert!(extractor.extract_sentence(0, &no_subject).unwrap().is_empty());

        let no_object = tagged(&[("Dogs", "NNS"), ("bark", "VBP")]);
        assert!(extractor.extract_sentence(0, &no_object).unwrap().is_empty());

        let no_verb = tagged(&[("Dogs", "NNS"), ("and", "CC"), ("cats", "NNS")]);
        assert!(extractor.extract_sentence(0, &no_verb).unwrap().is_empty());

        assert!(extractor
            .extract_sentence(0, &AnnotatedSentence::default())
            .unwrap()
            .is_empty());
    }
}
