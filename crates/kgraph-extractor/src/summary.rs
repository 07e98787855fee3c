//! Entity/Relation Summarizer
//!
//! Lists every noun-like span and every verb-like token of a document without
//! building a graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use kgraph_core::{AnnotatedSentence, ExtractionMode, Result};

use crate::adapter::{adapt, SentenceShape};

/// Sorted, de-duplicated entities and relations of a document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub entities: BTreeSet<String>,
    pub relations: BTreeSet<String>,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }
}

/// Builds a [`Summary`] from annotated sentences.
///
/// Tree sentences contribute noun-chunk text (trimmed, case preserved) and
/// verb/auxiliary lemmas. Flat sentences contribute lower-cased noun and verb
/// tokens.
#[derive(Debug, Clone, Default)]
pub struct Summarizer {
    mode: ExtractionMode,
}

impl Summarizer {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }

    pub fn summarize(&self, sentences: &[AnnotatedSentence]) -> Result<Summary> {
        let mut summary = Summary::default();

        for (index, sentence) in sentences.iter().enumerate() {
            match adapt(sentence, index, self.mode)? {
                SentenceShape::Tree(tree) => {
                    summary.entities.extend(
                        tree.noun_chunks()
                            .iter()
                            .map(|chunk| chunk.text.trim())
                            .filter(|text| !text.is_empty())
                            .map(str::to_string),
                    );
                    summary.relations.extend(
                        tree.tokens()
                            .iter()
                            .filter(|t| t.pos.is_verb_like())
                            .map(|t| t.lemma.clone()),
                    );
                }
                SentenceShape::Flat(flat) => {
                    for token in flat.tokens() {
                        if token.pos.is_noun_like() {
                            summary.entities.insert(token.lower.clone());
                        } else if token.pos.is_verb_like() {
                            summary.relations.insert(token.lower.clone());
                        }
                    }
                }
            }
        }

        debug!(
            entities = summary.entities.len(),
            relations = summary.relations.len(),
            "summary complete"
        );
        Ok(summary)
    }
}
