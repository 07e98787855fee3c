//! Annotated-Sentence Adapter
//!
//! Normalizes an [`AnnotatedSentence`] into the shape an extractor consumes:
//! a flat token sequence, or a validated dependency tree with its
//! root-to-phrase mapping.

use std::collections::HashMap;

use kgraph_core::{
    AnnotatedSentence, DepLabel, ExtractionMode, KgError, NounChunk, PosCategory, Result, Token,
};

// ============================================================================
// Sentence shapes
// ============================================================================

/// Shape of one sentence after adaptation
#[derive(Debug)]
pub enum SentenceShape<'a> {
    /// Ordered tokens with POS category and lemma, no tree
    Flat(FlatSentence<'a>),
    /// Dependency tree plus root-to-phrase mapping
    Tree(DependencyTree<'a>),
}

/// A sentence read positionally
#[derive(Debug, Clone, Copy)]
pub struct FlatSentence<'a> {
    index: usize,
    tokens: &'a [Token],
}

impl<'a> FlatSentence<'a> {
    pub fn new(index: usize, sentence: &'a AnnotatedSentence) -> Self {
        Self {
            index,
            tokens: &sentence.tokens,
        }
    }

    /// Position of the sentence within its document
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }
}

/// Adapt one sentence according to `mode`.
///
/// Empty sentences are always flat. In [`ExtractionMode::Tree`] a sentence
/// without a complete parse is an error rather than a silent fallback.
pub fn adapt(
    sentence: &AnnotatedSentence,
    index: usize,
    mode: ExtractionMode,
) -> Result<SentenceShape<'_>> {
    if sentence.is_empty() {
        return Ok(SentenceShape::Flat(FlatSentence::new(index, sentence)));
    }

    match mode {
        ExtractionMode::Flat => Ok(SentenceShape::Flat(FlatSentence::new(index, sentence))),
        ExtractionMode::Auto if !sentence.has_dependency_parse() => {
            Ok(SentenceShape::Flat(FlatSentence::new(index, sentence)))
        }
        ExtractionMode::Tree if !sentence.has_dependency_parse() => Err(KgError::invalid(
            index,
            "tree extraction requires a dependency parse for every token",
        )),
        ExtractionMode::Auto | ExtractionMode::Tree => {
            DependencyTree::build(index, sentence).map(SentenceShape::Tree)
        }
    }
}

// ============================================================================
// Dependency tree
// ============================================================================

/// A validated dependency tree over one sentence
#[derive(Debug)]
pub struct DependencyTree<'a> {
    index: usize,
    sentence: &'a AnnotatedSentence,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    depth: Vec<usize>,
    left_edge: Vec<usize>,
    right_edge: Vec<usize>,
    chunks: Vec<NounChunk>,
    phrases: HashMap<usize, String>,
}

impl<'a> DependencyTree<'a> {
    /// Build and validate the tree.
    ///
    /// Heads out of range, self-heads and head cycles are rejected. Noun
    /// chunks are taken from the annotator when present, otherwise derived.
    pub fn build(index: usize, sentence: &'a AnnotatedSentence) -> Result<Self> {
        let tokens = &sentence.tokens;
        let len = tokens.len();

        let mut children = vec![Vec::new(); len];
        let mut roots = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            if token.dep.is_none() {
                return Err(KgError::invalid(index, format!("token {i} has no dependency")));
            }
            match token.head {
                None => roots.push(i),
                Some(head) if head >= len => {
                    return Err(KgError::invalid(
                        index,
                        format!("token {i} has head {head} out of range"),
                    ))
                }
                Some(head) if head == i => {
                    return Err(KgError::invalid(index, format!("token {i} is its own head")))
                }
                Some(head) => children[head].push(i),
            }
        }

        // Every head chain must reach a root within `len` steps
        let mut depth = vec![0; len];
        let mut left_edge: Vec<usize> = (0..len).collect();
        let mut right_edge: Vec<usize> = (0..len).collect();
        for i in 0..len {
            let mut current = i;
            let mut steps = 0;
            while let Some(head) = tokens[current].head {
                steps += 1;
                if steps > len {
                    return Err(KgError::invalid(index, format!("head cycle through token {i}")));
                }
                left_edge[head] = left_edge[head].min(i);
                right_edge[head] = right_edge[head].max(i);
                current = head;
            }
            depth[i] = steps;
        }

        let mut tree = Self {
            index,
            sentence,
            children,
            roots,
            depth,
            left_edge,
            right_edge,
            chunks: Vec::new(),
            phrases: HashMap::new(),
        };

        tree.chunks = if sentence.noun_chunks.is_empty() {
            tree.derive_noun_chunks()
        } else {
            for chunk in &sentence.noun_chunks {
                if chunk.root >= len {
                    return Err(KgError::invalid(
                        index,
                        format!("noun chunk root {} out of range", chunk.root),
                    ));
                }
            }
            sentence.noun_chunks.clone()
        };
        tree.phrases = tree
            .chunks
            .iter()
            .map(|chunk| (chunk.root, chunk.text.clone()))
            .collect();

        Ok(tree)
    }

    /// Position of the sentence within its document
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.sentence.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentence.tokens.is_empty()
    }

    pub fn tokens(&self) -> &'a [Token] {
        &self.sentence.tokens
    }

    pub fn token(&self, idx: usize) -> &'a Token {
        &self.sentence.tokens[idx]
    }

    /// Dependents of `idx` in token order
    pub fn children(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Distance from `idx` to its root
    pub fn depth(&self, idx: usize) -> usize {
        self.depth[idx]
    }

    /// Whether the token's dependency label satisfies `pred`
    pub fn has_label(&self, idx: usize, pred: impl Fn(&DepLabel) -> bool) -> bool {
        self.sentence.tokens[idx].dep.as_ref().is_some_and(pred)
    }

    /// Noun chunks, supplied by the annotator or derived from the tree
    pub fn noun_chunks(&self) -> &[NounChunk] {
        &self.chunks
    }

    /// Full phrase headed by `idx`, or the token text when it heads none
    pub fn phrase(&self, idx: usize) -> &str {
        self.phrases
            .get(&idx)
            .map(String::as_str)
            .unwrap_or(&self.sentence.tokens[idx].text)
    }

    /// One chunk per noun or pronoun head, spanning its contiguous left
    /// pre-modifiers. Overlapping candidates are dropped.
    fn derive_noun_chunks(&self) -> Vec<NounChunk> {
        let tokens = &self.sentence.tokens;
        let mut chunks = Vec::new();
        let mut prev_end = 0;

        for (i, token) in tokens.iter().enumerate() {
            if !matches!(token.pos, PosCategory::Noun | PosCategory::Pronoun) {
                continue;
            }
            // Compound and possessive nouns belong to their head's chunk
            if self.has_label(i, is_premodifier) {
                continue;
            }

            let mut start = i;
            for &child in self.children[i].iter().rev().filter(|&&c| c < i) {
                if self.right_edge[child] + 1 != start || !self.has_label(child, is_premodifier) {
                    break;
                }
                start = self.left_edge[child];
            }

            if start < prev_end {
                continue;
            }
            chunks.push(NounChunk::new(
                i,
                start,
                i + 1,
                self.sentence.span_text(start, i + 1),
            ));
            prev_end = i + 1;
        }

        chunks
    }
}

/// Left modifiers that belong inside a noun phrase
fn is_premodifier(label: &DepLabel) -> bool {
    match label {
        DepLabel::Other(raw) => {
            raw == "nmod:poss"
                || matches!(
                    raw.split(':').next(),
                    Some("det" | "poss" | "amod" | "nummod" | "compound" | "predet" | "nn")
                )
        }
        _ => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
