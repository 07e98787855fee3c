//! JSON annotation reader
//!
//! Accepts a spaCy-shaped document:
//!
//! ```json
//! {
//!   "sentences": [{
//!     "tokens": [
//!       {"text": "The", "lemma": "the", "pos": "DET", "tag": "DT", "dep": "det", "head": 1},
//!       {"text": "cat", "lemma": "cat", "pos": "NOUN", "tag": "NN", "dep": "ROOT", "head": 1,
//!        "space_after": false}
//!     ],
//!     "noun_chunks": [{"root": 1, "start": 0, "end": 2, "text": "The cat"}]
//!   }]
//! }
//! ```
//!
//! `head` is the index of the governing token within the sentence. A `ROOT`
//! token has no head or points at itself; any other token pointing at
//! itself is malformed. Tokens without `dep` make the sentence a flat-tag sentence.
//! `space_after` defaults to `true`.

use serde::Deserialize;

use kgraph_core::{AnnotatedSentence, DepLabel, NounChunk, Token};

use crate::{Annotator, AnnotatorError, Result};

#[derive(Debug, Deserialize)]
struct JsonDocument {
    sentences: Vec<JsonSentence>,
}

#[derive(Debug, Deserialize)]
struct JsonSentence {
    tokens: Vec<JsonToken>,
    #[serde(default)]
    noun_chunks: Vec<JsonChunk>,
}

#[derive(Debug, Deserialize)]
struct JsonToken {
    text: String,
    lemma: Option<String>,
    pos: Option<String>,
    tag: Option<String>,
    dep: Option<String>,
    head: Option<usize>,
    space_after: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct JsonChunk {
    root: usize,
    start: Option<usize>,
    end: Option<usize>,
    text: String,
}

/// Reader for JSON annotator output
#[derive(Debug, Clone, Default)]
pub struct JsonReader;

impl JsonReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a JSON annotation document
    pub fn parse(&self, input: &str) -> Result<Vec<AnnotatedSentence>> {
        let document: JsonDocument = serde_json::from_str(input)?;

        document
            .sentences
            .into_iter()
            .enumerate()
            .map(|(i, sentence)| convert_sentence(i, sentence))
            .collect()
    }
}

impl Annotator for JsonReader {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        self.parse(text)
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn convert_sentence(sentence_idx: usize, sentence: JsonSentence) -> Result<AnnotatedSentence> {
    let len = sentence.tokens.len();
    let invalid = |message: String| AnnotatorError::Malformed {
        line: 0,
        message: format!("sentence {sentence_idx}: {message}"),
    };

    let mut tokens = Vec::with_capacity(len);
    for (index, raw) in sentence.tokens.into_iter().enumerate() {
        let tag = raw
            .pos
            .as_deref()
            .or(raw.tag.as_deref())
            .ok_or_else(|| invalid(format!("token {index} has neither `pos` nor `tag`")))?;

        let mut token =
            Token::new(index, &raw.text, tag).with_space_after(raw.space_after.unwrap_or(true));
        if let Some(lemma) = raw.lemma.filter(|l| !l.is_empty()) {
            token = token.with_lemma(lemma);
        }
        // Keep the fine-grained tag for diagnostics when both are present
        if let (Some(_), Some(fine)) = (&raw.pos, &raw.tag) {
            token.tag = fine.clone();
        }

        if let Some(dep) = raw.dep.as_deref() {
            let is_root = DepLabel::parse(dep) == DepLabel::Root;
            token = match (raw.head, is_root) {
                (None, true) => token.as_root(),
                (Some(head), true) if head == index => token.as_root(),
                (Some(head), true) => {
                    return Err(invalid(format!("root token {index} has head {head}")))
                }
                (Some(head), false) if head == index => {
                    return Err(invalid(format!("token {index} `{dep}` is its own head")))
                }
                (Some(head), false) if head < len => token.with_dependency(dep, head),
                (Some(head), false) => {
                    return Err(invalid(format!("token {index} has head {head} out of range")))
                }
                (None, false) => {
                    return Err(invalid(format!("token {index} has `dep` but no `head`")))
                }
            };
        }

        tokens.push(token);
    }

    let mut chunks = Vec::with_capacity(sentence.noun_chunks.len());
    for chunk in sentence.noun_chunks {
        if chunk.root >= len {
            return Err(invalid(format!("noun chunk root {} out of range", chunk.root)));
        }
        let start = chunk.start.unwrap_or(chunk.root);
        let end = chunk.end.unwrap_or(chunk.root + 1);
        chunks.push(NounChunk::new(chunk.root, start, end, chunk.text));
    }

    Ok(AnnotatedSentence::new(tokens).with_noun_chunks(chunks))
}
