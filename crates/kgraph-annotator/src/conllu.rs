//! CoNLL-U reader
//!
//! Reads the ten-column CoNLL-U format. Multiword token ranges (`1-2`) and
//! empty nodes (`1.1`) are skipped; comment lines are ignored. A token whose
//! HEAD or DEPREL column is `_` has no dependency, which makes its sentence a
//! flat-tag sentence. HEAD `0` and DEPREL `root` must occur together.

use kgraph_core::{AnnotatedSentence, DepLabel, Token};

use crate::{Annotator, AnnotatorError, Result};

const COLUMNS: usize = 10;

/// Reader for CoNLL-U annotator output
#[derive(Debug, Clone, Default)]
pub struct ConlluReader;

impl ConlluReader {
    pub fn new() -> Self {
        Self
    }

    /// Parse a CoNLL-U document
    pub fn parse(&self, input: &str) -> Result<Vec<AnnotatedSentence>> {
        let mut sentences = Vec::new();
        let mut tokens: Vec<Token> = Vec::new();

        for (i, raw) in input.lines().enumerate() {
            let line_no = i + 1;
            let line = raw.trim_end_matches('\r');

            if line.trim().is_empty() {
                if !tokens.is_empty() {
                    sentences.push(AnnotatedSentence::new(std::mem::take(&mut tokens)));
                }
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            if let Some(token) = parse_token_line(line, line_no, tokens.len())? {
                tokens.push(token);
            }
        }

        if !tokens.is_empty() {
            sentences.push(AnnotatedSentence::new(tokens));
        }

        Ok(sentences)
    }
}

impl Annotator for ConlluReader {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        self.parse(text)
    }

    fn name(&self) -> &str {
        "conllu"
    }
}

/// Parse one token line; `None` for multiword ranges and empty nodes
fn parse_token_line(line: &str, line_no: usize, position: usize) -> Result<Option<Token>> {
    let mut fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != COLUMNS {
        // Hand-written files often use spaces; accept them when unambiguous
        fields = line.split_whitespace().collect();
    }
    if fields.len() != COLUMNS {
        return Err(malformed(
            line_no,
            format!("expected {COLUMNS} columns, found {}", fields.len()),
        ));
    }

    let id = fields[0];
    if id.contains('-') || id.contains('.') {
        return Ok(None);
    }

    let id: usize = id
        .parse()
        .map_err(|_| malformed(line_no, format!("invalid token id `{id}`")))?;
    if id != position + 1 {
        return Err(malformed(
            line_no,
            format!("token id {id} out of sequence, expected {}", position + 1),
        ));
    }

    let form = fields[1];
    let lemma = none_if_blank(fields[2]).unwrap_or(form);
    let tag = none_if_blank(fields[3])
        .or_else(|| none_if_blank(fields[4]))
        .unwrap_or("X");

    let space_after = !fields[9].split('|').any(|item| item == "SpaceAfter=No");
    let mut token = Token::new(position, form, tag)
        .with_lemma(lemma)
        .with_space_after(space_after);

    match (none_if_blank(fields[6]), none_if_blank(fields[7])) {
        (Some(head), Some(deprel)) => {
            let head: usize = head
                .parse()
                .map_err(|_| malformed(line_no, format!("invalid head `{head}`")))?;
            let is_root = DepLabel::parse(deprel) == DepLabel::Root;
            token = match (head, is_root) {
                (0, true) => token.as_root(),
                (0, false) => {
                    return Err(malformed(
                        line_no,
                        format!("HEAD 0 requires DEPREL `root`, found `{deprel}`"),
                    ))
                }
                (_, true) => {
                    return Err(malformed(line_no, format!("root token has HEAD {head}")))
                }
                (head, false) => token.with_dependency(deprel, head - 1),
            };
        }
        (None, None) => {}
        _ => {
            return Err(malformed(
                line_no,
                "HEAD and DEPREL must both be present or both be `_`",
            ))
        }
    }

    Ok(Some(token))
}

fn none_if_blank(field: &str) -> Option<&str> {
    match field.trim() {
        "" | "_" => None,
        value => Some(value),
    }
}

fn malformed(line: usize, message: impl Into<String>) -> AnnotatorError {
    AnnotatorError::Malformed {
        line,
        message: message.into(),
    }
}
