//! kgraph Annotator - Bridges to external NLP annotators
//!
//! The linguistic pipeline (sentence splitting, tagging, lemmatization,
//! dependency parsing) runs outside kgraph. This crate reads what it
//! produces:
//! - CoNLL-U, as exported by spaCy, Stanza, UDPipe and most parsers
//! - A spaCy-shaped JSON document with optional noun chunks
//! - Raw text, piped through a configured annotator command
//!
//! Every reader implements the [`Annotator`] trait and produces
//! [`AnnotatedSentence`]s for the extractor.

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use kgraph_core::{AnnotatedSentence, AnnotationFormat, AnnotatorConfig, KgError};

pub mod command;
pub mod conllu;
pub mod json;

pub use command::CommandAnnotator;
pub use conllu::ConlluReader;
pub use json::JsonReader;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur while obtaining annotations
#[derive(Error, Debug)]
pub enum AnnotatorError {
    /// Annotator output could not be parsed
    #[error("Malformed annotation at line {line}: {message}")]
    Malformed { line: usize, message: String },

    /// JSON annotation document could not be decoded
    #[error("Invalid JSON annotation: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error while reading the input
    #[error("IO error reading input: {path}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The annotator program could not be started
    #[error("Failed to start annotator `{program}`")]
    SpawnError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The document could not be written to the annotator program
    #[error("Failed to send input to annotator `{program}`")]
    WriteError {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The annotator program exited unsuccessfully
    #[error("Annotator `{program}` failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    /// Raw text input without an annotator command
    #[error("No annotator command configured for raw text input")]
    NotConfigured,

    /// Input format name not recognised
    #[error("Unknown input format `{0}`")]
    UnknownFormat(String),

    /// Input or annotator output is not valid UTF-8
    #[error("Text encoding error: {0}")]
    EncodingError(String),
}

impl From<AnnotatorError> for KgError {
    fn from(err: AnnotatorError) -> Self {
        KgError::AnnotationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AnnotatorError>;

// ============================================================================
// Annotator trait
// ============================================================================

/// Turns a document into annotated sentences
pub trait Annotator {
    /// Annotate a whole document
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>>;

    /// Annotator name for logging
    fn name(&self) -> &str;
}

/// Annotate a document, treating empty input as zero sentences.
///
/// The annotator is not invoked for empty or whitespace-only text.
pub fn annotate_document(annotator: &dyn Annotator, text: &str) -> Result<Vec<AnnotatedSentence>> {
    if text.trim().is_empty() {
        debug!(annotator = annotator.name(), "empty input, nothing to annotate");
        return Ok(Vec::new());
    }

    let sentences = annotator.annotate(text)?;
    debug!(
        annotator = annotator.name(),
        sentences = sentences.len(),
        "annotation complete"
    );
    Ok(sentences)
}

// ============================================================================
// Input format detection
// ============================================================================

/// Kind of input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// Already annotated by an external tool
    Annotated(AnnotationFormat),
    /// Raw text that still needs the annotator command
    Text,
}

impl InputFormat {
    /// Detect input format from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "conllu" | "conll" => Self::Annotated(AnnotationFormat::Conllu),
            "json" => Self::Annotated(AnnotationFormat::Json),
            _ => Self::Text,
        }
    }

    /// Detect input format from path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Text)
    }
}

impl std::str::FromStr for InputFormat {
    type Err = AnnotatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            other => other
                .parse::<AnnotationFormat>()
                .map(Self::Annotated)
                .map_err(|_| AnnotatorError::UnknownFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for InputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Annotated(format) => write!(f, "{format}"),
            Self::Text => write!(f, "text"),
        }
    }
}

/// Pick the annotator for an input format
pub fn annotator_for(format: InputFormat, config: &AnnotatorConfig) -> Result<Box<dyn Annotator>> {
    match format {
        InputFormat::Annotated(AnnotationFormat::Conllu) => Ok(Box::new(ConlluReader::new())),
        InputFormat::Annotated(AnnotationFormat::Json) => Ok(Box::new(JsonReader::new())),
        InputFormat::Text => Ok(Box::new(CommandAnnotator::from_config(config)?)),
    }
}

/// Read a file and annotate it with the annotator for `format`
pub fn load_document(
    path: &Path,
    format: InputFormat,
    config: &AnnotatorConfig,
) -> Result<Vec<AnnotatedSentence>> {
    let bytes = std::fs::read(path).map_err(|e| AnnotatorError::IoError {
        path: path.display().to_string(),
        source: e,
    })?;
    let text = String::from_utf8(bytes)
        .map_err(|e| AnnotatorError::EncodingError(format!("{}: {e}", path.display())))?;

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let annotator = annotator_for(format, config)?;
    annotate_document(annotator.as_ref(), &text)
}

// ============================================================================
// Tests
// ============================================================================
