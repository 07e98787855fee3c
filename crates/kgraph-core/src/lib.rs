//! kgraph Core - Data model, errors, and shared types
//!
//! This crate defines the core abstractions used throughout kgraph:
//! - Annotated sentence model (tokens, POS categories, dependency labels, noun chunks)
//! - Triplets produced by the extractors
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{
    AnnotationFormat, AnnotatorConfig, AppConfig, ConfigError, DegeneratePolicy,
    ExtractionConfig, ExtractionMode, LoggingConfig,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for kgraph operations
#[derive(Error, Debug)]
pub enum KgError {
    /// The external annotator could not process the text
    #[error("Annotation failed: {0}")]
    AnnotationError(String),

    /// Annotator output is structurally unusable (bad heads, cycles, missing parse)
    #[error("Invalid annotation in sentence {sentence}: {message}")]
    InvalidAnnotation { sentence: usize, message: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KgError {
    /// Build an [`KgError::InvalidAnnotation`] for the given sentence
    pub fn invalid(sentence: usize, message: impl Into<String>) -> Self {
        Self::InvalidAnnotation {
            sentence,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KgError>;

// ============================================================================
// Part-of-speech and dependency labels
// ============================================================================

/// Coarse part-of-speech category.
///
/// Accepts both Universal POS tags (`NOUN`, `VERB`, `AUX`, ...) and Penn
/// Treebank tags (`NN*`, `VB*`, `PRP`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosCategory {
    Noun,
    Verb,
    Auxiliary,
    Pronoun,
    Other,
}

impl PosCategory {
    /// Map a raw tag to its coarse category
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_uppercase();
        match tag.as_str() {
            "NOUN" | "PROPN" => Self::Noun,
            "VERB" => Self::Verb,
            "AUX" => Self::Auxiliary,
            "PRON" | "PRP" | "PRP$" | "WP" | "WP$" => Self::Pronoun,
            t if t.starts_with("NN") => Self::Noun,
            t if t.starts_with("VB") => Self::Verb,
            _ => Self::Other,
        }
    }

    pub fn is_noun_like(&self) -> bool {
        matches!(self, Self::Noun)
    }

    /// Verbs and auxiliaries both count as predicates
    pub fn is_verb_like(&self) -> bool {
        matches!(self, Self::Verb | Self::Auxiliary)
    }
}

impl std::fmt::Display for PosCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Noun => write!(f, "noun"),
            Self::Verb => write!(f, "verb"),
            Self::Auxiliary => write!(f, "aux"),
            Self::Pronoun => write!(f, "pron"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Syntactic dependency of a token relative to its head.
///
/// Parses both the ClearNLP labels emitted by spaCy (`dobj`, `nsubjpass`,
/// `relcl`) and Universal Dependencies labels (`obj`, `nsubj:pass`, `acl:relcl`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepLabel {
    Root,
    Subject,
    PassiveSubject,
    DirectObject,
    PrepObject,
    IndirectObject,
    Attribute,
    PrepModifier,
    Oblique,
    ClausalModifier,
    RelativeClause,
    Other(String),
}

impl DepLabel {
    /// Parse a raw dependency label
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "nsubj:pass" => return Self::PassiveSubject,
            "acl:relcl" => return Self::RelativeClause,
            _ => {}
        }

        // Subtypes such as `obl:tmod` fall back to their base relation
        let base = label.split(':').next().unwrap_or_default();
        match base {
            "root" => Self::Root,
            "nsubj" => Self::Subject,
            "nsubjpass" => Self::PassiveSubject,
            "dobj" | "obj" => Self::DirectObject,
            "pobj" => Self::PrepObject,
            "iobj" | "dative" => Self::IndirectObject,
            "attr" => Self::Attribute,
            "prep" => Self::PrepModifier,
            "obl" => Self::Oblique,
            "acl" => Self::ClausalModifier,
            "relcl" => Self::RelativeClause,
            _ => Self::Other(label),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Root => "ROOT",
            Self::Subject => "nsubj",
            Self::PassiveSubject => "nsubjpass",
            Self::DirectObject => "dobj",
            Self::PrepObject => "pobj",
            Self::IndirectObject => "iobj",
            Self::Attribute => "attr",
            Self::PrepModifier => "prep",
            Self::Oblique => "obl",
            Self::ClausalModifier => "acl",
            Self::RelativeClause => "relcl",
            Self::Other(label) => label,
        }
    }

    /// Subject or passive subject
    pub fn is_subject(&self) -> bool {
        matches!(self, Self::Subject | Self::PassiveSubject)
    }

    /// Labels whose dependent can serve as the object of a predicate
    pub fn is_object_candidate(&self) -> bool {
        matches!(
            self,
            Self::DirectObject
                | Self::PrepObject
                | Self::IndirectObject
                | Self::Attribute
                | Self::PrepModifier
                | Self::Oblique
        )
    }

    /// Object found one level below a prepositional modifier
    pub fn is_nested_object(&self) -> bool {
        matches!(self, Self::PrepObject | Self::Oblique)
    }

    /// Clausal modifier or relative clause
    pub fn is_clause(&self) -> bool {
        matches!(self, Self::ClausalModifier | Self::RelativeClause)
    }
}

impl std::fmt::Display for DepLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Annotated sentence model
// ============================================================================

/// A single annotated token.
///
/// `index` is the token's position within its sentence and is the identity
/// used everywhere a token is referenced (heads, chunk roots).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub index: usize,

    /// Surface text as it appears in the document
    pub text: String,

    /// Lower-cased surface text
    pub lower: String,

    /// Coarse POS category
    pub pos: PosCategory,

    /// Raw tag as produced by the annotator
    pub tag: String,

    /// Canonical base form; defaults to the surface text
    pub lemma: String,

    /// Dependency label; `None` when the annotator produced no parse
    pub dep: Option<DepLabel>,

    /// Index of the governing token; `None` for roots and unparsed tokens
    pub head: Option<usize>,

    /// Whether whitespace follows the token in the original text
    #[serde(default = "default_space_after")]
    pub space_after: bool,
}

fn default_space_after() -> bool {
    true
}

impl Token {
    /// Create a token from its surface text and raw POS tag
    pub fn new(index: usize, text: impl Into<String>, tag: impl Into<String>) -> Self {
        let text = text.into();
        let tag = tag.into();
        Self {
            index,
            lower: text.to_lowercase(),
            pos: PosCategory::from_tag(&tag),
            lemma: text.clone(),
            text,
            tag,
            dep: None,
            head: None,
            space_after: true,
        }
    }

    /// Set lemma
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = lemma.into();
        self
    }

    /// Attach the token to `head` with the given raw dependency label
    pub fn with_dependency(mut self, label: &str, head: usize) -> Self {
        self.dep = Some(DepLabel::parse(label));
        self.head = Some(head);
        self
    }

    /// Set whether whitespace follows the token
    pub fn with_space_after(mut self, space_after: bool) -> Self {
        self.space_after = space_after;
        self
    }

    /// Mark the token as a sentence root
    pub fn as_root(mut self) -> Self {
        self.dep = Some(DepLabel::Root);
        self.head = None;
        self
    }

    /// Whether the annotator supplied a dependency for this token
    pub fn is_parsed(&self) -> bool {
        self.dep.is_some()
    }
}

/// A noun chunk: a contiguous noun phrase and the index of its head token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounChunk {
    /// Index of the head token
    pub root: usize,

    /// First token index (inclusive)
    pub start: usize,

    /// Last token index (exclusive)
    pub end: usize,

    /// Full phrase text
    pub text: String,
}

impl NounChunk {
    pub fn new(root: usize, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            root,
            start,
            end,
            text: text.into(),
        }
    }
}

/// One sentence as produced by the external annotator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedSentence {
    pub tokens: Vec<Token>,

    /// Noun chunks, if the annotator provides them
    #[serde(default)]
    pub noun_chunks: Vec<NounChunk>,
}

impl AnnotatedSentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            noun_chunks: Vec::new(),
        }
    }

    /// Set noun chunks
    pub fn with_noun_chunks(mut self, chunks: Vec<NounChunk>) -> Self {
        self.noun_chunks = chunks;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Every token carries a dependency label
    pub fn has_dependency_parse(&self) -> bool {
        !self.tokens.is_empty() && self.tokens.iter().all(Token::is_parsed)
    }

    /// Surface text of the whole sentence
    pub fn text(&self) -> String {
        self.span_text(0, self.tokens.len())
    }

    /// Surface text of tokens `start..end`, honouring `space_after`
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        let mut text = String::new();
        for (i, token) in self.tokens.iter().enumerate().take(end).skip(start) {
            text.push_str(&token.text);
            if token.space_after && i + 1 < end {
                text.push(' ');
            }
        }
        text
    }
}

// ============================================================================
// Triplets
// ============================================================================

/// A (subject, relation, object) fact extracted from one clause.
///
/// An empty object marks a degenerate triplet: the subject performs the
/// relation but no object was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triplet {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl Triplet {
    /// Create a new triplet; all parts are trimmed
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into().trim().to_string(),
            relation: relation.into().trim().to_string(),
            object: object.into().trim().to_string(),
        }
    }

    /// Create a triplet with no object
    pub fn degenerate(subject: impl Into<String>, relation: impl Into<String>) -> Self {
        Self::new(subject, relation, "")
    }

    pub fn is_degenerate(&self) -> bool {
        self.object.is_empty()
    }
}

impl std::fmt::Display for Triplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.subject, self.relation, self.object)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_from_universal_tags() {
        assert_eq!(PosCategory::from_tag("NOUN"), PosCategory::Noun);
        assert_eq!(PosCategory::from_tag("PROPN"), PosCategory::Noun);
        assert_eq!(PosCategory::from_tag("VERB"), PosCategory::Verb);
        assert_eq!(PosCategory::from_tag("AUX"), PosCategory::Auxiliary);
        assert_eq!(PosCategory::from_tag("PRON"), PosCategory::Pronoun);
        assert_eq!(PosCategory::from_tag("DET"), PosCategory::Other);
    }

    #[test]
    fn test_pos_from_penn_tags() {
        assert_eq!(PosCategory::from_tag("NNS"), PosCategory::Noun);
        assert_eq!(PosCategory::from_tag("NNP"), PosCategory::Noun);
        assert_eq!(PosCategory::from_tag("VBD"), PosCategory::Verb);
        assert_eq!(PosCategory::from_tag("vbz"), PosCategory::Verb);
        // Modals are not verbs in the Penn scheme
        assert_eq!(PosCategory::from_tag("MD"), PosCategory::Other);
        assert!(PosCategory::Auxiliary.is_verb_like());
        assert!(!PosCategory::Pronoun.is_noun_like());
    }

    #[test]
    fn test_dep_label_parse() {
        assert_eq!(DepLabel::parse("nsubj"), DepLabel::Subject);
        assert_eq!(DepLabel::parse("nsubj:pass"), DepLabel::PassiveSubject);
        assert_eq!(DepLabel::parse("nsubjpass"), DepLabel::PassiveSubject);
        assert_eq!(DepLabel::parse("obj"), DepLabel::DirectObject);
        assert_eq!(DepLabel::parse("dobj"), DepLabel::DirectObject);
        assert_eq!(DepLabel::parse("acl:relcl"), DepLabel::RelativeClause);
        assert_eq!(DepLabel::parse("obl:tmod"), DepLabel::Oblique);
        assert_eq!(DepLabel::parse("ROOT"), DepLabel::Root);
        assert_eq!(
            DepLabel::parse("advmod"),
            DepLabel::Other("advmod".to_string())
        );
    }

    #[test]
    fn test_dep_label_groups() {
        assert!(DepLabel::PassiveSubject.is_subject());
        assert!(DepLabel::PrepModifier.is_object_candidate());
        assert!(!DepLabel::Subject.is_object_candidate());
        assert!(DepLabel::Oblique.is_nested_object());
        assert!(DepLabel::ClausalModifier.is_clause());
        assert_eq!(DepLabel::Other("amod".into()).to_string(), "amod");
    }

    #[test]
    fn test_token_builder() {
        let token = Token::new(2, "Chased", "VBD")
            .with_lemma("chase")
            .with_dependency("relcl", 1);

        assert_eq!(token.lower, "chased");
        assert_eq!(token.pos, PosCategory::Verb);
        assert_eq!(token.dep, Some(DepLabel::RelativeClause));
        assert_eq!(token.head, Some(1));

        let root = Token::new(0, "ran", "VERB").as_root();
        assert!(root.is_parsed());
        assert_eq!(root.head, None);
        assert_eq!(root.lemma, "ran");
    }

    #[test]
    fn test_sentence_parse_detection() {
        let flat = AnnotatedSentence::new(vec![
            Token::new(0, "Dogs", "NNS"),
            Token::new(1, "bark", "VBP"),
        ]);
        assert!(!flat.has_dependency_parse());
        assert_eq!(flat.text(), "Dogs bark");

        let parsed = AnnotatedSentence::new(vec![
            Token::new(0, "Dogs", "NOUN").with_dependency("nsubj", 1),
            Token::new(1, "bark", "VERB").as_root(),
        ]);
        assert!(parsed.has_dependency_parse());
        assert!(!AnnotatedSentence::default().has_dependency_parse());
    }

    #[test]
    fn test_span_text_respects_spacing() {
        let sentence = AnnotatedSentence::new(vec![
            Token::new(0, "John", "PROPN").with_space_after(false),
            Token::new(1, "'s", "PART"),
            Token::new(2, "dog", "NOUN").with_space_after(false),
            Token::new(3, ".", "PUNCT"),
        ]);

        assert_eq!(sentence.span_text(0, 3), "John's dog");
        assert_eq!(sentence.text(), "John's dog.");
        assert_eq!(sentence.span_text(2, 10), "dog.");
        assert_eq!(sentence.span_text(3, 1), "");
    }

    #[test]
    fn test_token_deserialize_defaults() {
        let token: Token = serde_json::from_str(
            r#"{"index": 0, "text": "Dogs", "lower": "dogs", "pos": "noun", "tag": "NNS",
                "lemma": "dog", "dep": "subject", "head": 1}"#,
        )
        .unwrap();

        assert!(token.space_after);
        assert_eq!(token.dep, Some(DepLabel::Subject));
    }

    #[test]
    fn test_triplet_display_and_trim() {
        let triplet = Triplet::new(" The cat ", "chased", "the mouse ");
        assert_eq!(triplet.subject, "The cat");
        assert_eq!(triplet.to_string(), "The cat -[chased]-> the mouse");
        assert!(!triplet.is_degenerate());
        assert!(Triplet::degenerate("The cat", "ran").is_degenerate());
    }
}
