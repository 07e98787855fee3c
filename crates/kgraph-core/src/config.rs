//! kgraph Configuration Management
//!
//! Handles configuration from config files and environment variables,
//! with defaults that work without any configuration at all.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// External annotator bridge
    pub annotator: AnnotatorConfig,

    /// Triplet extraction behaviour
    pub extraction: ExtractionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Apply environment variables (env takes precedence over file values)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Annotator
        if let Some(command) = lookup("KGRAPH_ANNOTATOR_CMD") {
            self.annotator.command = command.split_whitespace().map(str::to_string).collect();
        }
        if let Some(format) = lookup("KGRAPH_ANNOTATOR_FORMAT") {
            self.annotator.output_format = format.parse()?;
        }

        // Extraction
        if let Some(mode) = lookup("KGRAPH_MODE") {
            self.extraction.mode = mode.parse()?;
        }
        if let Some(policy) = lookup("KGRAPH_DEGENERATE_POLICY") {
            self.extraction.degenerate_policy = policy.parse()?;
        }

        // Logging
        if let Some(level) = lookup("KGRAPH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(json) = lookup("KGRAPH_LOG_JSON") {
            self.logging.json_format = parse_bool("KGRAPH_LOG_JSON", &json)?;
        }

        Ok(self)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// External annotator bridge configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotatorConfig {
    /// Program and arguments; raw text is written to its stdin
    pub command: Vec<String>,

    /// Format the program writes to stdout
    pub output_format: AnnotationFormat,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            command: Vec::new(),
            output_format: AnnotationFormat::Conllu,
        }
    }
}

/// Serialized annotation formats understood by the readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationFormat {
    Conllu,
    Json,
}

impl std::str::FromStr for AnnotationFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "conllu" | "conll" => Ok(Self::Conllu),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "KGRAPH_ANNOTATOR_FORMAT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for AnnotationFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conllu => write!(f, "conllu"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Triplet extraction configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Which annotation shape to extract from
    pub mode: ExtractionMode,

    /// When a predicate without an object still yields a triplet
    pub degenerate_policy: DegeneratePolicy,

    /// Resolve `that`/`which`/`who` subjects of relative clauses to their antecedent
    pub resolve_relative_pronouns: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::Auto,
            degenerate_policy: DegeneratePolicy::NoObject,
            resolve_relative_pronouns: true,
        }
    }
}

/// Annotation shape selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Dependency tree when the sentence is fully parsed, flat tags otherwise
    #[default]
    Auto,
    /// Always use the positional flat-tag heuristic
    Flat,
    /// Require a dependency tree for every sentence
    Tree,
}

impl std::str::FromStr for ExtractionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "flat" => Ok(Self::Flat),
            "tree" => Ok(Self::Tree),
            _ => Err(ConfigError::InvalidValue {
                key: "KGRAPH_MODE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Flat => write!(f, "flat"),
            Self::Tree => write!(f, "tree"),
        }
    }
}

/// When the dependency-tree extractor emits a triplet with an empty object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Whenever subject and relation resolve but no object does
    #[default]
    NoObject,
    /// Only when the predicate has no dependents at all
    Childless,
}

impl std::str::FromStr for DegeneratePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "no_object" => Ok(Self::NoObject),
            "childless" => Ok(Self::Childless),
            _ => Err(ConfigError::InvalidValue {
                key: "KGRAPH_DEGENERATE_POLICY".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
