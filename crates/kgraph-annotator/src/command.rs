//! Command annotator bridge
//!
//! Runs an external annotator program (typically a small spaCy or Stanza
//! script), writes the raw document to its stdin and reads CoNLL-U or JSON
//! from its stdout. A non-zero exit status is an annotation failure.
//!
//! Author: hephaex@gmail.com

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use kgraph_core::{AnnotatedSentence, AnnotationFormat, AnnotatorConfig};

use crate::{Annotator, AnnotatorError, ConlluReader, JsonReader, Result};

/// Annotator that shells out to an external program
#[derive(Debug, Clone)]
pub struct CommandAnnotator {
    program: String,
    args: Vec<String>,
    format: AnnotationFormat,
}

impl CommandAnnotator {
    /// Create a bridge to `program`, expecting CoNLL-U output
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            format: AnnotationFormat::Conllu,
        }
    }

    /// Build from configuration; fails when no command is configured
    pub fn from_config(config: &AnnotatorConfig) -> Result<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or(AnnotatorError::NotConfigured)?;

        Ok(Self::new(program.clone())
            .with_args(args.to_vec())
            .with_format(config.output_format))
    }

    /// Set program arguments
    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    /// Set the output format the program produces
    pub fn with_format(mut self, format: AnnotationFormat) -> Self {
        self.format = format;
        self
    }

    /// Run the program and return its stdout
    fn run(&self, text: &str) -> Result<String> {
        let spawn_error = |e| AnnotatorError::SpawnError {
            program: self.program.clone(),
            source: e,
        };

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            spawn_error(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "annotator stdin unavailable",
            ))
        })?;

        // Feed stdin while stdout is drained so large documents cannot deadlock
        let (output, written) = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(text.as_bytes()));
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output.map_err(spawn_error)?;

        if !output.status.success() {
            if let Ok(Err(e)) = &written {
                debug!(program = %self.program, error = %e, "annotator input not fully written");
            }
            return Err(AnnotatorError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        match written {
            Ok(Ok(())) => {}
            // The program may legitimately stop reading once it has what it needs
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!(program = %self.program, "annotator closed stdin early");
            }
            Ok(Err(e)) => {
                return Err(AnnotatorError::WriteError {
                    program: self.program.clone(),
                    source: e,
                })
            }
            Err(_) => {
                return Err(AnnotatorError::WriteError {
                    program: self.program.clone(),
                    source: std::io::Error::other("annotator input writer panicked"),
                })
            }
        }

        String::from_utf8(output.stdout).map_err(|e| {
            AnnotatorError::EncodingError(format!("annotator `{}` output: {e}", self.program))
        })
    }
}

impl Annotator for CommandAnnotator {
    fn annotate(&self, text: &str) -> Result<Vec<AnnotatedSentence>> {
        debug!(program = %self.program, format = %self.format, "running annotator");
        let output = self.run(text)?;

        match self.format {
            AnnotationFormat::Conllu => ConlluReader::new().parse(&output),
            AnnotationFormat::Json => JsonReader::new().parse(&output),
        }
    }

    fn name(&self) -> &str {
        &self.program
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> CommandAnnotator {
        CommandAnnotator::new("sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[test]
    fn test_from_config_requires_command() {
        let result = CommandAnnotator::from_config(&AnnotatorConfig::default());
        assert!(matches!(result, Err(AnnotatorError::NotConfigured)));

        let config = AnnotatorConfig {
            command: vec!["python3".to_string(), "annotate.py".to_string()],
            output_format: AnnotationFormat::Json,
        };
        let annotator = CommandAnnotator::from_config(&config).unwrap();
        assert_eq!(annotator.name(), "python3");
        assert_eq!(annotator.args, vec!["annotate.py"]);
        assert_eq!(annotator.format, AnnotationFormat::Json);
    }

    #[test]
    fn test_reads_conllu_from_stdout() {
        // Ignores stdin and prints a fixed one-sentence parse
        let annotator = shell(concat!(
            "cat > /dev/null; printf '",
            "1\\tDogs\\tdog\\tNOUN\\tNNS\\t_\\t2\\tnsubj\\t_\\t_\\n",
            "2\\tbark\\tbark\\tVERB\\tVBP\\t_\\t0\\troot\\t_\\t_\\n'",
        ));

        let sentences = annotator.annotate("Dogs bark.").unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(sentences[0].tokens[1].lemma, "bark");
    }

    #[test]
    fn test_nonzero_exit_is_failure() {
        let annotator = shell("cat > /dev/null; echo 'model not found' >&2; exit 3");
        let result = annotator.annotate("Dogs bark.");

        match result {
            Err(AnnotatorError::CommandFailed { stderr, .. }) => {
                assert_eq!(stderr, "model not found")
            }
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_program_ignoring_stdin() {
        // Exits without reading; the unwritten input is not an error
        let annotator = shell("exit 0");
        let sentences = annotator.annotate(&"Dogs bark. ".repeat(100_000)).unwrap();
        assert!(sentences.is_empty());
    }

    #[test]
    fn test_missing_program() {
        let annotator = CommandAnnotator::new("kgraph-no-such-annotator");
        assert!(matches!(
            annotator.annotate("Dogs bark."),
            Err(AnnotatorError::SpawnError { .. })
        ));
    }
}
