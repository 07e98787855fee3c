//! kgraph CLI - Command-line interface
//!
//! Usage:
//!   kgraph entities <path>
//!   kgraph triplets <path> [--json]
//!   kgraph graph <path> [--format text|dot|json] [--trace]
//!   kgraph evaluate <path> --gold <tsv>

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use kgraph_annotator::{load_document, InputFormat};
use kgraph_core::{AnnotatedSentence, AppConfig, ExtractionMode, LoggingConfig, Triplet};
use kgraph_extractor::{evaluate, parse_gold, Extractor, Summarizer, TripletExtractor};
use kgraph_graph::{GraphAssembler, KnowledgeGraph};

#[derive(Parser)]
#[command(name = "kgraph")]
#[command(about = "Triplet extraction and knowledge-graph assembly")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Input format (conllu, json, text); detected from the extension by default
    #[arg(long, global = true)]
    input_format: Option<InputFormat>,

    /// Annotation shape (auto, flat, tree)
    #[arg(long, global = true)]
    mode: Option<ExtractionMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List entities and relationships
    Entities {
        /// Input document
        path: PathBuf,
    },
    /// Print extracted triplets
    Triplets {
        /// Input document
        path: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Assemble and export the knowledge graph
    Graph {
        /// Input document
        path: PathBuf,
        /// Export format
        #[arg(long, value_enum, default_value_t = GraphFormat::Text)]
        format: GraphFormat,
        /// Print the assembly event log to stderr
        #[arg(long)]
        trace: bool,
    },
    /// Score extracted triplets against a gold standard
    Evaluate {
        /// Input document
        path: PathBuf,
        /// Tab-separated gold triplets
        #[arg(long)]
        gold: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GraphFormat {
    Text,
    Dot,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_env_override()?;
    if let Some(mode) = cli.mode {
        config.extraction.mode = mode;
    }

    init_tracing(&config.logging)?;
    debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Entities { path } => {
            let sentences = load(path, &cli, &config)?;
            let summary = Summarizer::new(config.extraction.mode).summarize(&sentences)?;

            println!("Entities: {}", join(&summary.entities));
            println!("Relationships: {}", join(&summary.relations));
        }
        Commands::Triplets { path, json } => {
            let triplets = extract(path, &cli, &config)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&triplets)?);
            } else {
                for triplet in &triplets {
                    println!("{triplet}");
                }
            }
        }
        Commands::Graph {
            path,
            format,
            trace,
        } => {
            let triplets = extract(path, &cli, &config)?;
            let mut graph = KnowledgeGraph::new();
            let events = GraphAssembler::new().assemble_into(&mut graph, &triplets);

            if *trace {
                for event in &events {
                    eprintln!("{event}");
                }
            }

            match format {
                GraphFormat::Text => print_graph(&graph),
                GraphFormat::Dot => print!("{}", graph.to_dot()),
                GraphFormat::Json => println!("{}", graph.to_json()?),
            }
        }
        Commands::Evaluate { path, gold } => {
            let triplets = extract(path, &cli, &config)?;
            let content = std::fs::read_to_string(gold)
                .with_context(|| format!("Failed to read gold file {}", gold.display()))?;
            let gold = parse_gold(&content)?;

            let metrics = evaluate(&triplets, &gold);
            info!(
                precision = metrics.precision(),
                recall = metrics.recall(),
                "evaluation complete"
            );
            println!("{metrics}");
        }
    }

    Ok(())
}

/// Install the stderr subscriber; `RUST_LOG` overrides the configured level
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .with_context(|| format!("Invalid log level `{}`", logging.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json_format {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

fn load(path: &Path, cli: &Cli, config: &AppConfig) -> anyhow::Result<Vec<AnnotatedSentence>> {
    let format = cli
        .input_format
        .unwrap_or_else(|| InputFormat::from_path(path));
    info!(path = %path.display(), %format, "loading document");

    load_document(path, format, &config.annotator)
        .with_context(|| format!("Failed to annotate {}", path.display()))
}

fn extract(path: &Path, cli: &Cli, config: &AppConfig) -> anyhow::Result<Vec<Triplet>> {
    let sentences = load(path, cli, config)?;
    let triplets = Extractor::new(&config.extraction).extract(&sentences)?;
    Ok(triplets)
}

fn print_graph(graph: &KnowledgeGraph) {
    println!("Graph Nodes: {}", graph.nodes().join(", "));
    println!("Graph Edges:");
    for (from, to, relation) in graph.edges() {
        println!("  {from} -[{relation}]-> {to}");
    }
    println!("{}", graph.stats());
}

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
