//! Command line argument parsing for the Loupe CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Loupe - a two-stage semantic document retrieval engine
#[derive(Parser, Debug, Clone)]
#[command(name = "loupe")]
#[command(about = "Two-stage semantic document retrieval")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct LoupeArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl LoupeArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Output format for command results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build and persist the vector index from a document folder
    Build(BuildArgs),

    /// Search the persisted index
    Search(SearchArgs),
}

/// Arguments shared by every command that talks to the models
#[derive(Parser, Debug, Clone)]
pub struct ModelArgs {
    /// Embedding service endpoint URL
    #[arg(long, env = "LOUPE_EMBED_ENDPOINT")]
    pub embed_endpoint: String,

    /// Embedding model name
    #[arg(long, default_value = "text-embedding-3-small")]
    pub embed_model: String,

    /// Embedding dimension
    #[arg(long, default_value = "384")]
    pub embed_dimension: usize,
}

/// Arguments for building the index
#[derive(Parser, Debug, Clone)]
pub struct BuildArgs {
    /// Directory of .txt documents (filename = doc_id)
    #[arg(value_name = "DOCS_DIR")]
    pub docs_dir: PathBuf,

    /// Path for the vector index blob (sidecar is written next to it)
    #[arg(short, long, default_value = "vector.lvx")]
    pub index_path: PathBuf,

    /// Path for the embedding cache store
    #[arg(short, long, default_value = "embedding-cache.db")]
    pub cache_path: PathBuf,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Query text
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Directory of .txt documents (filename = doc_id)
    #[arg(value_name = "DOCS_DIR")]
    pub docs_dir: PathBuf,

    /// Path of the vector index blob
    #[arg(short, long, default_value = "vector.lvx")]
    pub index_path: PathBuf,

    /// Number of results to return
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Candidate pool multiplier for reranking
    #[arg(long, default_value = "5")]
    pub rerank_multiplier: usize,

    /// Disable synonym query expansion
    #[arg(long)]
    pub no_expansion: bool,

    /// Path to a JSON synonym dictionary
    #[arg(long)]
    pub synonyms: Option<PathBuf>,

    /// Rerank service endpoint URL
    #[arg(long, env = "LOUPE_RERANK_ENDPOINT")]
    pub rerank_endpoint: String,

    /// Rerank model name
    #[arg(long, default_value = "cross-encoder/ms-marco-MiniLM-L-6-v2")]
    pub rerank_model: String,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_default_is_normal() {
        let args = LoupeArgs::parse_from([
            "loupe",
            "build",
            "docs",
            "--embed-endpoint",
            "http://localhost:8080/embed",
        ]);
        assert_eq!(args.verbosity(), 1);
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        let args = LoupeArgs::parse_from([
            "loupe",
            "-q",
            "-vvv",
            "build",
            "docs",
            "--embed-endpoint",
            "http://localhost:8080/embed",
        ]);
        assert_eq!(args.verbosity(), 0);
    }

    #[test]
    fn test_search_defaults() {
        let args = LoupeArgs::parse_from([
            "loupe",
            "search",
            "machine learning",
            "docs",
            "--rerank-endpoint",
            "http://localhost:8080/rerank",
            "--embed-endpoint",
            "http://localhost:8080/embed",
        ]);
        match args.command {
            Command::Search(search) => {
                assert_eq!(search.top_k, 5);
                assert_eq!(search.rerank_multiplier, 5);
                assert!(!search.no_expansion);
            }
            _ => panic!("expected search command"),
        }
    }
}
