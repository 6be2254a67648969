//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ragmark")]
#[command(author, version, about = "Local RAG search for your markdown notes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the index database
    #[arg(short = 'd', long, global = true, env = "RAGMARK_DB")]
    pub db_path: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Index a folder of documents
    Index(IndexArgs),

    /// Interactive similarity search with synthesized answers
    Search(SearchArgs),

    /// Delete indexed records
    Delete,
}

#[derive(Args)]
pub struct IndexArgs {
    /// Folder to index
    pub folder: PathBuf,

    /// Model to use for the encoder
    #[arg(short, long)]
    pub model: Option<String>,

    /// Extension to index (eg "md")
    #[arg(short, long, default_value = "md")]
    pub extension: String,

    /// Keep prior revisions of changed chunks instead of overwriting
    #[arg(long)]
    pub versioned: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Restrict results to files indexed under this folder
    #[arg(short, long)]
    pub folder: Option<PathBuf>,

    /// Model used to embed queries (must match the indexed model)
    #[arg(long)]
    pub model_encoder: Option<String>,

    /// Model used to synthesize answers
    #[arg(long)]
    pub model_searcher: Option<String>,

    /// Minimum similarity for a chunk to be ranked
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Number of top chunks fed into answer synthesis
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print ranked chunks only, skip answer synthesis
    #[arg(long)]
    pub no_answer: bool,
}
