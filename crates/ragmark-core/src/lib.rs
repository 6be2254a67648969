//! Ragmark Core Library
//!
//! Core functionality for the ragmark local RAG engine.
//!
//! # Features
//! - Markdown chunking on level-2 headings with stable anchor slugs
//! - Incremental embedding index in SQLite (half-precision BLOBs)
//! - Exact brute-force cosine-similarity search
//! - Streamed answer synthesis via an ollama chat model

pub mod chunker;
pub mod config;
pub mod db;
pub mod error;
pub mod index;
pub mod llm;
pub mod search;

pub use chunker::{anchor, chunk};
pub use config::Config;
pub use db::{Database, EmbeddingRecord, NewEmbedding, OverwritePolicy};
pub use error::{Error, RagmarkError, Result};
pub use index::{index_folder, ChunkFailure, FileReport, IndexOptions, IndexReport};
pub use llm::{Encoder, Generator, OllamaClient};
pub use search::{
    build_prompt, cosine_similarity, synthesize, RankedChunk, SearchOptions, SearchSession,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "ragmark";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "ragmark";
