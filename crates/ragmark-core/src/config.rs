//! Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the ollama service
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Model used to embed chunks and queries
    #[serde(default = "default_encoder_model")]
    pub encoder_model: String,

    /// Model used to synthesize answers from retrieved chunks
    #[serde(default = "default_searcher_model")]
    pub searcher_model: String,

    /// Minimum cosine similarity for a chunk to be ranked
    #[serde(default = "default_threshold")]
    pub similarity_threshold: f32,

    /// Number of top chunks fed into answer synthesis
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Index database path override
    #[serde(default)]
    pub db_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: default_ollama_url(),
            encoder_model: default_encoder_model(),
            searcher_model: default_searcher_model(),
            similarity_threshold: default_threshold(),
            top_k: default_top_k(),
            timeout_secs: default_timeout(),
            db_path: std::env::var("RAGMARK_DB").ok().map(PathBuf::from),
        }
    }
}

fn default_ollama_url() -> String {
    std::env::var("RAGMARK_OLLAMA_URL").unwrap_or_else(|_| "http://localhost:11434".to_string())
}

fn default_encoder_model() -> String {
    std::env::var("RAGMARK_ENCODER_MODEL").unwrap_or_else(|_| "nomic-embed-text".to_string())
}

fn default_searcher_model() -> String {
    std::env::var("RAGMARK_SEARCHER_MODEL").unwrap_or_else(|_| "llama3.1".to_string())
}

fn default_threshold() -> f32 {
    0.55
}

fn default_top_k() -> usize {
    5
}

fn default_timeout() -> u64 {
    30
}

impl Config {
    /// Load config from default path, falling back to defaults
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Config = serde_yaml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to default path
    pub fn save(&self) -> Result<()> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }
}
