//! Database layer for ragmark
//!
//! SQLite-backed persistence for chunk embeddings, keyed by
//! `(anchor, file, model)`.

mod embeddings;

pub use embeddings::{
    bytes_to_embedding, embedding_to_bytes, EmbeddingRecord, NewEmbedding, OverwritePolicy,
};

use crate::error::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Main database handle
pub struct Database {
    pub(crate) conn: Connection,
}

const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS embeddings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    anchor TEXT NOT NULL,
    chunk TEXT NOT NULL,
    embedding BLOB NOT NULL,
    file TEXT NOT NULL,
    folder TEXT NOT NULL,
    model TEXT NOT NULL,
    revision INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS idx_embeddings_key ON embeddings (anchor, file, model, revision);
CREATE INDEX IF NOT EXISTS idx_embeddings_anchor ON embeddings (file, anchor);
CREATE INDEX IF NOT EXISTS idx_embeddings_model ON embeddings (model);
CREATE INDEX IF NOT EXISTS idx_embeddings_folder ON embeddings (folder);
"#;

impl Database {
    /// Open database at path, creating parent directories if necessary
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Initialize schema and pragmas
    pub fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA cache_size = -16384;
             PRAGMA busy_timeout = 5000;",
        )?;

        self.conn.execute_batch(CREATE_TABLES)?;

        Ok(())
    }

    /// Start a write transaction; writes are not durable until `commit`
    pub fn begin(&self) -> Result<()> {
        self.conn.execute("BEGIN IMMEDIATE", [])?;
        Ok(())
    }

    /// Flush buffered writes to durable storage
    pub fn commit(&self) -> Result<()> {
        self.conn.execute("COMMIT", [])?;
        Ok(())
    }

    /// Roll back the open write transaction
    pub fn rollback(&self) -> Result<()> {
        self.conn.execute("ROLLBACK", [])?;
        Ok(())
    }

    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }
}
