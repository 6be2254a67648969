//! Embedding record storage
//!
//! Stores vectors as little-endian half-precision BLOBs and exposes the
//! three operations the indexer and searcher need: `exists`, `store`,
//! `all`.

use super::Database;
use crate::error::Result;
use chrono::Utc;
use half::f16;
use rusqlite::params;

/// What to do when a key already holds a record with different content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwritePolicy {
    /// Replace the stored record in place (single live revision)
    #[default]
    Overwrite,
    /// Keep prior revisions; reads see only the latest
    AppendVersioned,
}

/// A stored chunk embedding, as loaded for a search session
#[derive(Debug, Clone)]
pub struct EmbeddingRecord {
    pub anchor: String,
    pub chunk: String,
    pub embedding: Vec<f32>,
    pub file: String,
    pub folder: String,
}

/// A chunk embedding about to be persisted
#[derive(Debug)]
pub struct NewEmbedding<'a> {
    pub anchor: &'a str,
    pub chunk: &'a str,
    pub embedding: &'a [f32],
    pub file: &'a str,
    pub folder: &'a str,
    pub model: &'a str,
}

impl Database {
    /// Return the stored chunk content for a key, if any.
    ///
    /// The caller compares the returned content against the candidate
    /// chunk to decide whether re-embedding is needed. Under versioned
    /// storage the latest revision's content is returned.
    pub fn exists(&self, anchor: &str, file: &str, model: &str) -> Result<Option<String>> {
        let result = self.conn.query_row(
            "SELECT chunk FROM embeddings
             WHERE anchor = ?1 AND file = ?2 AND model = ?3
             ORDER BY revision DESC LIMIT 1",
            params![anchor, file, model],
            |row| row.get(0),
        );

        match result {
            Ok(chunk) => Ok(Some(chunk)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a chunk embedding under the given overwrite policy
    pub fn store(&self, record: NewEmbedding<'_>, policy: OverwritePolicy) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let blob = embedding_to_bytes(record.embedding);

        let latest: i64 = self.conn.query_row(
            "SELECT COALESCE(MAX(revision), 0) FROM embeddings
             WHERE anchor = ?1 AND file = ?2 AND model = ?3",
            params![record.anchor, record.file, record.model],
            |row| row.get(0),
        )?;

        let revision = match policy {
            OverwritePolicy::Overwrite => latest.max(1),
            OverwritePolicy::AppendVersioned => latest + 1,
        };

        self.conn.execute(
            "INSERT INTO embeddings (anchor, chunk, embedding, file, folder, model, revision, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (anchor, file, model, revision) DO UPDATE SET
                 chunk = excluded.chunk,
                 embedding = excluded.embedding,
                 folder = excluded.folder,
                 created_at = excluded.created_at",
            params![
                record.anchor,
                record.chunk,
                blob,
                record.file,
                record.folder,
                record.model,
                revision,
                now
            ],
        )?;

        Ok(())
    }

    /// Load every record for a model, optionally scoped to a folder.
    ///
    /// Only the latest revision per key is returned. No ordering
    /// guarantee.
    pub fn all(&self, model: &str, folder: Option<&str>) -> Result<Vec<EmbeddingRecord>> {
        let sql = "SELECT e.anchor, e.chunk, e.embedding, e.file, e.folder
             FROM embeddings e
             JOIN (
                 SELECT anchor, file, MAX(revision) AS rev
                 FROM embeddings WHERE model = ?1
                 GROUP BY anchor, file
             ) latest
               ON latest.anchor = e.anchor
              AND latest.file = e.file
              AND latest.rev = e.revision
             WHERE e.model = ?1 AND (?2 IS NULL OR e.folder = ?2)";

        let mut stmt = self.conn.prepare(sql)?;
        let results = stmt
            .query_map(params![model, folder], |row| {
                let blob: Vec<u8> = row.get(2)?;
                Ok(EmbeddingRecord {
                    anchor: row.get(0)?,
                    chunk: row.get(1)?,
                    embedding: bytes_to_embedding(&blob),
                    file: row.get(3)?,
                    folder: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(results)
    }

    /// Count live records for a model
    pub fn count(&self, model: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM embeddings WHERE model = ?1",
            params![model],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

/// Pack an f32 embedding into little-endian f16 bytes
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding
        .iter()
        .flat_map(|v| f16::from_f32(*v).to_le_bytes())
        .collect()
}

/// Unpack little-endian f16 bytes into an f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| f16::from_le_bytes([pair[0], pair[1]]).to_f32())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    fn record<'a>(anchor: &'a str, chunk: &'a str, embedding: &'a [f32]) -> NewEmbedding<'a> {
        NewEmbedding {
            anchor,
            chunk,
            embedding,
            file: "/notes/a.md",
            folder: "/notes",
            model: "nomic-embed-text",
        }
    }

    #[test]
    fn test_pack_roundtrip() {
        let original = vec![1.0f32, -0.5, 0.25, 2.0];
        let restored = bytes_to_embedding(&embedding_to_bytes(&original));
        assert_eq!(original, restored);
    }

    #[test]
    fn test_pack_halves_size() {
        let bytes = embedding_to_bytes(&[0.0f32; 8]);
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn test_exists_absent() {
        let db = test_db();
        assert!(db
            .exists("intro", "/notes/a.md", "nomic-embed-text")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_store_then_exists() {
        let db = test_db();
        db.store(
            record("intro", "## Intro\nhello", &[1.0, 0.0]),
            OverwritePolicy::Overwrite,
        )
        .unwrap();

        let stored = db.exists("intro", "/notes/a.md", "nomic-embed-text").unwrap();
        assert_eq!(stored.as_deref(), Some("## Intro\nhello"));
    }

    #[test]
    fn test_overwrite_replaces_in_place() {
        let db = test_db();
        db.store(
            record("intro", "## Intro\nold", &[1.0, 0.0]),
            OverwritePolicy::Overwrite,
        )
        .unwrap();
        db.store(
            record("intro", "## Intro\nnew", &[0.0, 1.0]),
            OverwritePolicy::Overwrite,
        )
        .unwrap();

        let all = db.all("nomic-embed-text", None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].chunk, "## Intro\nnew");
        assert_eq!(all[0].embedding, vec![0.0, 1.0]);
    }

    #[test]
    fn test_versioned_keeps_history_reads_latest() {
        let db = test_db();
        db.store(
            record("intro", "## Intro\nv1", &[1.0, 0.0]),
            OverwritePolicy::AppendVersioned,
        )
        .unwrap();
        db.store(
            record("intro", "## Intro\nv2", &[0.0, 1.0]),
            OverwritePolicy::AppendVersioned,
        )
        .unwrap();

        let rows: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 2);

        let all = db.all("nomic-embed-text", None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].chunk, "## Intro\nv2");

        let latest = db.exists("intro", "/notes/a.md", "nomic-embed-text").unwrap();
        assert_eq!(latest.as_deref(), Some("## Intro\nv2"));
    }

    #[test]
    fn test_all_scoped_by_folder() {
        let db = test_db();
        db.store(
            NewEmbedding {
                anchor: "a",
                chunk: "## A",
                embedding: &[1.0],
                file: "/notes/a.md",
                folder: "/notes",
                model: "m",
            },
            OverwritePolicy::Overwrite,
        )
        .unwrap();
        db.store(
            NewEmbedding {
                anchor: "b",
                chunk: "## B",
                embedding: &[1.0],
                file: "/work/b.md",
                folder: "/work",
                model: "m",
            },
            OverwritePolicy::Overwrite,
        )
        .unwrap();

        assert_eq!(db.all("m", None).unwrap().len(), 2);
        let scoped = db.all("m", Some("/notes")).unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].anchor, "a");
    }

    #[test]
    fn test_all_filters_by_model() {
        let db = test_db();
        db.store(
            record("intro", "## Intro", &[1.0]),
            OverwritePolicy::Overwrite,
        )
        .unwrap();

        assert!(db.all("other-model", None).unwrap().is_empty());
    }

    #[test]
    fn test_commit_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.sqlite");

        {
            let db = Database::open(&path).unwrap();
            db.initialize().unwrap();
            db.begin().unwrap();
            db.store(
                record("intro", "## Intro\nhello", &[1.0, 0.0]),
                OverwritePolicy::Overwrite,
            )
            .unwrap();
            db.commit().unwrap();
        }

        let db = Database::open(&path).unwrap();
        db.initialize().unwrap();
        assert_eq!(db.all("nomic-embed-text", None).unwrap().len(), 1);
    }
}
