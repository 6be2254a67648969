//! Similarity search and answer synthesis
//!
//! A search session loads the full embedding snapshot for one model and
//! ranks it against each query by exact cosine similarity. The top chunks
//! can be streamed through a Generator for a synthesized answer.

use crate::db::{Database, EmbeddingRecord};
use crate::error::Result;
use crate::llm::{Encoder, Generator};
use tokio::sync::mpsc;

/// Search options
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Minimum cosine similarity for a chunk to be ranked
    pub threshold: f32,
    /// Maximum number of ranked chunks per query
    pub limit: usize,
    /// Restrict the snapshot to records indexed under this folder
    pub folder: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.55,
            limit: 5,
            folder: None,
        }
    }
}

/// A chunk ranked against a query
#[derive(Debug, Clone)]
pub struct RankedChunk {
    pub anchor: String,
    pub chunk: String,
    pub file: String,
    pub similarity: f32,
}

/// One search session over an immutable snapshot.
///
/// Mutations committed after `open` are not visible until a new session
/// loads a fresh snapshot.
pub struct SearchSession<'a> {
    encoder: &'a dyn Encoder,
    snapshot: Vec<EmbeddingRecord>,
    options: SearchOptions,
}

impl<'a> SearchSession<'a> {
    /// Probe the encoder and load the snapshot.
    ///
    /// An unreachable encoder aborts the session before any query is
    /// accepted.
    pub async fn open(
        db: &Database,
        encoder: &'a dyn Encoder,
        options: SearchOptions,
    ) -> Result<SearchSession<'a>> {
        encoder.probe().await?;

        let snapshot = db.all(encoder.model_name(), options.folder.as_deref())?;
        tracing::info!(
            records = snapshot.len(),
            model = encoder.model_name(),
            "search session loaded"
        );

        Ok(Self {
            encoder,
            snapshot,
            options,
        })
    }

    /// Number of records in the loaded snapshot
    pub fn snapshot_len(&self) -> usize {
        self.snapshot.len()
    }

    /// Rank the snapshot against a query.
    ///
    /// Exact linear scan; results below the threshold are dropped, the
    /// rest are sorted descending (stable, so ties keep snapshot order)
    /// and truncated to the limit. An empty result is a valid outcome.
    pub async fn query(&self, text: &str) -> Result<Vec<RankedChunk>> {
        let query_embedding = self.encoder.embed(text).await?;

        let mut ranked: Vec<RankedChunk> = self
            .snapshot
            .iter()
            .map(|record| RankedChunk {
                anchor: record.anchor.clone(),
                chunk: record.chunk.clone(),
                file: record.file.clone(),
                similarity: cosine_similarity(&query_embedding, &record.embedding),
            })
            .filter(|r| r.similarity >= self.options.threshold)
            .collect();

        ranked.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(self.options.limit);

        Ok(ranked)
    }
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

/// Build the answer prompt from the retrieved chunks and the question
pub fn build_prompt(question: &str, chunks: &[RankedChunk]) -> String {
    let context = chunks
        .iter()
        .map(|c| c.chunk.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Use the following context to answer the question at the end.\n\
         If you don't know the answer, say that you don't know, don't make up an answer.\n\
         Try to be concise and break the answer into multiple steps.\n\
         {context}\n\
         Question: {question}\n\
         Helpful Answer:"
    )
}

/// Stream a synthesized answer for the ranked chunks.
///
/// Tokens arrive on `tokens` as the Generator produces them; dropping the
/// receiver cancels generation early. Callers must not invoke this with an
/// empty ranking.
pub async fn synthesize(
    generator: &dyn Generator,
    question: &str,
    chunks: &[RankedChunk],
    tokens: mpsc::Sender<String>,
) -> Result<()> {
    let prompt = build_prompt(question, chunks);
    generator.generate(&prompt, tokens).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{NewEmbedding, OverwritePolicy};
    use crate::llm::ollama::mock::MockEncoder;
    use std::collections::HashMap;

    fn store(db: &Database, anchor: &str, chunk: &str, embedding: &[f32]) {
        db.store(
            NewEmbedding {
                anchor,
                chunk,
                embedding,
                file: "/notes/doc.md",
                folder: "/notes",
                model: "mock-encoder",
            },
            OverwritePolicy::Overwrite,
        )
        .unwrap();
    }

    fn encoder_with(query: &str, embedding: Vec<f32>) -> MockEncoder {
        let mut vectors = HashMap::new();
        vectors.insert(query.to_string(), embedding);
        MockEncoder {
            vectors,
            fallback: vec![1.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_cosine_identical_is_one() {
        let a = vec![0.3, -0.7, 0.2];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_symmetric_and_bounded() {
        let a = vec![1.0, 2.0, -0.5];
        let b = vec![-0.3, 0.9, 4.0];
        let ab = cosine_similarity(&a, &b);
        let ba = cosine_similarity(&b, &a);
        assert!((ab - ba).abs() < 1e-6);
        assert!((-1.0..=1.0).contains(&ab));
    }

    #[test]
    fn test_cosine_orthogonal_is_zero() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[tokio::test]
    async fn test_query_ranks_identical_embedding_first() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        store(&db, "exact", "## Exact\nmatch", &[0.0, 1.0, 0.0]);
        store(&db, "other", "## Other\nstuff", &[1.0, 0.1, 0.0]);

        let encoder = encoder_with("find exact", vec![0.0, 1.0, 0.0]);
        let session = SearchSession::open(&db, &encoder, SearchOptions::default())
            .await
            .unwrap();

        let ranked = session.query("find exact").await.unwrap();
        assert_eq!(ranked[0].anchor, "exact");
        assert!((ranked[0].similarity - 1.0).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_query_filters_below_threshold() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        store(&db, "near", "## Near", &[0.0, 1.0, 0.0]);
        store(&db, "far", "## Far", &[1.0, 0.0, 0.0]);

        let encoder = encoder_with("q", vec![0.0, 1.0, 0.0]);
        let session = SearchSession::open(&db, &encoder, SearchOptions::default())
            .await
            .unwrap();

        let ranked = session.query("q").await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].anchor, "near");
    }

    #[tokio::test]
    async fn test_query_empty_result_is_ok() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        store(&db, "far", "## Far", &[1.0, 0.0, 0.0]);

        let encoder = encoder_with("q", vec![0.0, 0.0, 1.0]);
        let session = SearchSession::open(&db, &encoder, SearchOptions::default())
            .await
            .unwrap();

        let ranked = session.query("q").await.unwrap();
        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn test_query_respects_limit_and_order() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        store(&db, "best", "## Best", &[0.0, 1.0, 0.0]);
        store(&db, "good", "## Good", &[0.0, 1.0, 0.3]);
        store(&db, "okay", "## Okay", &[0.0, 1.0, 0.8]);

        let encoder = encoder_with("q", vec![0.0, 1.0, 0.0]);
        let options = SearchOptions {
            limit: 2,
            ..Default::default()
        };
        let session = SearchSession::open(&db, &encoder, options).await.unwrap();

        let ranked = session.query("q").await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].anchor, "best");
        assert_eq!(ranked[1].anchor, "good");
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[tokio::test]
    async fn test_repeated_queries_are_deterministic() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        // two records with the same embedding tie on similarity
        store(&db, "tie-a", "## Tie A", &[0.0, 1.0, 0.0]);
        store(&db, "tie-b", "## Tie B", &[0.0, 1.0, 0.0]);

        let encoder = encoder_with("q", vec![0.0, 1.0, 0.0]);
        let session = SearchSession::open(&db, &encoder, SearchOptions::default())
            .await
            .unwrap();

        let first = session.query("q").await.unwrap();
        let second = session.query("q").await.unwrap();
        let order = |r: &[RankedChunk]| r.iter().map(|c| c.anchor.clone()).collect::<Vec<_>>();
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn test_build_prompt_embeds_context_and_question() {
        let chunks = vec![RankedChunk {
            anchor: "a".to_string(),
            chunk: "## A\nchunk text".to_string(),
            file: "/notes/doc.md".to_string(),
            similarity: 0.9,
        }];
        let prompt = build_prompt("what is a?", &chunks);
        assert!(prompt.contains("## A\nchunk text"));
        assert!(prompt.contains("Question: what is a?"));
        assert!(prompt.ends_with("Helpful Answer:"));
    }
}
