//! Capability traits for external models

use crate::error::{RagmarkError, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Text for the reachability probe; embedding it must succeed before an
/// operation that depends on the model is allowed to start.
const PROBE_TEXT: &str = "testing if model is up";

/// Embedding generation capability
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Map text to a fixed-length vector
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Fail-fast reachability check: embed a trivial string
    async fn probe(&self) -> Result<()> {
        self.embed(PROBE_TEXT).await.map(|_| ()).map_err(|e| {
            RagmarkError::ModelUnreachable {
                model: self.model_name().to_string(),
                reason: e.to_string(),
            }
        })
    }
}

/// Streamed answer generation capability
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate a response for the prompt, pushing incremental tokens
    /// into `tokens` as they arrive.
    ///
    /// A closed receiver cancels generation; implementations must stop
    /// consuming the underlying stream instead of draining it.
    async fn generate(&self, prompt: &str, tokens: mpsc::Sender<String>) -> Result<()>;

    /// Get model name
    fn model_name(&self) -> &str;

    /// Fail-fast reachability check
    async fn probe(&self) -> Result<()>;
}
