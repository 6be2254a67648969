//! HTTP client for a local ollama service
//!
//! Implements both capability traits against ollama's native API:
//! `/api/embeddings` for vectors and `/api/chat` with `stream: true` for
//! newline-delimited JSON token streaming.

use super::{Encoder, Generator};
use crate::error::{RagmarkError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;

/// Client bound to one ollama model
pub struct OllamaClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client for `model` served at `base_url`
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(RagmarkError::Http)?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl Encoder for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct EmbedRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct EmbedResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagmarkError::Encode(format!(
                "embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let embed_response: EmbedResponse = response.json().await?;
        if embed_response.embedding.is_empty() {
            return Err(RagmarkError::Encode("empty embedding returned".to_string()));
        }

        Ok(embed_response.embedding)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Generator for OllamaClient {
    async fn generate(&self, prompt: &str, tokens: mpsc::Sender<String>) -> Result<()> {
        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct StreamMessage {
            content: String,
        }

        #[derive(Deserialize)]
        struct StreamChunk {
            #[serde(default)]
            message: Option<StreamMessage>,
            #[serde(default)]
            done: bool,
        }

        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                stream: true,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(RagmarkError::Generate(format!(
                "chat service error (HTTP {}): {}",
                status, body
            )));
        }

        // The body is newline-delimited JSON; chunks are forwarded as they
        // arrive. A closed receiver stops consumption mid-stream.
        let mut stream = response.bytes_stream();
        let mut buffer = String::new();

        while let Some(bytes) = stream.next().await {
            let bytes = bytes?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            while let Some(newline) = buffer.find('\n') {
                let line: String = buffer.drain(..=newline).collect();
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let chunk: StreamChunk = serde_json::from_str(line).map_err(|e| {
                    RagmarkError::Generate(format!("malformed stream chunk: {}", e))
                })?;

                if let Some(message) = chunk.message {
                    if !message.content.is_empty()
                        && tokens.send(message.content).await.is_err()
                    {
                        tracing::debug!("token receiver dropped, cancelling generation");
                        return Ok(());
                    }
                }

                if chunk.done {
                    return Ok(());
                }
            }
        }

        Ok(())
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn probe(&self) -> Result<()> {
        Encoder::probe(self).await
    }
}
