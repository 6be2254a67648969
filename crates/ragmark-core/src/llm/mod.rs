//! External model adapters
//!
//! The Encoder and Generator capability traits plus the ollama HTTP
//! implementation of both.

pub mod ollama;
mod traits;

pub use ollama::OllamaClient;
pub use traits::{Encoder, Generator};
