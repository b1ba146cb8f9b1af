//! Chat-completion and embedding clients for the narrator.
//!
//! Talks to any OpenAI-compatible `/chat/completions` endpoint (Groq by
//! default) and `/embeddings` endpoint (OpenAI by default). The API crate
//! depends on the [`ChatBackend`] and [`Embedder`] traits rather than on the
//! concrete clients, so tests can swap in scripted backends.

pub mod api;
pub mod config;
pub mod embeddings;
pub mod messages;

use async_trait::async_trait;

pub use api::{LlmApi, LlmError};
pub use config::{EmbeddingConfig, LlmConfig};
pub use embeddings::EmbeddingApi;
pub use messages::{ChatCompletion, ChatMessage, Role, Usage};

/// A hosted language model that answers chat conversations.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Model identifier reported by the health endpoint.
    fn model(&self) -> &str;

    /// Run one completion over `messages` (system prompt first).
    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError>;

    /// Cheap reachability check.
    async fn ping(&self) -> Result<(), LlmError>;
}

#[async_trait]
impl ChatBackend for LlmApi {
    fn model(&self) -> &str {
        &self.config().model
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError> {
        LlmApi::complete(self, messages).await
    }

    async fn ping(&self) -> Result<(), LlmError> {
        LlmApi::ping(self).await
    }
}

/// Turns text into fixed-size vectors for the narrative memory.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every returned vector.
    fn dimensions(&self) -> usize;

    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| LlmError::InvalidEmbedding("missing vector".to_string()))
    }
}

#[async_trait]
impl Embedder for EmbeddingApi {
    fn dimensions(&self) -> usize {
        self.config().dimensions
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        EmbeddingApi::embed(self, inputs).await
    }
}
