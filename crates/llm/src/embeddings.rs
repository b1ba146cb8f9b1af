//! REST client for the embeddings endpoint.
//!
//! Wraps `POST {base}/embeddings` of any OpenAI-compatible provider. Inputs
//! are sent in batches of [`EmbeddingConfig::batch_size`] and the returned
//! vectors are put back in input order.

use std::time::Duration;

use crate::api::{classify_transport, ensure_success, LlmError};
use crate::config::EmbeddingConfig;
use crate::messages::{EmbeddingRequest, EmbeddingResponse};

/// HTTP client for one embeddings provider.
pub struct EmbeddingApi {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl EmbeddingApi {
    pub fn new(config: EmbeddingConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    /// Embed every input, one vector per input in the same order.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let key = self
            .config
            .api_key
            .as_deref()
            .ok_or(LlmError::NotConfigured)?;

        let mut vectors = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.config.batch_size.max(1)) {
            vectors.extend(self.send_batch(key, batch).await?);
        }
        Ok(vectors)
    }

    async fn send_batch(&self, key: &str, batch: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let body = EmbeddingRequest {
            model: &self.config.model,
            input: batch,
            dimensions: self.config.dimensions,
        };
        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = ensure_success(response).await?;
        let parsed: EmbeddingResponse = response.json().await.map_err(classify_transport)?;
        order_vectors(parsed, batch.len(), self.config.dimensions)
    }
}

/// Place each returned vector at its input index and check the sizes.
fn order_vectors(
    parsed: EmbeddingResponse,
    expected: usize,
    dimensions: usize,
) -> Result<Vec<Vec<f32>>, LlmError> {
    if parsed.data.len() != expected {
        return Err(LlmError::InvalidEmbedding(format!(
            "expected {expected} vectors, got {}",
            parsed.data.len()
        )));
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in parsed.data {
        if item.embedding.len() != dimensions {
            return Err(LlmError::InvalidEmbedding(format!(
                "expected {dimensions} dimensions, got {}",
                item.embedding.len()
            )));
        }
        let index = item.index;
        let slot = slots
            .get_mut(index)
            .filter(|slot| slot.is_none())
            .ok_or_else(|| LlmError::InvalidEmbedding(format!("unexpected index {index}")))?;
        *slot = Some(item.embedding);
    }
    slots
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| LlmError::InvalidEmbedding("missing vector".to_string()))
}
