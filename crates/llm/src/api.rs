//! REST client for the chat-completions endpoint.
//!
//! Wraps `POST {base}/chat/completions` and `GET {base}/models` using
//! [`reqwest`]. Timeouts and 5xx responses are retried up to
//! [`LlmConfig::max_retries`] times; every other failure is returned at once.

use std::time::Duration;

use reqwest::StatusCode;

use crate::config::LlmConfig;
use crate::messages::{ChatCompletion, ChatMessage, CompletionRequest, CompletionResponse};

/// Base delay between retries, doubled on every attempt.
const RETRY_BACKOFF_MS: u64 = 250;

/// HTTP client for one chat-completions provider.
pub struct LlmApi {
    client: reqwest::Client,
    config: LlmConfig,
}

/// Errors from the chat-completions layer.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// No API key was configured.
    #[error("LLM API key is not configured")]
    NotConfigured,

    /// The provider answered 429.
    #[error("LLM rate limit exceeded")]
    RateLimited,

    /// The request did not finish within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("LLM request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("LLM API error ({status}): {body}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The provider answered without any text.
    #[error("LLM returned an empty completion")]
    EmptyCompletion,

    /// The provider's vectors do not line up with the inputs sent.
    #[error("invalid embedding response: {0}")]
    InvalidEmbedding(String),
}

impl LlmError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Timeout => true,
            LlmError::Upstream { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl LlmApi {
    /// Create a client with the configured request timeout.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: LlmConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Request one completion for `messages`.
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletion, LlmError> {
        let key = self.api_key()?;
        let body = CompletionRequest {
            model: &self.config.model,
            messages,
            max_tokens: self.config.effective_max_tokens(),
            temperature: self.config.temperature,
        };

        let mut attempt = 0;
        loop {
            match self.send_completion(key, &body).await {
                Ok(completion) => return Ok(completion),
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(error = %err, attempt, "Retrying LLM completion");
                    let delay = RETRY_BACKOFF_MS << (attempt - 1).min(6);
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Check that the provider accepts our key by listing its models.
    pub async fn ping(&self) -> Result<(), LlmError> {
        let key = self.api_key()?;
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .bearer_auth(key)
            .send()
            .await
            .map_err(classify_transport)?;
        ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    fn api_key(&self) -> Result<&str, LlmError> {
        self.config.api_key.as_deref().ok_or(LlmError::NotConfigured)
    }

    async fn send_completion(
        &self,
        key: &str,
        body: &CompletionRequest<'_>,
    ) -> Result<ChatCompletion, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(key)
            .json(body)
            .send()
            .await
            .map_err(classify_transport)?;

        let response = ensure_success(response).await?;
        let parsed: CompletionResponse = response.json().await.map_err(classify_transport)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or(LlmError::EmptyCompletion)?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "LLM completion received"
            );
        }

        Ok(ChatCompletion {
            content,
            model: parsed.model.unwrap_or_else(|| self.config.model.clone()),
            usage: parsed.usage,
        })
    }
}

/// Ensure the response has a success status code. Returns the response
/// unchanged on success; 429 maps to [`LlmError::RateLimited`] and any other
/// failure to [`LlmError::Upstream`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(LlmError::Upstream {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub(crate) fn classify_transport(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else {
        LlmError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeouts_and_server_errors_are_retried() {
        assert!(LlmError::Timeout.is_retryable());
        assert!(LlmError::Upstream { status: 503, body: String::new() }.is_retryable());
        assert!(!LlmError::Upstream { status: 400, body: String::new() }.is_retryable());
        assert!(!LlmError::RateLimited.is_retryable());
        assert!(!LlmError::NotConfigured.is_retryable());
    }

    #[tokio::test]
    async fn missing_key_fails_without_a_request() {
        let api = LlmApi::new(LlmConfig::new("http://127.0.0.1:9", None)).unwrap();
        let err = api.complete(&[ChatMessage::user("oi")]).await.unwrap_err();
        assert!(matches!(err, LlmError::NotConfigured));
        assert!(matches!(api.ping().await, Err(LlmError::NotConfigured)));
    }
}
