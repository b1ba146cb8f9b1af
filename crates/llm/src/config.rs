/// Hard ceiling on `max_tokens` sent with any request.
pub const MAX_TOKENS_CAP: u32 = 1000;

const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
const DEFAULT_MAX_TOKENS: u32 = 500;
const DEFAULT_TEMPERATURE: f32 = 0.8;
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_MAX_RETRIES: u32 = 1;

/// Chat-completion client configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Bearer key. Without one every call fails with `NotConfigured`.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Extra attempts after a timeout or 5xx response.
    pub max_retries: u32,
}

impl LlmConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default                            |
    /// |--------------------|------------------------------------|
    /// | `GROQ_API_KEY`     | unset                              |
    /// | `LLM_BASE_URL`     | `https://api.groq.com/openai/v1`   |
    /// | `LLM_MODEL`        | `llama-3.1-70b-versatile`          |
    /// | `LLM_MAX_TOKENS`   | `500`                              |
    /// | `LLM_TEMPERATURE`  | `0.8`                              |
    /// | `LLM_TIMEOUT_SECS` | `20`                               |
    /// | `LLM_MAX_RETRIES`  | `1`                                |
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable does not parse.
    pub fn from_env() -> Self {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        let max_tokens: u32 = std::env::var("LLM_MAX_TOKENS")
            .unwrap_or_else(|_| DEFAULT_MAX_TOKENS.to_string())
            .parse()
            .expect("LLM_MAX_TOKENS must be a valid u32");

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .unwrap_or_else(|_| DEFAULT_TEMPERATURE.to_string())
            .parse()
            .expect("LLM_TEMPERATURE must be a valid f32");

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        let max_retries: u32 = std::env::var("LLM_MAX_RETRIES")
            .unwrap_or_else(|_| DEFAULT_MAX_RETRIES.to_string())
            .parse()
            .expect("LLM_MAX_RETRIES must be a valid u32");

        Self {
            api_key,
            base_url,
            model,
            max_tokens,
            temperature,
            timeout_secs,
            max_retries,
        }
    }

    /// Configuration pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// `max_tokens` clamped to [`MAX_TOKENS_CAP`].
    pub fn effective_max_tokens(&self) -> u32 {
        self.max_tokens.min(MAX_TOKENS_CAP)
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// Embeddings
// ---------------------------------------------------------------------------

const DEFAULT_EMBEDDING_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
const DEFAULT_EMBEDDING_BATCH: usize = 64;

/// Embedding client configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Bearer key. Without one every call fails with `NotConfigured`.
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API, without a trailing slash.
    pub base_url: String,
    pub model: String,
    /// Vector size requested from the provider and declared on the search index.
    pub dimensions: usize,
    /// Most inputs sent in one request.
    pub batch_size: usize,
    pub timeout_secs: u64,
}

impl EmbeddingConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                     |
    /// |------------------------|-----------------------------|
    /// | `EMBEDDING_API_KEY`    | unset                       |
    /// | `EMBEDDING_BASE_URL`   | `https://api.openai.com/v1` |
    /// | `EMBEDDING_MODEL`      | `text-embedding-3-small`    |
    /// | `EMBEDDING_DIMENSIONS` | `1536`                      |
    /// | `EMBEDDING_BATCH_SIZE` | `64`                        |
    ///
    /// The timeout follows `LLM_TIMEOUT_SECS`.
    ///
    /// # Panics
    ///
    /// Panics if a numeric variable does not parse or is zero.
    pub fn from_env() -> Self {
        let api_key = std::env::var("EMBEDDING_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = std::env::var("EMBEDDING_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let model =
            std::env::var("EMBEDDING_MODEL").unwrap_or_else(|_| DEFAULT_EMBEDDING_MODEL.into());

        let dimensions: usize = std::env::var("EMBEDDING_DIMENSIONS")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_DIMENSIONS.to_string())
            .parse()
            .expect("EMBEDDING_DIMENSIONS must be a valid usize");
        assert!(dimensions > 0, "EMBEDDING_DIMENSIONS must be positive");

        let batch_size: usize = std::env::var("EMBEDDING_BATCH_SIZE")
            .unwrap_or_else(|_| DEFAULT_EMBEDDING_BATCH.to_string())
            .parse()
            .expect("EMBEDDING_BATCH_SIZE must be a valid usize");
        assert!(batch_size > 0, "EMBEDDING_BATCH_SIZE must be positive");

        let timeout_secs: u64 = std::env::var("LLM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse()
            .expect("LLM_TIMEOUT_SECS must be a valid u64");

        Self {
            api_key,
            base_url,
            model,
            dimensions,
            batch_size,
            timeout_secs,
        }
    }

    /// Configuration pointing at `base_url` with every other field defaulted.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
            batch_size: DEFAULT_EMBEDDING_BATCH,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}
