use chromance_llm::{EmbeddingConfig, LlmConfig};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// Database name inside the MongoDB deployment.
    pub mongo_db: String,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Chat-completion provider settings.
    pub llm: LlmConfig,
    /// Embedding provider settings for the narrative memory.
    pub embedding: EmbeddingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                       |
    /// |------------------------|-----------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                     |
    /// | `PORT`                 | `8000`                                        |
    /// | `CORS_ORIGINS`         | `http://localhost:4200,http://127.0.0.1:4200` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                          |
    /// | `MONGO_URI`            | `mongodb://localhost:27017`                   |
    /// | `MONGO_DB`             | `rpgdb`                                       |
    ///
    /// See [`JwtConfig::from_env`], [`LlmConfig::from_env`] and
    /// [`EmbeddingConfig::from_env`] for the rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:4200,http://127.0.0.1:4200".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let mongo_uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
        let mongo_db = std::env::var("MONGO_DB").unwrap_or_else(|_| "rpgdb".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            mongo_uri,
            mongo_db,
            jwt: JwtConfig::from_env(),
            llm: LlmConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
        }
    }
}
