use std::sync::Arc;

use chromance_llm::{ChatBackend, Embedder};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// MongoDB database handle.
    pub db: chromance_db::DbPool,
    /// Server configuration (JWT settings are read by the auth extractor).
    pub config: Arc<ServerConfig>,
    /// Chat-completion backend used by the narrator.
    pub llm: Arc<dyn ChatBackend>,
    /// Embedding provider for the narrative memory.
    pub embedder: Arc<dyn Embedder>,
}
