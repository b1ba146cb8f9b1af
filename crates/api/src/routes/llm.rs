//! Route definitions for the `/llm` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::llm;
use crate::state::AppState;

/// Routes mounted at `/llm`.
///
/// ```text
/// POST /chat                  -> chat (requires auth)
/// POST /character-suggestion  -> character_suggestion (requires auth)
/// GET  /health                -> health
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(llm::chat))
        .route("/character-suggestion", post(llm::character_suggestion))
        .route("/health", get(llm::health))
}
