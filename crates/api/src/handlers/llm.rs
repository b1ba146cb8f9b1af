//! Handlers for the `/llm` resource.

use axum::extract::State;
use axum::Json;
use chromance_core::prompt::build_character_suggestion_prompt;
use chromance_llm::{ChatMessage, Usage};
use serde::{Deserialize, Serialize};

use crate::engine::narrator::{self, ChatRequest, ChatResponse};
use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /llm/character-suggestion`.
#[derive(Debug, Deserialize)]
pub struct SuggestionRequest {
    #[serde(default)]
    pub partial_data: serde_json::Value,
}

/// Response body for `POST /llm/character-suggestion`, in the shape of a
/// plain chat reply.
#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub success: bool,
    pub response: Option<String>,
    pub error: Option<String>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Serialize)]
pub struct LlmHealthResponse {
    /// `healthy` or `unhealthy`.
    pub status: &'static str,
    pub model: String,
    pub available: bool,
}

/// POST /api/llm/chat
///
/// Provider failures come back as `200` with `success: false`.
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    let response = narrator::run_turn(&state, &auth.user_id, input).await?;
    Ok(Json(response))
}

/// POST /api/llm/character-suggestion
///
/// Like chat, provider failures come back as `200` with `success: false`.
pub async fn character_suggestion(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(input): AppJson<SuggestionRequest>,
) -> Json<SuggestionResponse> {
    let prompt = build_character_suggestion_prompt(&input.partial_data);
    let response = match state.llm.complete(&[ChatMessage::user(prompt)]).await {
        Ok(completion) => SuggestionResponse {
            success: true,
            response: Some(completion.content),
            error: None,
            usage: completion.usage,
        },
        Err(err) => {
            tracing::warn!(error = %err, user_id = %auth.user_id, "Character suggestion failed");
            SuggestionResponse {
                success: false,
                response: None,
                error: Some(err.to_string()),
                usage: None,
            }
        }
    };
    Json(response)
}

/// GET /api/llm/health
pub async fn health(State(state): State<AppState>) -> Json<LlmHealthResponse> {
    let available = match state.llm.ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(error = %err, "LLM health check failed");
            false
        }
    };
    Json(LlmHealthResponse {
        status: if available { "healthy" } else { "unhealthy" },
        model: state.llm.model().to_string(),
        available,
    })
}
