use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chromance_core::error::CoreError;
use chromance_llm::LlmError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chromance_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from the MongoDB driver.
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    /// A failure of the chat-completion provider.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A request body that is not valid JSON for the endpoint.
    #[error(transparent)]
    Json(#[from] JsonRejection),

    /// Query parameters that do not parse.
    #[error(transparent)]
    Query(#[from] QueryRejection),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_mongo_error(err),

            // --- LLM errors ---
            AppError::Llm(err) => classify_llm_error(err),

            // --- Extractor rejections ---
            AppError::Json(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_JSON", rejection.body_text())
            }
            AppError::Query(rejection) => {
                (StatusCode::BAD_REQUEST, "INVALID_QUERY", rejection.body_text())
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Classify a MongoDB error into an HTTP status, error code, and message.
///
/// - Unique index violations (code 11000) map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_mongo_error(err: &mongodb::error::Error) -> (StatusCode, &'static str, String) {
    if chromance_db::is_duplicate_key(err) {
        return (
            StatusCode::CONFLICT,
            "CONFLICT",
            "Duplicate value violates a unique index".to_string(),
        );
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

/// Classify a chat-completion failure.
///
/// - Missing API key maps to 503.
/// - Provider rate limiting maps to 429.
/// - Every other provider failure maps to 502.
fn classify_llm_error(err: &LlmError) -> (StatusCode, &'static str, String) {
    match err {
        LlmError::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "LLM_NOT_CONFIGURED",
            err.to_string(),
        ),
        LlmError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED", err.to_string()),
        other => {
            tracing::error!(error = %other, "LLM provider error");
            (
                StatusCode::BAD_GATEWAY,
                "LLM_ERROR",
                "The language model is unavailable".to_string(),
            )
        }
    }
}
