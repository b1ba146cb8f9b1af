use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use chromance_db::repositories::NarrativeRepo;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Whether the service can serve requests.
    pub ok: bool,
    /// Whether MongoDB answered a ping.
    pub db: bool,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
}

#[derive(Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct ReadinessDeps {
    pub mongo: bool,
    /// Whether the narrative memory collections can be read.
    pub memory: bool,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub deps: ReadinessDeps,
}

/// GET /health -- returns service and database health. 503 when degraded.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db = chromance_db::health_check(&state.db).await.is_ok();
    let status = if db {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            ok: db,
            db,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// GET /liveness -- the process is up.
async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// GET /readiness -- every dependency answers. 503 otherwise.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let mongo = chromance_db::health_check(&state.db).await.is_ok();
    let memory = mongo && NarrativeRepo::counts(&state.db).await.is_ok();
    let ready = mongo && memory;

    let deps = ReadinessDeps { mongo, memory };
    if ready {
        (StatusCode::OK, Json(ReadinessResponse { status: "ready", deps }))
    } else {
        tracing::warn!(mongo, memory, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                deps,
            }),
        )
    }
}

/// Mount health check routes (root level, NOT under `/api`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/liveness", get(liveness))
        .route("/readiness", get(readiness))
}
