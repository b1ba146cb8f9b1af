//! Handlers for the `/lore` resource.

use axum::extract::State;
use axum::Json;
use chromance_db::models::narrative::LoreSummary;
use chromance_db::repositories::NarrativeRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/lore/summary
pub async fn summary(State(state): State<AppState>) -> AppResult<Json<LoreSummary>> {
    Ok(Json(NarrativeRepo::lore_summary(&state.db).await?))
}
