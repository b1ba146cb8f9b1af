//! Route definitions for the `/campaigns` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaign;
use crate::state::AppState;

/// Routes mounted at `/campaigns`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaign::list))
        .route("/active", get(campaign::get_active))
        .route("/seed", post(campaign::seed))
        .route("/{campaign_id}", get(campaign::get_by_slug))
        .route("/{campaign_id}/start", post(campaign::start))
        .route("/{campaign_id}/cancel", post(campaign::cancel))
        .route("/{campaign_id}/battles", post(campaign::record_battle))
        .route("/{campaign_id}/history", get(campaign::history))
        .route(
            "/{campaign_id}/chapters/{chapter}/complete",
            post(campaign::complete_chapter),
        )
        .route(
            "/{campaign_id}/chapters/{chapter}/summary",
            get(campaign::chapter_summary),
        )
}
