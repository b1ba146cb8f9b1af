//! Route definitions for the `/lore` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::lore;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(lore::summary))
}
