//! Route definitions for the `/characters` resource.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::character;
use crate::state::AppState;

/// Routes mounted at `/characters`. All require auth.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(character::list).post(character::create))
        .route("/selected", get(character::get_selected))
        .route(
            "/{id}",
            get(character::get_by_id)
                .put(character::update)
                .delete(character::delete),
        )
        .route("/{id}/select", post(character::select))
        .route("/{id}/inventory", get(character::inventory))
        .route(
            "/{id}/inventory/{item_id}",
            delete(character::remove_inventory_item),
        )
}
