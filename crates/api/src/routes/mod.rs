pub mod auth;
pub mod campaign;
pub mod character;
pub mod health;
pub mod llm;
pub mod lore;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                  register (public)
/// /auth/login                                   login (public)
/// /auth/refresh                                 refresh (public)
/// /auth/me                                      current user
///
/// /characters                                   list, create
/// /characters/selected                          selected character
/// /characters/{id}                              get, update, delete
/// /characters/{id}/select                       select (POST)
/// /characters/{id}/inventory                    list items
/// /characters/{id}/inventory/{item_id}          remove item (DELETE)
///
/// /campaigns                                    list (optional auth)
/// /campaigns/active                             in-progress campaign
/// /campaigns/seed                               reseed base campaigns (POST)
/// /campaigns/{campaign_id}                      get (optional auth)
/// /campaigns/{campaign_id}/start                start (POST)
/// /campaigns/{campaign_id}/cancel               cancel (POST)
/// /campaigns/{campaign_id}/battles              record battle (POST)
/// /campaigns/{campaign_id}/history              narrative history
/// /campaigns/{campaign_id}/chapters/{n}/complete  complete chapter (POST)
/// /campaigns/{campaign_id}/chapters/{n}/summary   chapter summary
///
/// /llm/chat                                     narrator turn (POST)
/// /llm/character-suggestion                     suggestion (POST)
/// /llm/health                                   provider status
///
/// /lore/summary                                 world lore totals
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/characters", character::router())
        .nest("/campaigns", campaign::router())
        .nest("/llm", llm::router())
        .nest("/lore", lore::router())
}
