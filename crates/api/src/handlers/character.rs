//! Handlers for the `/characters` resource.
//!
//! Every operation is scoped to the authenticated owner: another user's
//! character is reported as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chromance_core::error::CoreError;
use chromance_core::validation::{
    validate_attributes, validate_character_fields, validate_description, validate_name,
    validate_required_field,
};
use chromance_db::models::character::{
    CharacterPage, CharacterResponse, CreateCharacter, InventoryItemResponse, UpdateCharacter,
};
use chromance_db::repositories::CharacterRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::PageParams;
use crate::state::AppState;

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::not_found("Character", id))
}

/// POST /api/characters
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    AppJson(mut input): AppJson<CreateCharacter>,
) -> AppResult<(StatusCode, Json<CharacterResponse>)> {
    let (name, race, class) = validate_character_fields(&input.name, &input.race, &input.class)?;
    validate_attributes(&input.attributes)?;
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    input.name = name;
    input.race = race;
    input.class = class;

    let character = CharacterRepo::create(&state.db, &auth.user_id, &input).await?;
    tracing::info!(user_id = %auth.user_id, character_id = %character.id, "Character created");
    Ok((StatusCode::CREATED, Json(CharacterResponse::from(&character))))
}

/// GET /api/characters?page=&limit=
///
/// Newest first.
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    AppQuery(params): AppQuery<PageParams>,
) -> AppResult<Json<CharacterPage>> {
    let page = params.page();
    let total = CharacterRepo::count_owned(&state.db, &auth.user_id).await?;
    let characters = CharacterRepo::list_owned(&state.db, &auth.user_id, &page).await?;

    Ok(Json(CharacterPage {
        characters: characters.iter().map(CharacterResponse::from).collect(),
        total,
        page: page.page,
        limit: page.limit,
        pages: page.page_count(total),
    }))
}

/// GET /api/characters/selected
pub async fn get_selected(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<CharacterResponse>> {
    let character = CharacterRepo::find_selected(&state.db, &auth.user_id)
        .await?
        .ok_or_else(|| not_found("selected"))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// GET /api/characters/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<CharacterResponse>> {
    let character = CharacterRepo::find_owned(&state.db, &id, &auth.user_id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// PUT /api/characters/{id}
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    AppJson(mut input): AppJson<UpdateCharacter>,
) -> AppResult<Json<CharacterResponse>> {
    if input.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    if let Some(name) = &input.name {
        input.name = Some(validate_name(name)?);
    }
    if let Some(race) = &input.race {
        input.race = Some(validate_required_field("race", race)?);
    }
    if let Some(class) = &input.class {
        input.class = Some(validate_required_field("class", class)?);
    }
    if let Some(description) = &input.description {
        validate_description(description)?;
    }
    if let Some(attributes) = &input.attributes {
        validate_attributes(attributes)?;
    }
    if input.level.is_some_and(|l| l < 1) {
        return Err(AppError::Core(CoreError::Validation(
            "Level must be at least 1".into(),
        )));
    }

    let character = CharacterRepo::update(&state.db, &id, &auth.user_id, &input)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// DELETE /api/characters/{id}
///
/// Soft delete. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    if CharacterRepo::soft_delete(&state.db, &id, &auth.user_id).await? {
        tracing::info!(user_id = %auth.user_id, character_id = %id, "Character deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

/// POST /api/characters/{id}/select
///
/// Makes `id` the caller's single selected character.
pub async fn select(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<CharacterResponse>> {
    let character = CharacterRepo::select(&state.db, &id, &auth.user_id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(CharacterResponse::from(&character)))
}

/// GET /api/characters/{id}/inventory
pub async fn inventory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<InventoryItemResponse>>> {
    let items = CharacterRepo::inventory(&state.db, &id, &auth.user_id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(items.iter().map(InventoryItemResponse::from).collect()))
}

/// DELETE /api/characters/{id}/inventory/{item_id}
pub async fn remove_inventory_item(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, item_id)): Path<(String, String)>,
) -> AppResult<StatusCode> {
    if CharacterRepo::remove_inventory_item(&state.db, &id, &auth.user_id, &item_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::not_found("InventoryItem", item_id)))
    }
}
