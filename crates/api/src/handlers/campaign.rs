//! Handlers for the `/campaigns` resource and the caller's progress in each.

use axum::extract::{Path, State};
use axum::Json;
use chromance_core::campaigns::base_campaigns;
use chromance_core::combat::CombatOutcome;
use chromance_core::error::CoreError;
use chromance_core::pagination::MAX_PAGE_LIMIT;
use chromance_db::models::campaign::{CampaignList, CampaignResponse};
use chromance_db::models::campaign_progress::{CampaignProgress, StartProgress};
use chromance_db::models::narrative::{ChapterSummary, NarrativeResponse};
use chromance_db::repositories::narrative_repo::DEFAULT_HISTORY_LIMIT;
use chromance_db::repositories::{CampaignRepo, CharacterRepo, NarrativeRepo, ProgressRepo};
use serde::Deserialize;

use crate::engine::memory;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::HistoryParams;
use crate::response::MessageResponse;
use crate::state::AppState;

/// Request body for `POST /campaigns/{campaign_id}/start`.
#[derive(Debug, Deserialize)]
pub struct StartCampaignRequest {
    pub character_id: String,
}

/// Request body for `POST /campaigns/{campaign_id}/battles`.
#[derive(Debug, Deserialize)]
pub struct BattleRequest {
    pub won: bool,
}

fn no_progress(campaign_id: &str) -> AppError {
    AppError::Core(CoreError::not_found("CampaignProgress", campaign_id))
}

/// Campaign `campaign_id` with the caller's progress, or 404.
async fn load_merged(
    state: &AppState,
    campaign_id: &str,
    progress: Option<&CampaignProgress>,
) -> AppResult<CampaignResponse> {
    let campaign = CampaignRepo::find_by_slug(&state.db, campaign_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Campaign", campaign_id)))?;
    Ok(CampaignResponse::merge(&campaign, progress))
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// GET /api/campaigns
///
/// Anonymous callers get the catalog with default progress values.
pub async fn list(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
) -> AppResult<Json<CampaignList>> {
    let campaigns = CampaignRepo::list_base(&state.db).await?;
    let progress = match &auth {
        Some(user) => ProgressRepo::list_for_user(&state.db, &user.user_id).await?,
        None => Vec::new(),
    };

    let campaigns: Vec<CampaignResponse> = campaigns
        .iter()
        .map(|c| {
            let own = progress.iter().find(|p| p.campaign_id == c.campaign_id);
            CampaignResponse::merge(c, own)
        })
        .collect();

    Ok(Json(CampaignList {
        total: campaigns.len(),
        campaigns,
    }))
}

/// GET /api/campaigns/{campaign_id}
pub async fn get_by_slug(
    State(state): State<AppState>,
    auth: Option<AuthUser>,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<CampaignResponse>> {
    let progress = match &auth {
        Some(user) => ProgressRepo::find(&state.db, &user.user_id, &campaign_id).await?,
        None => None,
    };
    Ok(Json(load_merged(&state, &campaign_id, progress.as_ref()).await?))
}

/// GET /api/campaigns/active
///
/// The caller's in-progress campaign, or `null`.
pub async fn get_active(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Option<CampaignResponse>>> {
    let Some(progress) = ProgressRepo::find_active(&state.db, &auth.user_id).await? else {
        return Ok(Json(None));
    };
    let merged = load_merged(&state, &progress.campaign_id, Some(&progress)).await?;
    Ok(Json(Some(merged)))
}

/// POST /api/campaigns/seed
///
/// Replace the base campaigns with the built-in catalog. Progress is kept.
pub async fn seed(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<CampaignList>> {
    CampaignRepo::replace_base(&state.db, base_campaigns()).await?;
    tracing::info!(user_id = %auth.user_id, "Base campaigns reseeded");

    let campaigns: Vec<CampaignResponse> = CampaignRepo::list_base(&state.db)
        .await?
        .iter()
        .map(|c| CampaignResponse::merge(c, None))
        .collect();
    Ok(Json(CampaignList {
        total: campaigns.len(),
        campaigns,
    }))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// POST /api/campaigns/{campaign_id}/start
///
/// Start or restart a campaign with one of the caller's characters. Any
/// other in-progress campaign is cancelled and the memory of a previous run
/// of this campaign is cleared.
pub async fn start(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<String>,
    AppJson(input): AppJson<StartCampaignRequest>,
) -> AppResult<Json<CampaignResponse>> {
    let campaign = CampaignRepo::find_by_slug(&state.db, &campaign_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Campaign", campaign_id.clone())))?;
    if campaign.is_locked {
        return Err(AppError::Core(CoreError::Forbidden(
            "Campaign is locked".into(),
        )));
    }

    let character = CharacterRepo::find_owned(&state.db, &input.character_id, &auth.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::not_found("Character", input.character_id.clone()))
        })?;

    NarrativeRepo::clear_campaign(&state.db, &auth.user_id, &campaign_id).await?;
    let progress = ProgressRepo::start(
        &state.db,
        &StartProgress {
            user_id: auth.user_id.clone(),
            campaign_id: campaign_id.clone(),
            character_id: character.id.to_hex(),
            character_name: character.name.clone(),
            chapter: campaign.chapter,
        },
    )
    .await?
    .ok_or_else(|| AppError::InternalError("Progress upsert returned no document".into()))?;

    tracing::info!(
        user_id = %auth.user_id,
        campaign_id = %campaign_id,
        character_id = %character.id,
        "Campaign started"
    );
    Ok(Json(CampaignResponse::merge(&campaign, Some(&progress))))
}

/// POST /api/campaigns/{campaign_id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !ProgressRepo::cancel(&state.db, &auth.user_id, &campaign_id).await? {
        return Err(no_progress(&campaign_id));
    }
    tracing::info!(user_id = %auth.user_id, campaign_id = %campaign_id, "Campaign cancelled");
    Ok(Json(MessageResponse::new("Campaign cancelled")))
}

/// POST /api/campaigns/{campaign_id}/chapters/{chapter}/complete
///
/// Mark a chapter completed and record the lore it revealed.
pub async fn complete_chapter(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((campaign_id, chapter)): Path<(String, i32)>,
) -> AppResult<Json<CampaignResponse>> {
    let progress = ProgressRepo::complete_chapter(&state.db, &auth.user_id, &campaign_id, chapter)
        .await?
        .ok_or_else(|| no_progress(&campaign_id))?;

    memory::record_chapter_lore(&state, &campaign_id, chapter).await?;
    Ok(Json(load_merged(&state, &campaign_id, Some(&progress)).await?))
}

/// POST /api/campaigns/{campaign_id}/battles
pub async fn record_battle(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<String>,
    AppJson(input): AppJson<BattleRequest>,
) -> AppResult<Json<CampaignResponse>> {
    let outcome = if input.won {
        CombatOutcome::Won
    } else {
        CombatOutcome::Lost
    };
    let progress = ProgressRepo::record_battle(&state.db, &auth.user_id, &campaign_id, outcome)
        .await?
        .ok_or_else(|| no_progress(&campaign_id))?;
    Ok(Json(load_merged(&state, &campaign_id, Some(&progress)).await?))
}

// ---------------------------------------------------------------------------
// Narrative history
// ---------------------------------------------------------------------------

/// GET /api/campaigns/{campaign_id}/history?chapter=&limit=
///
/// The caller's narrator turns in chronological order.
pub async fn history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(campaign_id): Path<String>,
    AppQuery(params): AppQuery<HistoryParams>,
) -> AppResult<Json<Vec<NarrativeResponse>>> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_PAGE_LIMIT);
    let turns =
        NarrativeRepo::history(&state.db, &auth.user_id, &campaign_id, params.chapter, limit).await?;
    Ok(Json(turns.iter().map(NarrativeResponse::from).collect()))
}

/// GET /api/campaigns/{campaign_id}/chapters/{chapter}/summary
pub async fn chapter_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((campaign_id, chapter)): Path<(String, i32)>,
) -> AppResult<Json<ChapterSummary>> {
    let summary =
        NarrativeRepo::chapter_summary(&state.db, &auth.user_id, &campaign_id, chapter).await?;
    Ok(Json(summary))
}
