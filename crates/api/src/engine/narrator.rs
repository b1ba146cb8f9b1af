//! One narrator turn.
//!
//! Without a campaign the turn is a plain chat with the game master persona.
//! With one, the turn also moves the chapter forward:
//!
//! 1. load the in-progress record and count the interaction
//! 2. retrieve related memories (current chapter turns and world lore)
//! 3. call the model and split its action list from the narrative
//! 4. record combat outcomes, the narrative itself and the new phase
//! 5. when the reply hands over the chapter reward, grant the item and close
//!    the chapter (lore extraction, archive, clear current turns)
//!
//! A failed model call is reported in the body (`success: false`), not as an
//! HTTP error, and leaves the campaign untouched.

use chromance_core::actions::{default_actions, extract_actions, ContextualAction};
use chromance_core::combat::{detect_combat_outcome, CombatOutcome};
use chromance_core::error::CoreError;
use chromance_core::progression::{ChapterProgression, NarrativePhase, PhaseAdvance};
use chromance_core::prompt::{
    build_system_prompt, history_window, CampaignContext, CharacterContext, PromptContext,
    MAX_PROMPT_MEMORIES,
};
use chromance_core::rewards::{chapter_reward, create_reward_item, detect_reward, REWARD_ITEM_TYPE};
use chromance_db::models::campaign::Campaign;
use chromance_db::models::campaign_progress::CampaignProgress;
use chromance_db::models::character::{Character, InventoryItem, InventoryItemResponse};
use chromance_db::models::narrative::NewNarrative;
use chromance_db::repositories::{CampaignRepo, CharacterRepo, NarrativeRepo, ProgressRepo};
use chromance_llm::{ChatMessage, Role, Usage};
use serde::{Deserialize, Serialize};

use crate::engine::memory;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Longest player message accepted, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

fn default_true() -> bool {
    true
}

/// Request body for `POST /llm/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default)]
    pub campaign_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
    #[serde(default = "default_true")]
    pub generate_actions: bool,
}

/// Chapter state after the turn.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressionInfo {
    pub chapter: i32,
    pub phase: NarrativePhase,
    pub interaction_count: i32,
    pub phase_changed: bool,
    pub reward_eligible: bool,
    pub must_conclude: bool,
}

/// Response body for `POST /llm/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: Option<String>,
    pub contextual_actions: Vec<ContextualAction>,
    pub error: Option<String>,
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progression: Option<ProgressionInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub combat: Option<CombatOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<InventoryItemResponse>,
    pub chapter_completed: bool,
}

impl ChatResponse {
    fn failed(error: String) -> Self {
        Self {
            success: false,
            response: None,
            contextual_actions: Vec::new(),
            error: Some(error),
            usage: None,
            progression: None,
            combat: None,
            reward: None,
            chapter_completed: false,
        }
    }
}

/// Campaign state loaded for a turn, with this turn's interaction counted.
struct CampaignTurn {
    campaign: Campaign,
    progress: CampaignProgress,
    progression: ChapterProgression,
    advance: PhaseAdvance,
}

impl CampaignTurn {
    fn chapter(&self) -> i32 {
        self.progression.chapter
    }

    fn campaign_id(&self) -> &str {
        &self.campaign.campaign_id
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Run one chat turn for `user_id`.
pub async fn run_turn(
    state: &AppState,
    user_id: &str,
    request: ChatRequest,
) -> AppResult<ChatResponse> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Message must not be empty".into(),
        )));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_LENGTH} characters long"
        ))));
    }

    let turn = match request.campaign_id.as_deref() {
        Some(campaign_id) => Some(load_turn(state, user_id, campaign_id).await?),
        None => None,
    };
    let character =
        resolve_character(state, user_id, request.character_id.as_deref(), turn.as_ref()).await?;
    let memories = match &turn {
        Some(turn) => {
            memory::recall(
                state,
                user_id,
                turn.campaign_id(),
                turn.chapter(),
                message,
                MAX_PROMPT_MEMORIES,
            )
            .await
        }
        None => Vec::new(),
    };

    let ctx = PromptContext {
        character: character.as_ref().map(character_context),
        campaign: turn.as_ref().map(campaign_context),
        memories,
        generate_actions: request.generate_actions,
    };

    let history = history_window(&request.conversation_history);
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(build_system_prompt(&ctx)));
    messages.extend(history.iter().filter(|m| m.role != Role::System).cloned());
    messages.push(ChatMessage::user(message));

    let completion = match state.llm.complete(&messages).await {
        Ok(completion) => completion,
        Err(err) => {
            tracing::warn!(error = %err, user_id, "Narrator completion failed");
            return Ok(ChatResponse::failed(err.to_string()));
        }
    };

    let phase = turn
        .as_ref()
        .map_or(NarrativePhase::default(), |t| t.advance.current);
    let (narrative, contextual_actions) = if request.generate_actions {
        let extracted = extract_actions(&completion.content);
        let actions = if extracted.actions.is_empty() {
            default_actions(phase)
        } else {
            extracted.actions
        };
        (extracted.narrative, actions)
    } else {
        (completion.content, Vec::new())
    };

    let mut response = ChatResponse {
        success: true,
        response: Some(narrative.clone()),
        contextual_actions,
        error: None,
        usage: completion.usage,
        progression: None,
        combat: None,
        reward: None,
        chapter_completed: false,
    };

    if let Some(turn) = turn {
        apply_turn(state, user_id, &turn, character.as_ref(), &narrative, &mut response).await?;
    }
    Ok(response)
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

async fn load_turn(state: &AppState, user_id: &str, campaign_id: &str) -> AppResult<CampaignTurn> {
    let campaign = CampaignRepo::find_by_slug(&state.db, campaign_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Campaign", campaign_id)))?;

    let progress = ProgressRepo::find(&state.db, user_id, campaign_id)
        .await?
        .filter(CampaignProgress::is_in_progress)
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(format!(
                "Campaign '{campaign_id}' is not in progress"
            )))
        })?;

    let mut progression = progress.progression(progress.current_chapter);
    let advance = progression.advance();
    if advance.changed() {
        tracing::info!(
            user_id,
            campaign_id,
            chapter = progression.chapter,
            from = advance.previous.as_str(),
            to = advance.current.as_str(),
            "Narrative phase changed"
        );
    }

    Ok(CampaignTurn {
        campaign,
        progress,
        progression,
        advance,
    })
}

/// The character playing this turn: the one named in the request, else the
/// campaign's active character, else the caller's selected character.
async fn resolve_character(
    state: &AppState,
    user_id: &str,
    requested: Option<&str>,
    turn: Option<&CampaignTurn>,
) -> AppResult<Option<Character>> {
    if let Some(id) = requested {
        let character = CharacterRepo::find_owned(&state.db, id, user_id)
            .await?
            .ok_or_else(|| AppError::Core(CoreError::not_found("Character", id)))?;
        return Ok(Some(character));
    }

    if let Some(id) = turn.and_then(|t| t.progress.active_character_id.as_deref()) {
        if let Some(character) = CharacterRepo::find_owned(&state.db, id, user_id).await? {
            return Ok(Some(character));
        }
    }

    Ok(CharacterRepo::find_selected(&state.db, user_id).await?)
}

fn character_context(character: &Character) -> CharacterContext {
    CharacterContext {
        name: character.name.clone(),
        race: character.race.clone(),
        class: character.class.clone(),
        description: Some(character.description.clone()),
        level: character.level,
        attributes: Some(character.attributes),
    }
}

fn campaign_context(turn: &CampaignTurn) -> CampaignContext {
    CampaignContext {
        title: turn.campaign.title.clone(),
        chapter: turn.chapter(),
        phase: turn.advance.current,
        interaction_count: turn.advance.interaction_count,
        reward_name: chapter_reward(turn.chapter()).map(|r| r.name.to_string()),
        reward_eligible: turn.progression.reward_eligible(),
        must_conclude: turn.progression.must_conclude(),
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

async fn apply_turn(
    state: &AppState,
    user_id: &str,
    turn: &CampaignTurn,
    character: Option<&Character>,
    narrative: &str,
    response: &mut ChatResponse,
) -> AppResult<()> {
    let campaign_id = turn.campaign_id();
    let chapter = turn.chapter();

    if let Some(outcome) = detect_combat_outcome(narrative) {
        ProgressRepo::record_battle(&state.db, user_id, campaign_id, outcome).await?;
        tracing::info!(user_id, campaign_id, outcome = ?outcome, "Battle recorded");
        response.combat = Some(outcome);
    }

    let entry = NewNarrative {
        text: narrative.to_string(),
        campaign_id: campaign_id.to_string(),
        character_id: character.map(|c| c.id.to_hex()).unwrap_or_default(),
        user_id: user_id.to_string(),
        chapter,
        phase: turn.advance.current,
        interaction_count: turn.advance.interaction_count,
    };
    memory::remember(state, &entry).await;

    let recorded =
        ProgressRepo::record_interaction(&state.db, user_id, campaign_id, turn.advance.current)
            .await?;
    let interaction_count = recorded.map_or(turn.advance.interaction_count, |p| p.interaction_count);

    response.progression = Some(ProgressionInfo {
        chapter,
        phase: turn.advance.current,
        interaction_count,
        phase_changed: turn.advance.changed(),
        reward_eligible: turn.progression.reward_eligible(),
        must_conclude: turn.progression.must_conclude(),
    });

    if turn.progression.reward_eligible() && detect_reward(narrative, chapter) {
        let item = grant_reward(state, user_id, turn, character).await?;
        close_chapter(state, user_id, campaign_id, chapter).await?;
        response.reward = Some(InventoryItemResponse::from(&item));
        response.chapter_completed = true;
    }
    Ok(())
}

/// Put the chapter reward in the character's inventory and finish the chapter.
///
/// Returns the stored item (the existing one if it was already granted).
async fn grant_reward(
    state: &AppState,
    user_id: &str,
    turn: &CampaignTurn,
    character: Option<&Character>,
) -> AppResult<InventoryItem> {
    let campaign_id = turn.campaign_id();
    let chapter = turn.chapter();
    let item: InventoryItem = create_reward_item(chapter, campaign_id, chrono::Utc::now()).into();

    let stored = match character {
        Some(character) => CharacterRepo::add_inventory_item(
            &state.db,
            &character.id.to_hex(),
            user_id,
            &item,
        )
        .await?
        .and_then(|c| {
            c.inventory.into_iter().find(|i| {
                i.item_type == REWARD_ITEM_TYPE
                    && i.chapter == Some(chapter)
                    && i.campaign_id.as_deref() == Some(campaign_id)
            })
        }),
        None => None,
    };

    if stored.is_none() {
        tracing::warn!(user_id, campaign_id, chapter, "Reward granted without a character to hold it");
    }
    let item_id = stored.as_ref().map(|i| i.id.as_str());
    ProgressRepo::finish_chapter(&state.db, user_id, campaign_id, chapter, item_id).await?;

    let item = stored.unwrap_or(item);
    tracing::info!(user_id, campaign_id, chapter, item_id = %item.id, "Chapter reward granted");
    Ok(item)
}

/// Record the chapter's lore, archive its turns and clear them from the
/// current collection.
async fn close_chapter(
    state: &AppState,
    user_id: &str,
    campaign_id: &str,
    chapter: i32,
) -> AppResult<()> {
    memory::record_chapter_lore(state, campaign_id, chapter).await?;
    let archived = NarrativeRepo::archive_chapter(&state.db, user_id, campaign_id, chapter).await?;
    let cleared = NarrativeRepo::clear_chapter(&state.db, user_id, campaign_id, chapter).await?;
    tracing::info!(user_id, campaign_id, chapter, archived, cleared, "Chapter closed");
    Ok(())
}
