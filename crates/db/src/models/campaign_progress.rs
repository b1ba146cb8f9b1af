//! Per-user campaign progress.

use bson::oid::ObjectId;
use chromance_core::progression::{ChapterProgression, NarrativePhase};
use chromance_core::types::EntityId;
use serde::{Deserialize, Serialize};

/// Lifecycle of a user's run through a campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl ProgressStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A document from `campaign_progress`, unique per `(user_id, campaign_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignProgress {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: EntityId,
    pub campaign_id: String,
    pub status: ProgressStatus,
    pub active_character_id: Option<EntityId>,
    pub active_character_name: Option<String>,
    pub current_chapter: i32,
    #[serde(default)]
    pub chapters_completed: Vec<i32>,
    #[serde(default)]
    pub score: i32,
    #[serde(default)]
    pub battles_won: i32,
    #[serde(default)]
    pub battles_lost: i32,
    /// Ids of inventory items earned in this campaign.
    #[serde(default)]
    pub items_collected: Vec<String>,
    #[serde(default)]
    pub interaction_count: i32,
    #[serde(default)]
    pub phase: NarrativePhase,
    pub started_at: bson::DateTime,
    pub last_played_at: bson::DateTime,
    #[serde(default)]
    pub completed_at: Option<bson::DateTime>,
    #[serde(default)]
    pub cancelled_at: Option<bson::DateTime>,
}

impl CampaignProgress {
    /// Progression state of the chapter currently being played.
    pub fn progression(&self, chapter: i32) -> ChapterProgression {
        ChapterProgression::resume(chapter, self.interaction_count)
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ProgressStatus::InProgress
    }
}

/// DTO for starting (or restarting) a campaign.
#[derive(Debug, Clone)]
pub struct StartProgress {
    pub user_id: EntityId,
    pub campaign_id: String,
    pub character_id: EntityId,
    pub character_name: String,
    pub chapter: i32,
}
