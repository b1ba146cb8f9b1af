//! Base campaign document and the merged campaign view.

use bson::oid::ObjectId;
use chromance_core::campaigns::CampaignSeed;
use chromance_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::models::campaign_progress::{CampaignProgress, ProgressStatus};

/// A reward shown on the campaign card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignReward {
    pub reward_type: String,
    pub name: String,
    pub icon: String,
}

/// A global campaign from the `campaigns` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Public slug, e.g. `arena-sombras`.
    pub campaign_id: String,
    pub title: String,
    pub chapter: i32,
    pub description: String,
    pub full_description: String,
    pub image: String,
    pub thumbnail: String,
    pub rewards: Vec<CampaignReward>,
    pub is_locked: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

impl Campaign {
    pub fn from_seed(seed: &CampaignSeed, now: bson::DateTime) -> Self {
        Self {
            id: ObjectId::new(),
            campaign_id: seed.campaign_id.to_string(),
            title: seed.title.to_string(),
            chapter: seed.chapter,
            description: seed.description.to_string(),
            full_description: seed.full_description.to_string(),
            image: seed.image.to_string(),
            thumbnail: seed.thumbnail().to_string(),
            rewards: seed
                .rewards
                .iter()
                .map(|r| CampaignReward {
                    reward_type: r.reward_type.to_string(),
                    name: r.name.to_string(),
                    icon: r.icon.to_string(),
                })
                .collect(),
            is_locked: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A campaign with the caller's progress merged in.
///
/// Anonymous callers (and users who never started the campaign) get the
/// default progress values.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignResponse {
    pub id: EntityId,
    pub campaign_id: String,
    pub title: String,
    pub chapter: i32,
    pub description: String,
    pub full_description: String,
    pub image: String,
    pub thumbnail: String,
    pub rewards: Vec<CampaignReward>,
    pub is_locked: bool,
    pub status: Option<ProgressStatus>,
    pub active_character_id: Option<EntityId>,
    pub active_character_name: Option<String>,
    pub current_chapter: i32,
    pub chapters_completed: Vec<i32>,
    pub score: i32,
    pub battles_won: i32,
    pub battles_lost: i32,
    pub interaction_count: i32,
    pub started_at: Option<Timestamp>,
    pub last_played_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl CampaignResponse {
    pub fn merge(campaign: &Campaign, progress: Option<&CampaignProgress>) -> Self {
        Self {
            id: campaign.id.to_hex(),
            campaign_id: campaign.campaign_id.clone(),
            title: campaign.title.clone(),
            chapter: campaign.chapter,
            description: campaign.description.clone(),
            full_description: campaign.full_description.clone(),
            image: campaign.image.clone(),
            thumbnail: campaign.thumbnail.clone(),
            rewards: campaign.rewards.clone(),
            is_locked: campaign.is_locked,
            status: progress.map(|p| p.status),
            active_character_id: progress.and_then(|p| p.active_character_id.clone()),
            active_character_name: progress.and_then(|p| p.active_character_name.clone()),
            current_chapter: progress.map_or(1, |p| p.current_chapter),
            chapters_completed: progress.map(|p| p.chapters_completed.clone()).unwrap_or_default(),
            score: progress.map_or(0, |p| p.score),
            battles_won: progress.map_or(0, |p| p.battles_won),
            battles_lost: progress.map_or(0, |p| p.battles_lost),
            interaction_count: progress.map_or(0, |p| p.interaction_count),
            started_at: progress.map(|p| p.started_at.to_chrono()),
            last_played_at: progress.map(|p| p.last_played_at.to_chrono()),
            completed_at: progress.and_then(|p| p.completed_at.map(|t| t.to_chrono())),
        }
    }
}

/// List response for `GET /api/campaigns`.
#[derive(Debug, Serialize)]
pub struct CampaignList {
    pub campaigns: Vec<CampaignResponse>,
    pub total: usize,
}
