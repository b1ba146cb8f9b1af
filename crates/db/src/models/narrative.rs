//! Narrative memory documents.
//!
//! Three collections make up the memory store:
//! - `narratives_current`: turns of chapters being played
//! - `narratives_archive`: turns of finished chapters, kept for history
//! - `world_lore`: permanent facts about the world, deduplicated by content hash

use std::collections::BTreeMap;

use chromance_core::lore::LoreType;
use chromance_core::progression::NarrativePhase;
use chromance_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};

/// Context recorded with every narrative turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeMetadata {
    pub campaign_id: String,
    pub character_id: EntityId,
    pub user_id: EntityId,
    pub chapter: i32,
    pub phase: NarrativePhase,
    pub interaction_count: i32,
    pub world_id: String,
}

/// A stored narrative turn, in either the current or the archive collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativeEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub metadata: NarrativeMetadata,
    /// Empty when the turn was stored without an embedding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    pub timestamp: bson::DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<bson::DateTime>,
}

/// DTO for storing a turn.
#[derive(Debug, Clone)]
pub struct NewNarrative {
    pub text: String,
    pub campaign_id: String,
    pub character_id: EntityId,
    pub user_id: EntityId,
    pub chapter: i32,
    pub phase: NarrativePhase,
    pub interaction_count: i32,
}

/// A permanent lore fact from `world_lore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreEntry {
    /// Deterministic content hash, see `chromance_core::lore::lore_id`.
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    pub lore_type: LoreType,
    pub chapter_discovered: i32,
    pub campaign_id: String,
    pub world_id: String,
    pub importance: f64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
    pub timestamp: bson::DateTime,
}

// ---------------------------------------------------------------------------
// Search results
// ---------------------------------------------------------------------------

/// Which collection a search hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MemorySource {
    Current,
    Lore,
}

/// One retrieved memory, best first.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryHit {
    pub id: String,
    pub text: String,
    pub source: MemorySource,
    pub distance: f64,
    pub weight: f64,
    pub chapter: i32,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// A narrative turn as returned by the history endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct NarrativeResponse {
    pub id: String,
    pub narrative: String,
    pub metadata: NarrativeMetadata,
    pub timestamp: Timestamp,
}

impl From<&NarrativeEntry> for NarrativeResponse {
    fn from(entry: &NarrativeEntry) -> Self {
        Self {
            id: entry.id.clone(),
            narrative: entry.text.clone(),
            metadata: entry.metadata.clone(),
            timestamp: entry.timestamp.to_chrono(),
        }
    }
}

/// Interaction breakdown of one chapter.
#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub chapter: i32,
    pub total_interactions: usize,
    /// Turn count per phase name.
    pub phases: BTreeMap<String, usize>,
    pub narratives: Vec<NarrativeResponse>,
}

/// Aggregate view of the accumulated world lore.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoreSummary {
    pub total_items: u64,
    pub by_type: BTreeMap<String, u64>,
    pub by_chapter: BTreeMap<i32, u64>,
}

/// Document counts per memory collection.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MemoryCounts {
    pub current: u64,
    pub archive: u64,
    pub lore: u64,
}

impl MemoryCounts {
    pub fn total(&self) -> u64 {
        self.current + self.archive + self.lore
    }
}
