//! Character document, inventory items and DTOs.

use std::collections::BTreeMap;

use bson::oid::ObjectId;
use chromance_core::rewards::RewardItem;
use chromance_core::types::{EntityId, Timestamp};
use chromance_core::validation::Attributes;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FACTION: &str = "Street Runners";
pub const DEFAULT_IMAGE_URL: &str = "assets/images/default-avatar.png";
pub const STARTING_LEVEL: i32 = 1;
pub const STARTING_HEALTH: i32 = 100;

/// A cybernetic implant listed on the sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cyberware {
    pub name: String,
    #[serde(default)]
    pub effect: String,
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// An item stored inside a character document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    pub chapter: Option<i32>,
    pub campaign_id: Option<String>,
    pub obtained_at: bson::DateTime,
}

impl From<RewardItem> for InventoryItem {
    fn from(item: RewardItem) -> Self {
        Self {
            id: item.id,
            name: item.name,
            description: item.description,
            item_type: item.item_type,
            metadata: item.metadata,
            chapter: Some(item.chapter),
            campaign_id: Some(item.campaign_id),
            obtained_at: bson::DateTime::from_chrono(item.obtained_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryItemResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub item_type: String,
    pub metadata: BTreeMap<String, String>,
    pub chapter: Option<i32>,
    pub campaign_id: Option<String>,
    pub obtained_at: Timestamp,
}

impl From<&InventoryItem> for InventoryItemResponse {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            item_type: item.item_type.clone(),
            metadata: item.metadata.clone(),
            chapter: item.chapter,
            campaign_id: item.campaign_id.clone(),
            obtained_at: item.obtained_at.to_chrono(),
        }
    }
}

// ---------------------------------------------------------------------------
// Character
// ---------------------------------------------------------------------------

/// A character document from the `characters` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Hex id of the owning user.
    pub user_id: EntityId,
    pub name: String,
    pub race: String,
    pub class: String,
    #[serde(default)]
    pub description: String,
    pub attributes: Attributes,
    pub faction: String,
    #[serde(default)]
    pub cyberware: Vec<Cyberware>,
    pub level: i32,
    pub health: i32,
    pub experience: i32,
    pub image_url: String,
    #[serde(default)]
    pub inventory: Vec<InventoryItem>,
    pub is_selected: bool,
    /// `false` once soft-deleted.
    pub active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

/// Character as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct CharacterResponse {
    pub id: EntityId,
    pub user_id: EntityId,
    pub name: String,
    pub race: String,
    pub class: String,
    pub description: String,
    pub attributes: Attributes,
    pub faction: String,
    pub cyberware: Vec<Cyberware>,
    pub level: i32,
    pub health: i32,
    pub experience: i32,
    pub image_url: String,
    pub inventory: Vec<InventoryItemResponse>,
    pub is_selected: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Character> for CharacterResponse {
    fn from(c: &Character) -> Self {
        Self {
            id: c.id.to_hex(),
            user_id: c.user_id.clone(),
            name: c.name.clone(),
            race: c.race.clone(),
            class: c.class.clone(),
            description: c.description.clone(),
            attributes: c.attributes,
            faction: c.faction.clone(),
            cyberware: c.cyberware.clone(),
            level: c.level,
            health: c.health,
            experience: c.experience,
            image_url: c.image_url.clone(),
            inventory: c.inventory.iter().map(InventoryItemResponse::from).collect(),
            is_selected: c.is_selected,
            created_at: c.created_at.to_chrono(),
            updated_at: c.updated_at.to_chrono(),
        }
    }
}

/// DTO for creating a character. Text fields are validated before reaching the repo.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub name: String,
    pub race: String,
    pub class: String,
    pub description: Option<String>,
    pub attributes: Attributes,
    /// Defaults to [`DEFAULT_FACTION`].
    pub faction: Option<String>,
    pub cyberware: Option<Vec<Cyberware>>,
    /// Defaults to [`DEFAULT_IMAGE_URL`].
    pub image_url: Option<String>,
}

/// DTO for updating a character. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCharacter {
    pub name: Option<String>,
    pub race: Option<String>,
    pub class: Option<String>,
    pub description: Option<String>,
    pub attributes: Option<Attributes>,
    pub faction: Option<String>,
    pub cyberware: Option<Vec<Cyberware>>,
    pub level: Option<i32>,
    pub health: Option<i32>,
    pub experience: Option<i32>,
    pub image_url: Option<String>,
}

impl UpdateCharacter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.race.is_none()
            && self.class.is_none()
            && self.description.is_none()
            && self.attributes.is_none()
            && self.faction.is_none()
            && self.cyberware.is_none()
            && self.level.is_none()
            && self.health.is_none()
            && self.experience.is_none()
            && self.image_url.is_none()
    }
}

/// Paged list response for `GET /api/characters`.
#[derive(Debug, Serialize)]
pub struct CharacterPage {
    pub characters: Vec<CharacterResponse>,
    pub total: u64,
    pub page: i64,
    pub limit: i64,
    pub pages: u64,
}
