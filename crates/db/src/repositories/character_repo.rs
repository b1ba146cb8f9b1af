//! Repository for the `characters` collection.

use bson::oid::ObjectId;
use bson::{doc, Document};
use chromance_core::pagination::Page;
use chromance_core::rewards::REWARD_ITEM_TYPE;
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::models::character::{
    Character, CreateCharacter, InventoryItem, UpdateCharacter, DEFAULT_FACTION,
    DEFAULT_IMAGE_URL, STARTING_HEALTH, STARTING_LEVEL,
};
use crate::{parse_object_id, CHARACTERS};

/// Filter matching an active character owned by `user_id`.
fn owned(oid: ObjectId, user_id: &str) -> Document {
    doc! { "_id": oid, "user_id": user_id, "active": true }
}

/// Provides owner-scoped CRUD, selection and inventory operations.
pub struct CharacterRepo;

impl CharacterRepo {
    fn collection(db: &Database) -> Collection<Character> {
        db.collection(CHARACTERS)
    }

    /// Insert a new character for `user_id`, returning the stored document.
    pub async fn create(
        db: &Database,
        user_id: &str,
        input: &CreateCharacter,
    ) -> mongodb::error::Result<Character> {
        let now = bson::DateTime::now();
        let character = Character {
            id: ObjectId::new(),
            user_id: user_id.to_string(),
            name: input.name.clone(),
            race: input.race.clone(),
            class: input.class.clone(),
            description: input.description.clone().unwrap_or_default(),
            attributes: input.attributes,
            faction: input
                .faction
                .clone()
                .unwrap_or_else(|| DEFAULT_FACTION.to_string()),
            cyberware: input.cyberware.clone().unwrap_or_default(),
            level: STARTING_LEVEL,
            health: STARTING_HEALTH,
            experience: 0,
            image_url: input
                .image_url
                .clone()
                .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string()),
            inventory: Vec::new(),
            is_selected: false,
            active: true,
            created_at: now,
            updated_at: now,
        };
        Self::collection(db).insert_one(&character).await?;
        Ok(character)
    }

    /// Find an active character by id, only if owned by `user_id`.
    pub async fn find_owned(
        db: &Database,
        id: &str,
        user_id: &str,
    ) -> mongodb::error::Result<Option<Character>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        Self::collection(db).find_one(owned(oid, user_id)).await
    }

    /// List active characters of `user_id`, newest first.
    pub async fn list_owned(
        db: &Database,
        user_id: &str,
        page: &Page,
    ) -> mongodb::error::Result<Vec<Character>> {
        Self::collection(db)
            .find(doc! { "user_id": user_id, "active": true })
            .sort(doc! { "created_at": -1, "_id": -1 })
            .skip(page.skip())
            .limit(page.limit)
            .await?
            .try_collect()
            .await
    }

    /// Count active characters of `user_id`.
    pub async fn count_owned(db: &Database, user_id: &str) -> mongodb::error::Result<u64> {
        Self::collection(db)
            .count_documents(doc! { "user_id": user_id, "active": true })
            .await
    }

    /// Apply the non-`None` fields of `input`.
    ///
    /// Returns `None` if no owned active character matches.
    pub async fn update(
        db: &Database,
        id: &str,
        user_id: &str,
        input: &UpdateCharacter,
    ) -> mongodb::error::Result<Option<Character>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(v) = &input.name {
            set.insert("name", v.as_str());
        }
        if let Some(v) = &input.race {
            set.insert("race", v.as_str());
        }
        if let Some(v) = &input.class {
            set.insert("class", v.as_str());
        }
        if let Some(v) = &input.description {
            set.insert("description", v.as_str());
        }
        if let Some(v) = &input.attributes {
            set.insert("attributes", bson::to_bson(v)?);
        }
        if let Some(v) = &input.faction {
            set.insert("faction", v.as_str());
        }
        if let Some(v) = &input.cyberware {
            set.insert("cyberware", bson::to_bson(v)?);
        }
        if let Some(v) = input.level {
            set.insert("level", v);
        }
        if let Some(v) = input.health {
            set.insert("health", v);
        }
        if let Some(v) = input.experience {
            set.insert("experience", v);
        }
        if let Some(v) = &input.image_url {
            set.insert("image_url", v.as_str());
        }

        Self::collection(db)
            .find_one_and_update(owned(oid, user_id), doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
    }

    /// Soft-delete: mark inactive and unselected.
    ///
    /// Returns `true` if a character was deactivated.
    pub async fn soft_delete(db: &Database, id: &str, user_id: &str) -> mongodb::error::Result<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };
        let result = Self::collection(db)
            .update_one(
                owned(oid, user_id),
                doc! { "$set": {
                    "active": false,
                    "is_selected": false,
                    "updated_at": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Clear the selection flag on every character of `user_id`.
    pub async fn unselect_all(db: &Database, user_id: &str) -> mongodb::error::Result<u64> {
        let result = Self::collection(db)
            .update_many(
                doc! { "user_id": user_id, "is_selected": true },
                doc! { "$set": { "is_selected": false, "updated_at": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.modified_count)
    }

    /// Make `id` the only selected character of `user_id`.
    ///
    /// Returns `None` (and changes nothing) if the character is not owned.
    pub async fn select(
        db: &Database,
        id: &str,
        user_id: &str,
    ) -> mongodb::error::Result<Option<Character>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        if Self::collection(db).find_one(owned(oid, user_id)).await?.is_none() {
            return Ok(None);
        }

        Self::unselect_all(db, user_id).await?;
        Self::collection(db)
            .find_one_and_update(
                owned(oid, user_id),
                doc! { "$set": { "is_selected": true, "updated_at": bson::DateTime::now() } },
            )
            .return_document(ReturnDocument::After)
            .await
    }

    /// The currently selected character of `user_id`, if any.
    pub async fn find_selected(
        db: &Database,
        user_id: &str,
    ) -> mongodb::error::Result<Option<Character>> {
        Self::collection(db)
            .find_one(doc! { "user_id": user_id, "active": true, "is_selected": true })
            .await
    }

    /// Push `item` into the inventory.
    ///
    /// Chapter rewards are granted once per `(campaign_id, chapter)`: when the
    /// character already holds that reward the document is returned unchanged.
    pub async fn add_inventory_item(
        db: &Database,
        id: &str,
        user_id: &str,
        item: &InventoryItem,
    ) -> mongodb::error::Result<Option<Character>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };

        let mut filter = owned(oid, user_id);
        if item.item_type == REWARD_ITEM_TYPE {
            filter.insert(
                "inventory",
                doc! { "$not": { "$elemMatch": {
                    "item_type": REWARD_ITEM_TYPE,
                    "chapter": item.chapter,
                    "campaign_id": item.campaign_id.as_deref(),
                } } },
            );
        }

        let updated = Self::collection(db)
            .find_one_and_update(
                filter,
                doc! {
                    "$push": { "inventory": bson::to_bson(item)? },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await?;

        match updated {
            Some(character) => {
                tracing::info!(character_id = %id, item = %item.name, "Inventory item added");
                Ok(Some(character))
            }
            None => {
                // Either not owned or the reward is already there.
                let existing = Self::collection(db).find_one(owned(oid, user_id)).await?;
                if existing.is_some() {
                    tracing::debug!(character_id = %id, chapter = ?item.chapter, "Reward already in inventory");
                }
                Ok(existing)
            }
        }
    }

    /// Inventory of an owned character; `None` if not owned.
    pub async fn inventory(
        db: &Database,
        id: &str,
        user_id: &str,
    ) -> mongodb::error::Result<Option<Vec<InventoryItem>>> {
        Ok(Self::find_owned(db, id, user_id)
            .await?
            .map(|character| character.inventory))
    }

    /// Pull the item with `item_id` out of the inventory.
    ///
    /// Returns `true` if an item was removed.
    pub async fn remove_inventory_item(
        db: &Database,
        id: &str,
        user_id: &str,
        item_id: &str,
    ) -> mongodb::error::Result<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };
        let mut filter = owned(oid, user_id);
        filter.insert("inventory.id", item_id);
        let result = Self::collection(db)
            .update_one(
                filter,
                doc! {
                    "$pull": { "inventory": { "id": item_id } },
                    "$set": { "updated_at": bson::DateTime::now() },
                },
            )
            .await?;
        Ok(result.modified_count > 0)
    }
}
