//! Repository for the `campaign_progress` collection.

use bson::oid::ObjectId;
use bson::{doc, Document};
use chromance_core::combat::CombatOutcome;
use chromance_core::progression::NarrativePhase;
use futures::TryStreamExt;
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::models::campaign_progress::{CampaignProgress, ProgressStatus, StartProgress};
use crate::CAMPAIGN_PROGRESS;

fn key(user_id: &str, campaign_id: &str) -> Document {
    doc! { "user_id": user_id, "campaign_id": campaign_id }
}

fn in_progress(user_id: &str, campaign_id: &str) -> Document {
    let mut filter = key(user_id, campaign_id);
    filter.insert("status", ProgressStatus::InProgress.as_str());
    filter
}

/// Tracks each user's run through each campaign.
pub struct ProgressRepo;

impl ProgressRepo {
    fn collection(db: &Database) -> Collection<CampaignProgress> {
        db.collection(CAMPAIGN_PROGRESS)
    }

    /// Progress of `user_id` in `campaign_id`, whatever its status.
    pub async fn find(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        Self::collection(db).find_one(key(user_id, campaign_id)).await
    }

    /// Every progress record of `user_id`.
    pub async fn list_for_user(
        db: &Database,
        user_id: &str,
    ) -> mongodb::error::Result<Vec<CampaignProgress>> {
        Self::collection(db)
            .find(doc! { "user_id": user_id })
            .await?
            .try_collect()
            .await
    }

    /// The single in-progress record of `user_id`, if any.
    pub async fn find_active(
        db: &Database,
        user_id: &str,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        Self::collection(db)
            .find_one(doc! {
                "user_id": user_id,
                "status": ProgressStatus::InProgress.as_str(),
            })
            .sort(doc! { "last_played_at": -1 })
            .await
    }

    /// Start (or restart) a campaign.
    ///
    /// Any other in-progress campaign of the user is cancelled first, then the
    /// record for this campaign is reset to a fresh run.
    pub async fn start(
        db: &Database,
        input: &StartProgress,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        let now = bson::DateTime::now();
        let collection = Self::collection(db);

        let cancelled = collection
            .update_many(
                doc! {
                    "user_id": input.user_id.as_str(),
                    "campaign_id": { "$ne": input.campaign_id.as_str() },
                    "status": ProgressStatus::InProgress.as_str(),
                },
                doc! { "$set": {
                    "status": ProgressStatus::Cancelled.as_str(),
                    "cancelled_at": now,
                } },
            )
            .await?;
        if cancelled.modified_count > 0 {
            tracing::info!(
                user_id = %input.user_id,
                cancelled = cancelled.modified_count,
                "Cancelled previous in-progress campaigns"
            );
        }

        collection
            .find_one_and_update(
                key(&input.user_id, &input.campaign_id),
                doc! {
                    "$set": {
                        "status": ProgressStatus::InProgress.as_str(),
                        "active_character_id": input.character_id.as_str(),
                        "active_character_name": input.character_name.as_str(),
                        "current_chapter": input.chapter,
                        "chapters_completed": [],
                        "score": 0,
                        "battles_won": 0,
                        "battles_lost": 0,
                        "items_collected": [],
                        "interaction_count": 0,
                        "phase": NarrativePhase::Introduction.as_str(),
                        "started_at": now,
                        "last_played_at": now,
                        "completed_at": null,
                        "cancelled_at": null,
                    },
                    "$setOnInsert": { "_id": ObjectId::new() },
                },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await
    }

    /// Record a completed chapter of an in-progress campaign and move to the
    /// next one. `None` if the campaign is not in progress.
    pub async fn complete_chapter(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: i32,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        Self::collection(db)
            .find_one_and_update(
                in_progress(user_id, campaign_id),
                doc! {
                    "$addToSet": { "chapters_completed": chapter },
                    "$set": {
                        "current_chapter": chapter + 1,
                        "last_played_at": bson::DateTime::now(),
                    },
                },
            )
            .return_document(ReturnDocument::After)
            .await
    }

    /// Cancel an in-progress campaign.
    ///
    /// Returns `false` if there was no in-progress record to cancel.
    pub async fn cancel(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
    ) -> mongodb::error::Result<bool> {
        let result = Self::collection(db)
            .update_one(
                in_progress(user_id, campaign_id),
                doc! { "$set": {
                    "status": ProgressStatus::Cancelled.as_str(),
                    "cancelled_at": bson::DateTime::now(),
                } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    /// Count a battle and apply its score delta.
    pub async fn record_battle(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        outcome: CombatOutcome,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        let counter = if outcome.is_win() {
            "battles_won"
        } else {
            "battles_lost"
        };
        let mut inc = doc! { "score": outcome.score_delta() };
        inc.insert(counter, 1);
        Self::collection(db)
            .find_one_and_update(
                key(user_id, campaign_id),
                doc! {
                    "$inc": inc,
                    "$set": { "last_played_at": bson::DateTime::now() },
                },
            )
            .return_document(ReturnDocument::After)
            .await
    }

    /// Count one narrator turn and store the phase it was played in.
    ///
    /// The counter is incremented server-side, so concurrent turns are all
    /// counted.
    pub async fn record_interaction(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        phase: NarrativePhase,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        Self::collection(db)
            .find_one_and_update(
                in_progress(user_id, campaign_id),
                doc! {
                    "$inc": { "interaction_count": 1 },
                    "$set": {
                        "phase": phase.as_str(),
                        "last_played_at": bson::DateTime::now(),
                    },
                },
            )
            .return_document(ReturnDocument::After)
            .await
    }

    /// Close the campaign after its chapter reward was delivered.
    pub async fn finish_chapter(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: i32,
        item_id: Option<&str>,
    ) -> mongodb::error::Result<Option<CampaignProgress>> {
        let now = bson::DateTime::now();
        let mut add = doc! { "chapters_completed": chapter };
        if let Some(item_id) = item_id {
            add.insert("items_collected", item_id);
        }

        Self::collection(db)
            .find_one_and_update(
                in_progress(user_id, campaign_id),
                doc! {
                    "$addToSet": add,
                    "$set": {
                        "status": ProgressStatus::Completed.as_str(),
                        "current_chapter": chapter + 1,
                        "completed_at": now,
                        "last_played_at": now,
                    },
                },
            )
            .return_document(ReturnDocument::After)
            .await
    }
}
