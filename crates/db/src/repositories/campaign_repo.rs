//! Repository for the global `campaigns` collection.

use bson::doc;
use chromance_core::campaigns::CampaignSeed;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use crate::models::campaign::Campaign;
use crate::CAMPAIGNS;

/// Provides read access to base campaigns and the seed operation.
pub struct CampaignRepo;

impl CampaignRepo {
    fn collection(db: &Database) -> Collection<Campaign> {
        db.collection(CAMPAIGNS)
    }

    /// All base campaigns ordered by chapter.
    pub async fn list_base(db: &Database) -> mongodb::error::Result<Vec<Campaign>> {
        Self::collection(db)
            .find(doc! {})
            .sort(doc! { "chapter": 1 })
            .await?
            .try_collect()
            .await
    }

    /// Find a base campaign by slug.
    pub async fn find_by_slug(
        db: &Database,
        campaign_id: &str,
    ) -> mongodb::error::Result<Option<Campaign>> {
        Self::collection(db)
            .find_one(doc! { "campaign_id": campaign_id })
            .await
    }

    /// Replace every base campaign with `seeds`. User progress is untouched.
    pub async fn replace_base(
        db: &Database,
        seeds: &[CampaignSeed],
    ) -> mongodb::error::Result<Vec<Campaign>> {
        let now = bson::DateTime::now();
        let campaigns: Vec<Campaign> = seeds.iter().map(|s| Campaign::from_seed(s, now)).collect();

        let collection = Self::collection(db);
        let removed = collection.delete_many(doc! {}).await?;
        if !campaigns.is_empty() {
            collection.insert_many(&campaigns).await?;
        }
        tracing::info!(
            removed = removed.deleted_count,
            inserted = campaigns.len(),
            "Base campaigns seeded"
        );
        Ok(campaigns)
    }

    /// Seed `seeds` only when the collection is empty.
    ///
    /// Returns `true` if seeding happened.
    pub async fn ensure_seeded(db: &Database, seeds: &[CampaignSeed]) -> mongodb::error::Result<bool> {
        let count = Self::collection(db).count_documents(doc! {}).await?;
        if count > 0 {
            return Ok(false);
        }
        Self::replace_base(db, seeds).await?;
        Ok(true)
    }
}
