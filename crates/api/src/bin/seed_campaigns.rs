//! Replace the base campaigns with the built-in set.
//!
//! Reads `MONGO_URI` and `MONGO_DB` like the server does. User progress is
//! left untouched.

use anyhow::Context;
use chromance_core::campaigns::base_campaigns;
use chromance_db::repositories::CampaignRepo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chromance_db=info,seed_campaigns=info".into()),
        )
        .init();

    let uri = std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".into());
    let db_name = std::env::var("MONGO_DB").unwrap_or_else(|_| "rpgdb".into());

    let db = chromance_db::connect(&uri, &db_name)
        .await
        .with_context(|| format!("connecting to {uri}"))?;
    chromance_db::health_check(&db)
        .await
        .context("MongoDB did not answer ping")?;
    chromance_db::ensure_indexes(&db).await?;

    let campaigns = CampaignRepo::replace_base(&db, base_campaigns())
        .await
        .context("replacing base campaigns")?;
    for campaign in &campaigns {
        tracing::info!(
            campaign_id = %campaign.campaign_id,
            chapter = campaign.chapter,
            title = %campaign.title,
            "Seeded campaign"
        );
    }
    Ok(())
}
