//! Narrative memory on behalf of the narrator.
//!
//! Text is embedded through the configured [`Embedder`](chromance_llm::Embedder)
//! before it reaches [`NarrativeRepo`]. The memory is best effort: a failed
//! embedding stores the text without a vector, and a failed recall yields no
//! memories, so neither ever fails a turn.

use chromance_db::models::narrative::NewNarrative;
use chromance_db::repositories::narrative_repo::MemoryQuery;
use chromance_db::repositories::NarrativeRepo;

use crate::error::AppResult;
use crate::state::AppState;

/// Embed `text`, or `None` (logged) when the provider fails.
async fn embed(state: &AppState, text: &str) -> Option<Vec<f32>> {
    match state.embedder.embed_one(text).await {
        Ok(vector) => Some(vector),
        Err(err) => {
            tracing::warn!(error = %err, "Embedding failed");
            None
        }
    }
}

/// Texts of the memories nearest to `message` in a chapter, lore included.
pub async fn recall(
    state: &AppState,
    user_id: &str,
    campaign_id: &str,
    chapter: i32,
    message: &str,
    limit: usize,
) -> Vec<String> {
    let Some(vector) = embed(state, message).await else {
        return Vec::new();
    };
    let query = MemoryQuery {
        vector: &vector,
        user_id,
        campaign_id,
        chapter: Some(chapter),
        limit,
        include_lore: true,
    };
    match NarrativeRepo::search(&state.db, &query).await {
        Ok(hits) => hits.into_iter().map(|h| h.text).collect(),
        Err(err) => {
            tracing::warn!(error = %err, user_id, campaign_id, "Memory retrieval failed");
            Vec::new()
        }
    }
}

/// Store a narrator turn with its embedding. Failures are logged.
pub async fn remember(state: &AppState, entry: &NewNarrative) {
    let embedding = embed(state, &entry.text).await;
    if let Err(err) = NarrativeRepo::store(&state.db, entry, embedding).await {
        tracing::warn!(
            error = %err,
            user_id = %entry.user_id,
            campaign_id = %entry.campaign_id,
            "Failed to store narrative"
        );
    }
}

/// Record the lore revealed by finishing `chapter`. Facts already stored
/// with an embedding are skipped; the rest are embedded in one batch.
///
/// Returns the number of new facts.
pub async fn record_chapter_lore(
    state: &AppState,
    campaign_id: &str,
    chapter: i32,
) -> AppResult<usize> {
    let facts = NarrativeRepo::pending_lore(&state.db, chapter).await?;
    if facts.is_empty() {
        return Ok(0);
    }

    let texts: Vec<String> = facts.iter().map(|f| f.text.to_string()).collect();
    let vectors: Vec<Option<Vec<f32>>> = match state.embedder.embed(&texts).await {
        Ok(vectors) => vectors.into_iter().map(Some).collect(),
        Err(err) => {
            tracing::warn!(error = %err, campaign_id, chapter, "Lore embedding failed");
            vec![None; facts.len()]
        }
    };

    let saved = NarrativeRepo::save_chapter_lore(
        &state.db,
        campaign_id,
        chapter,
        facts.into_iter().zip(vectors).collect(),
    )
    .await?;
    Ok(saved)
}
