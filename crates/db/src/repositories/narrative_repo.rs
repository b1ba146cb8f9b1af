//! Repository for narrative memory: current turns, the archive and world lore.
//!
//! Embeddings are computed by the caller and stored next to the text.
//! Similarity search runs inside MongoDB through the `$vectorSearch` stage
//! over the indexes created by [`crate::ensure_vector_indexes`]; this module
//! only merges the per-collection results.

use std::collections::{BTreeMap, HashSet};

use bson::{doc, Bson, Document};
use chromance_core::lore::{self, LoreFact, WORLD_ID};
use chromance_core::ranking::{self, Scored, CURRENT_WEIGHT, LORE_WEIGHT};
use futures::TryStreamExt;
use mongodb::{Collection, Database};
use serde::Deserialize;

use crate::models::narrative::{
    ChapterSummary, LoreEntry, LoreSummary, MemoryCounts, MemoryHit, MemorySource,
    NarrativeEntry, NarrativeMetadata, NarrativeResponse, NewNarrative,
};
use crate::{
    LORE_VECTOR_INDEX, NARRATIVES_ARCHIVE, NARRATIVES_CURRENT, NARRATIVE_VECTOR_INDEX, WORLD_LORE,
};

/// Default page of [`NarrativeRepo::history`].
pub const DEFAULT_HISTORY_LIMIT: i64 = 20;

/// Upper bound of turns read for a chapter summary.
const SUMMARY_LIMIT: i64 = 100;

/// Prefix of archived turn ids.
const ARCHIVE_PREFIX: &str = "archive_";

/// Approximate-search candidates examined per requested result.
const CANDIDATES_PER_RESULT: usize = 20;

/// Server-side ceiling of `numCandidates`.
const MAX_CANDIDATES: usize = 10_000;

/// Filter on a user's turns in a campaign, optionally narrowed to a chapter.
fn scope(user_id: &str, campaign_id: &str, chapter: Option<i32>) -> Document {
    let mut filter = doc! {
        "metadata.user_id": user_id,
        "metadata.campaign_id": campaign_id,
    };
    if let Some(chapter) = chapter {
        filter.insert("metadata.chapter", chapter);
    }
    filter
}

/// [`scope`] in the `$eq` form accepted by the `$vectorSearch` pre-filter.
fn vector_scope(user_id: &str, campaign_id: &str, chapter: Option<i32>) -> Document {
    let clauses: Vec<Document> = scope(user_id, campaign_id, chapter)
        .into_iter()
        .map(|(field, value)| {
            let mut clause = Document::new();
            clause.insert(field, doc! { "$eq": value });
            clause
        })
        .collect();
    doc! { "$and": clauses }
}

/// A `$vectorSearch` stage followed by the projection read into [`VectorMatch`].
fn vector_pipeline(
    index: &str,
    vector: &[f32],
    filter: Document,
    limit: usize,
    chapter_path: &str,
) -> Vec<Document> {
    let query_vector: Vec<Bson> = vector.iter().map(|x| Bson::Double(f64::from(*x))).collect();
    let candidates = (limit * CANDIDATES_PER_RESULT).min(MAX_CANDIDATES).max(limit);
    vec![
        doc! {
            "$vectorSearch": {
                "index": index,
                "path": "embedding",
                "queryVector": query_vector,
                "numCandidates": candidates as i64,
                "limit": limit as i64,
                "filter": filter,
            }
        },
        doc! {
            "$project": {
                "_id": 1,
                "text": 1,
                "chapter": chapter_path,
                "score": { "$meta": "vectorSearchScore" },
            }
        },
    ]
}

/// One row of a `$vectorSearch` result.
#[derive(Debug, Deserialize)]
struct VectorMatch {
    #[serde(rename = "_id")]
    id: String,
    text: String,
    chapter: i32,
    score: f64,
}

impl VectorMatch {
    fn scored(self, source: MemorySource, weight: f64) -> Scored<MemoryHit> {
        let distance = ranking::cosine_distance_from_score(self.score);
        Scored {
            item: MemoryHit {
                id: self.id,
                text: self.text,
                source,
                distance,
                weight,
                chapter: self.chapter,
            },
            distance,
            weight,
        }
    }
}

async fn run_vector_search<T: Send + Sync>(
    collection: &Collection<T>,
    pipeline: Vec<Document>,
) -> mongodb::error::Result<Vec<VectorMatch>> {
    let rows: Vec<Document> = collection.aggregate(pipeline).await?.try_collect().await?;
    rows.into_iter()
        .map(|row| bson::from_document(row).map_err(Into::into))
        .collect()
}

/// Similarity search parameters.
#[derive(Debug, Clone)]
pub struct MemoryQuery<'a> {
    /// Embedding of the text to match.
    pub vector: &'a [f32],
    pub user_id: &'a str,
    pub campaign_id: &'a str,
    pub chapter: Option<i32>,
    pub limit: usize,
    pub include_lore: bool,
}

/// Provides the narrative memory store.
pub struct NarrativeRepo;

impl NarrativeRepo {
    fn current(db: &Database) -> Collection<NarrativeEntry> {
        db.collection(NARRATIVES_CURRENT)
    }

    fn archive(db: &Database) -> Collection<NarrativeEntry> {
        db.collection(NARRATIVES_ARCHIVE)
    }

    fn lore(db: &Database) -> Collection<LoreEntry> {
        db.collection(WORLD_LORE)
    }

    // -- Current narratives ---------------------------------------------------

    /// Store one narrator turn.
    ///
    /// A turn stored without an embedding is kept for history and summaries
    /// but never matched by [`Self::search`].
    pub async fn store(
        db: &Database,
        input: &NewNarrative,
        embedding: Option<Vec<f32>>,
    ) -> mongodb::error::Result<NarrativeEntry> {
        let entry = NarrativeEntry {
            id: uuid::Uuid::now_v7().simple().to_string(),
            text: input.text.clone(),
            metadata: NarrativeMetadata {
                campaign_id: input.campaign_id.clone(),
                character_id: input.character_id.clone(),
                user_id: input.user_id.clone(),
                chapter: input.chapter,
                phase: input.phase,
                interaction_count: input.interaction_count,
                world_id: WORLD_ID.to_string(),
            },
            embedding: embedding.unwrap_or_default(),
            timestamp: bson::DateTime::now(),
            archived_at: None,
        };
        Self::current(db).insert_one(&entry).await?;
        tracing::debug!(
            narrative_id = %entry.id,
            campaign_id = %input.campaign_id,
            chapter = input.chapter,
            embedded = !entry.embedding.is_empty(),
            "Narrative stored"
        );
        Ok(entry)
    }

    /// Retrieve the memories nearest to `query.vector`.
    ///
    /// Current turns of the scope are ranked together with world lore, which
    /// is weighted by [`LORE_WEIGHT`].
    pub async fn search(
        db: &Database,
        query: &MemoryQuery<'_>,
    ) -> mongodb::error::Result<Vec<MemoryHit>> {
        if query.limit == 0 || query.vector.is_empty() {
            return Ok(Vec::new());
        }

        let pipeline = vector_pipeline(
            NARRATIVE_VECTOR_INDEX,
            query.vector,
            vector_scope(query.user_id, query.campaign_id, query.chapter),
            query.limit,
            "$metadata.chapter",
        );
        let mut hits: Vec<Scored<MemoryHit>> = run_vector_search(&Self::current(db), pipeline)
            .await?
            .into_iter()
            .map(|m| m.scored(MemorySource::Current, CURRENT_WEIGHT))
            .collect();
        let current_count = hits.len();

        if query.include_lore {
            let pipeline = vector_pipeline(
                LORE_VECTOR_INDEX,
                query.vector,
                doc! { "world_id": { "$eq": WORLD_ID } },
                (query.limit / 2).max(2),
                "$chapter_discovered",
            );
            hits.extend(
                run_vector_search(&Self::lore(db), pipeline)
                    .await?
                    .into_iter()
                    .map(|m| m.scored(MemorySource::Lore, LORE_WEIGHT)),
            );
        }

        let ranked = ranking::rank_weighted(hits, query.limit);
        tracing::debug!(
            current = current_count,
            returned = ranked.len(),
            "Memory search complete"
        );
        Ok(ranked.into_iter().map(|scored| scored.item).collect())
    }

    /// Turns of a campaign in chronological order.
    pub async fn history(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: Option<i32>,
        limit: i64,
    ) -> mongodb::error::Result<Vec<NarrativeEntry>> {
        Self::current(db)
            .find(scope(user_id, campaign_id, chapter))
            .sort(doc! { "timestamp": 1, "_id": 1 })
            .limit(limit.max(1))
            .await?
            .try_collect()
            .await
    }

    /// Turn counts per phase for one chapter, with the turns themselves.
    pub async fn chapter_summary(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: i32,
    ) -> mongodb::error::Result<ChapterSummary> {
        let turns = Self::history(db, user_id, campaign_id, Some(chapter), SUMMARY_LIMIT).await?;

        let mut phases: BTreeMap<String, usize> = BTreeMap::new();
        for turn in &turns {
            *phases
                .entry(turn.metadata.phase.as_str().to_string())
                .or_default() += 1;
        }

        Ok(ChapterSummary {
            chapter,
            total_interactions: turns.len(),
            phases,
            narratives: turns.iter().map(NarrativeResponse::from).collect(),
        })
    }

    /// Copy a chapter's turns into the archive. Returns the number archived.
    ///
    /// Archived ids are the original ids prefixed with `archive_`, so archiving
    /// the same chapter twice overwrites instead of duplicating.
    pub async fn archive_chapter(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: i32,
    ) -> mongodb::error::Result<u64> {
        let turns: Vec<NarrativeEntry> = Self::current(db)
            .find(scope(user_id, campaign_id, Some(chapter)))
            .await?
            .try_collect()
            .await?;

        let archived_at = bson::DateTime::now();
        let archive = Self::archive(db);
        for turn in &turns {
            let entry = NarrativeEntry {
                id: format!("{ARCHIVE_PREFIX}{}", turn.id),
                archived_at: Some(archived_at),
                ..turn.clone()
            };
            archive
                .replace_one(doc! { "_id": entry.id.as_str() }, &entry)
                .upsert(true)
                .await?;
        }

        tracing::info!(campaign_id, chapter, archived = turns.len(), "Chapter archived");
        Ok(turns.len() as u64)
    }

    /// Delete a chapter's turns from the current collection.
    pub async fn clear_chapter(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
        chapter: i32,
    ) -> mongodb::error::Result<u64> {
        let result = Self::current(db)
            .delete_many(scope(user_id, campaign_id, Some(chapter)))
            .await?;
        Ok(result.deleted_count)
    }

    /// Delete every current turn of a campaign. Archive and lore are kept.
    pub async fn clear_campaign(
        db: &Database,
        user_id: &str,
        campaign_id: &str,
    ) -> mongodb::error::Result<u64> {
        let result = Self::current(db)
            .delete_many(scope(user_id, campaign_id, None))
            .await?;
        tracing::info!(campaign_id, deleted = result.deleted_count, "Current narratives cleared");
        Ok(result.deleted_count)
    }

    // -- World lore -------------------------------------------------------------

    /// Facts revealed by `chapter` that are not stored yet, or were stored
    /// without an embedding.
    pub async fn pending_lore(
        db: &Database,
        chapter: i32,
    ) -> mongodb::error::Result<Vec<&'static LoreFact>> {
        let facts = lore::chapter_lore(chapter);
        let ids: Vec<String> = facts
            .iter()
            .map(|f| lore::lore_id(f.text, f.lore_type, chapter))
            .collect();

        let complete: HashSet<String> = Self::lore(db)
            .clone_with_type::<Document>()
            .find(doc! { "_id": { "$in": ids.clone() }, "embedding.0": { "$exists": true } })
            .projection(doc! { "_id": 1 })
            .await?
            .try_collect::<Vec<Document>>()
            .await?
            .iter()
            .filter_map(|row| row.get_str("_id").ok().map(str::to_string))
            .collect();

        Ok(facts
            .into_iter()
            .zip(ids)
            .filter(|(_, id)| !complete.contains(id))
            .map(|(fact, _)| fact)
            .collect())
    }

    /// Store a lore fact unless an identical one exists. A given embedding
    /// is written even when the fact already exists.
    ///
    /// Returns `true` if the fact was new.
    pub async fn save_lore(
        db: &Database,
        fact: &LoreFact,
        chapter: i32,
        campaign_id: &str,
        embedding: Option<Vec<f32>>,
    ) -> mongodb::error::Result<bool> {
        let entry = LoreEntry {
            id: lore::lore_id(fact.text, fact.lore_type, chapter),
            text: fact.text.to_string(),
            lore_type: fact.lore_type,
            chapter_discovered: chapter,
            campaign_id: campaign_id.to_string(),
            world_id: WORLD_ID.to_string(),
            importance: fact.importance,
            tags: fact
                .tags
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            embedding: Vec::new(),
            timestamp: bson::DateTime::now(),
        };

        let mut fields = bson::to_document(&entry)?;
        fields.remove("_id");
        let mut update = doc! { "$setOnInsert": fields };
        if let Some(embedding) = embedding {
            update.insert("$set", doc! { "embedding": embedding });
        }
        let result = Self::lore(db)
            .update_one(doc! { "_id": entry.id.as_str() }, update)
            .upsert(true)
            .await?;
        Ok(result.upserted_id.is_some())
    }

    /// Record the lore revealed by finishing `chapter`, each fact with its
    /// embedding if one was computed. Returns the number of new facts.
    pub async fn save_chapter_lore(
        db: &Database,
        campaign_id: &str,
        chapter: i32,
        facts: Vec<(&LoreFact, Option<Vec<f32>>)>,
    ) -> mongodb::error::Result<usize> {
        let mut saved = 0;
        for (fact, embedding) in facts {
            if Self::save_lore(db, fact, chapter, campaign_id, embedding).await? {
                saved += 1;
            }
        }
        tracing::info!(campaign_id, chapter, saved, "Chapter lore extracted");
        Ok(saved)
    }

    /// Totals of the accumulated lore by type and by chapter.
    pub async fn lore_summary(db: &Database) -> mongodb::error::Result<LoreSummary> {
        let facts: Vec<LoreEntry> = Self::lore(db)
            .find(doc! { "world_id": WORLD_ID })
            .await?
            .try_collect()
            .await?;

        let mut summary = LoreSummary {
            total_items: facts.len() as u64,
            ..Default::default()
        };
        for fact in &facts {
            *summary
                .by_type
                .entry(fact.lore_type.as_str().to_string())
                .or_default() += 1;
            *summary.by_chapter.entry(fact.chapter_discovered).or_default() += 1;
        }
        Ok(summary)
    }

    /// Document counts of the three memory collections.
    pub async fn counts(db: &Database) -> mongodb::error::Result<MemoryCounts> {
        Ok(MemoryCounts {
            current: Self::current(db).count_documents(doc! {}).await?,
            archive: Self::archive(db).count_documents(doc! {}).await?,
            lore: Self::lore(db).count_documents(doc! {}).await?,
        })
    }
}
