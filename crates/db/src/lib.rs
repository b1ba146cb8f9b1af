//! MongoDB persistence for the Chromance backend.
//!
//! - [`models`]: storage documents plus the response DTOs handed to the API
//! - [`repositories`]: zero-sized repository structs taking `&Database`
//!
//! Connection setup, index bootstrap (including the `$vectorSearch` indexes of
//! the narrative memory) and the health ping live here.

use bson::doc;
use bson::oid::ObjectId;
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Database, IndexModel};

pub mod models;
pub mod repositories;

/// Shared handle to the application database. Cheap to clone.
pub type DbPool = Database;

// ---------------------------------------------------------------------------
// Collection names
// ---------------------------------------------------------------------------

pub const USERS: &str = "users";
pub const CHARACTERS: &str = "characters";
pub const CAMPAIGNS: &str = "campaigns";
pub const CAMPAIGN_PROGRESS: &str = "campaign_progress";
pub const NARRATIVES_CURRENT: &str = "narratives_current";
pub const NARRATIVES_ARCHIVE: &str = "narratives_archive";
pub const WORLD_LORE: &str = "world_lore";

/// `$vectorSearch` index over `narratives_current.embedding`.
pub const NARRATIVE_VECTOR_INDEX: &str = "narratives_embedding";
/// `$vectorSearch` index over `world_lore.embedding`.
pub const LORE_VECTOR_INDEX: &str = "world_lore_embedding";

/// Server error code for unique index violations.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Build a client for `uri` and select `db_name`.
///
/// The driver connects lazily; use [`health_check`] to verify reachability.
pub async fn connect(uri: &str, db_name: &str) -> mongodb::error::Result<DbPool> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database(db_name))
}

/// Round-trip a `ping` command.
pub async fn health_check(db: &DbPool) -> mongodb::error::Result<()> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}

fn index(keys: bson::Document, unique: bool) -> IndexModel {
    let options = IndexOptions::builder().unique(unique.then_some(true)).build();
    IndexModel::builder().keys(keys).options(options).build()
}

/// Create every index the repositories rely on. Idempotent.
pub async fn ensure_indexes(db: &DbPool) -> mongodb::error::Result<()> {
    let plan: [(&str, Vec<IndexModel>); 7] = [
        (USERS, vec![index(doc! { "email": 1 }, true)]),
        (
            CHARACTERS,
            vec![
                index(doc! { "user_id": 1 }, false),
                index(doc! { "user_id": 1, "active": -1 }, false),
                index(doc! { "user_id": 1, "is_selected": -1 }, false),
            ],
        ),
        (CAMPAIGNS, vec![index(doc! { "campaign_id": 1 }, true)]),
        (
            CAMPAIGN_PROGRESS,
            vec![
                index(doc! { "user_id": 1, "campaign_id": 1 }, true),
                index(doc! { "user_id": 1, "status": 1 }, false),
            ],
        ),
        (
            NARRATIVES_CURRENT,
            vec![index(doc! { "metadata.campaign_id": 1, "metadata.chapter": 1 }, false)],
        ),
        (
            NARRATIVES_ARCHIVE,
            vec![index(doc! { "metadata.campaign_id": 1, "metadata.chapter": 1 }, false)],
        ),
        (WORLD_LORE, vec![index(doc! { "world_id": 1, "lore_type": 1 }, false)]),
    ];

    for (collection, models) in plan {
        db.collection::<bson::Document>(collection)
            .create_indexes(models)
            .await?;
    }
    tracing::info!("MongoDB indexes ensured");
    Ok(())
}

/// Collections carrying a vector index, with the index name and the fields
/// `$vectorSearch` may pre-filter on.
const VECTOR_INDEXES: [(&str, &str, &[&str]); 2] = [
    (
        NARRATIVES_CURRENT,
        NARRATIVE_VECTOR_INDEX,
        &["metadata.user_id", "metadata.campaign_id", "metadata.chapter"],
    ),
    (WORLD_LORE, LORE_VECTOR_INDEX, &["world_id"]),
];

fn vector_index_definition(dimensions: usize, filters: &[&str]) -> bson::Document {
    let mut fields = vec![doc! {
        "type": "vector",
        "path": "embedding",
        "numDimensions": dimensions as i64,
        "similarity": "cosine",
    }];
    fields.extend(filters.iter().map(|path| doc! { "type": "filter", "path": *path }));
    doc! { "fields": fields }
}

/// Search index documents named `name` on `collection`, as listed by
/// `$listSearchIndexes`.
async fn search_indexes(
    db: &DbPool,
    collection: &str,
    name: &str,
) -> mongodb::error::Result<Vec<bson::Document>> {
    db.collection::<bson::Document>(collection)
        .aggregate(vec![doc! { "$listSearchIndexes": { "name": name } }])
        .await?
        .try_collect()
        .await
}

/// Create the `$vectorSearch` indexes for `dimensions`-long embeddings.
/// Idempotent; an existing index is left untouched.
///
/// Needs a deployment with search support (Atlas or `mongot`). Run after
/// [`ensure_indexes`], which creates the collections.
pub async fn ensure_vector_indexes(db: &DbPool, dimensions: usize) -> mongodb::error::Result<()> {
    for (collection, name, filters) in VECTOR_INDEXES {
        if !search_indexes(db, collection, name).await?.is_empty() {
            continue;
        }
        db.run_command(doc! {
            "createSearchIndexes": collection,
            "indexes": [{
                "name": name,
                "type": "vectorSearch",
                "definition": vector_index_definition(dimensions, filters),
            }],
        })
        .await?;
        tracing::info!(collection, index = name, dimensions, "Vector search index created");
    }
    Ok(())
}

/// Whether every vector index exists and accepts queries. Newly created
/// indexes take a while to build.
pub async fn vector_indexes_ready(db: &DbPool) -> mongodb::error::Result<bool> {
    for (collection, name, _) in VECTOR_INDEXES {
        let indexes = search_indexes(db, collection, name).await?;
        let queryable = indexes
            .iter()
            .any(|index| index.get_bool("queryable").unwrap_or(false));
        if !queryable {
            return Ok(false);
        }
    }
    Ok(true)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Whether `err` is a unique index violation.
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Parse a hex ObjectId. Malformed ids behave like ids that match nothing.
pub fn parse_object_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}
