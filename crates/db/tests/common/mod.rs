#![allow(dead_code)]

//! Shared helpers for repository integration tests.
//!
//! Tests run against the MongoDB instance at `MONGO_TEST_URI`, each in its own
//! throwaway database. When the variable is unset the tests return early.
//! Similarity search needs a deployment with vector search (for example the
//! `mongodb/mongodb-atlas-local` image) at `MONGO_VECTOR_TEST_URI`.

use std::time::Duration;

use chromance_core::validation::Attributes;
use chromance_db::models::character::CreateCharacter;
use mongodb::Database;

/// Connect to a fresh database, or `None` when `MONGO_TEST_URI` is unset.
pub async fn test_db() -> Option<Database> {
    let uri = std::env::var("MONGO_TEST_URI").ok()?;
    let name = format!("chromance_test_{}", uuid::Uuid::new_v4().simple());
    let db = chromance_db::connect(&uri, &name)
        .await
        .expect("connect to test MongoDB");
    chromance_db::ensure_indexes(&db)
        .await
        .expect("create indexes");
    Some(db)
}

/// Dimensions of the hand-written vectors used by the search tests.
pub const TEST_DIMENSIONS: usize = 4;

/// Like [`test_db`] with queryable vector indexes, or `None` when
/// `MONGO_VECTOR_TEST_URI` is unset.
pub async fn vector_test_db() -> Option<Database> {
    let uri = std::env::var("MONGO_VECTOR_TEST_URI").ok()?;
    let name = format!("chromance_vector_test_{}", uuid::Uuid::new_v4().simple());
    let db = chromance_db::connect(&uri, &name)
        .await
        .expect("connect to vector test MongoDB");
    chromance_db::ensure_indexes(&db)
        .await
        .expect("create indexes");
    chromance_db::ensure_vector_indexes(&db, TEST_DIMENSIONS)
        .await
        .expect("create vector indexes");

    for _ in 0..120 {
        if chromance_db::vector_indexes_ready(&db).await.expect("list search indexes") {
            return Some(db);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("vector indexes never became queryable");
}

/// Poll `check` until it returns `Some`, for reads of the eventually
/// consistent search index.
pub async fn eventually<T, F, Fut>(mut check: F) -> T
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Option<T>>,
{
    for _ in 0..60 {
        if let Some(value) = check().await {
            return value;
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    panic!("search index never caught up");
}

/// Drop the throwaway database.
pub async fn teardown(db: Database) {
    db.drop().await.expect("drop test database");
}

pub fn new_character(name: &str) -> CreateCharacter {
    CreateCharacter {
        name: name.to_string(),
        race: "Humano".to_string(),
        class: "Netrunner".to_string(),
        description: None,
        attributes: Attributes {
            strength: 6,
            dexterity: 12,
            intelligence: 16,
            charisma: 11,
        },
        faction: None,
        cyberware: None,
        image_url: None,
    }
}
