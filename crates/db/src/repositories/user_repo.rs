//! Repository for the `users` collection.

use bson::doc;
use bson::oid::ObjectId;
use mongodb::{Collection, Database};

use crate::models::user::{CreateUser, User};
use crate::{parse_object_id, USERS};

/// Provides create and lookup operations for users.
pub struct UserRepo;

impl UserRepo {
    fn collection(db: &Database) -> Collection<User> {
        db.collection(USERS)
    }

    /// Insert a new user, returning the stored document.
    ///
    /// A duplicate email fails with a duplicate key error
    /// (see [`crate::is_duplicate_key`]).
    pub async fn create(db: &Database, input: &CreateUser) -> mongodb::error::Result<User> {
        let now = bson::DateTime::now();
        let user = User {
            id: ObjectId::new(),
            name: input.name.clone(),
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            active: true,
            created_at: now,
            updated_at: now,
        };
        Self::collection(db).insert_one(&user).await?;
        Ok(user)
    }

    /// Find a user by hex id. Malformed ids yield `None`.
    pub async fn find_by_id(db: &Database, id: &str) -> mongodb::error::Result<Option<User>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        Self::collection(db).find_one(doc! { "_id": oid }).await
    }

    /// Find a user by (already normalized) email.
    pub async fn find_by_email(db: &Database, email: &str) -> mongodb::error::Result<Option<User>> {
        Self::collection(db).find_one(doc! { "email": email }).await
    }

    /// Activate or deactivate an account. Returns `false` if no user has `id`.
    pub async fn set_active(db: &Database, id: &str, active: bool) -> mongodb::error::Result<bool> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(false);
        };
        let result = Self::collection(db)
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "active": active, "updated_at": bson::DateTime::now() } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }
}
