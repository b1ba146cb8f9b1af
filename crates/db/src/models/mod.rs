//! Storage documents and DTOs.
//!
//! Each submodule contains:
//! - A `Serialize` + `Deserialize` document struct matching the stored shape
//!   (`_id` as `ObjectId`, timestamps as `bson::DateTime`)
//! - A `Serialize` response struct for the API (hex ids, RFC 3339 timestamps)
//! - `Deserialize` create/update DTOs where the resource is writable

pub mod campaign;
pub mod campaign_progress;
pub mod character;
pub mod narrative;
pub mod user;
