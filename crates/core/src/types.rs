/// Entity identifiers travel through the API as hex strings (MongoDB ObjectIds).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
