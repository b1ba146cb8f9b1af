//! Shared query parameter types for API handlers.

use chromance_core::pagination::Page;
use serde::Deserialize;

/// Page-based pagination parameters (`?page=&limit=`).
///
/// Values are clamped by [`Page::new`].
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Parameters of the narrative history endpoint (`?chapter=&limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub chapter: Option<i32>,
    pub limit: Option<i64>,
}
