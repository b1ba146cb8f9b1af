//! Page-based pagination (`?page=&limit=`).

use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A validated page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    /// Clamp user input: page to at least 1, limit to `1..=MAX_PAGE_LIMIT`.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    /// Number of records to skip. Saturates instead of overflowing on huge
    /// page numbers.
    pub fn skip(&self) -> u64 {
        let skip = (self.page.max(1) - 1).saturating_mul(self.limit.max(0));
        skip as u64
    }

    /// Total number of pages for `total` records (`ceil(total / limit)`).
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.limit as u64)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}
