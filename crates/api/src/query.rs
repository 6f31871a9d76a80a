//! Shared query parameter types for API handlers.

use bookshelf_core::pagination::{clamp_limit, clamp_page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;

/// Page-based pagination (`?page=&limit=`).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    /// `(page, limit)` clamped to valid ranges.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_page(self.page),
            clamp_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
        )
    }
}
