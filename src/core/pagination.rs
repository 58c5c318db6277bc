//! Page-based listing helpers shared by paginated queries.

use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u64 = 20;
const MAX_PER_PAGE: u64 = 100;

/// Query parameters for a paginated listing. Pages are 1-based.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageRequest {
    /// Requested page, defaults to 1
    pub page: Option<u64>,
    /// Items per page, defaults to 20 and is capped at 100
    pub per_page: Option<u64>,
}

impl PageRequest {
    /// 1-based page number.
    #[must_use]
    pub fn page(self) -> u64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Page size within `1..=100`.
    #[must_use]
    pub fn per_page(self) -> u64 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// 1-based page number
    pub page: u64,
    /// Page size used
    pub per_page: u64,
    /// Total number of items across all pages
    pub total: u64,
}
