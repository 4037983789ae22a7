//! Pagination types for list queries over fact rows.

use serde::{Deserialize, Serialize};

/// Upper bound on rows returned by a single page.
pub const MAX_PER_PAGE: u32 = 500;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of rows per page, clamped to [`MAX_PER_PAGE`].
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    100
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PageRequest {
    /// Creates a request for the given page and page size.
    #[must_use]
    pub const fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Zero-based page index, as expected by SeaORM paginators.
    #[must_use]
    pub fn index(&self) -> u64 {
        u64::from(self.page.saturating_sub(1))
    }

    /// Effective page size after clamping.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page.clamp(1, MAX_PER_PAGE))
    }

    /// Row offset of the first item on this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.index() * self.limit()
    }
}

/// Response wrapper for paginated data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// The rows on the current page.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PageMeta,
}

/// Pagination metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Current page number.
    pub page: u32,
    /// Rows per page.
    pub per_page: u64,
    /// Total number of rows across all pages.
    pub total: u64,
    /// Total number of pages (at least 1).
    pub total_pages: u64,
}

impl<T> PageResponse<T> {
    /// Creates a paginated response for `request` out of `total` rows.
    #[must_use]
    pub fn new(data: Vec<T>, request: PageRequest, total: u64) -> Self {
        let per_page = request.limit();
        let total_pages = total.div_ceil(per_page).max(1);

        Self {
            data,
            meta: PageMeta {
                page: request.page,
                per_page,
                total,
                total_pages,
            },
        }
    }
}
