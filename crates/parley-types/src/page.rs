//! Offset pagination and the composite session-with-events response.

use serde::{Deserialize, Serialize};

use crate::event::TimelineEntry;
use crate::session::SessionView;

/// Default page size when the caller does not supply one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// A 1-based page request. Callers validate `page >= 1` and `limit >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

/// Pagination summary returned alongside a page of events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    /// Build the summary for `total` records, with `total_pages = ceil(total / limit)`.
    pub fn new(total: u64, request: PageRequest) -> Self {
        let total_pages = if request.limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(request.limit))
        };
        Self {
            total,
            page: request.page,
            limit: request.limit,
            total_pages,
        }
    }
}

/// A session together with one page of its timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: SessionView,
    pub events: Vec<TimelineEntry>,
    pub pagination: Pagination,
}
