//! Page arithmetic shared by the query layer and the table controller.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Rows per page when the caller does not choose.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Page metadata returned alongside every page of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl PaginationInfo {
    /// Derive page metadata from a 1-based page, page size, and exact total.
    ///
    /// An empty result has zero pages.
    pub fn compute(page: i64, limit: i64, total_items: i64) -> Self {
        let limit = limit.max(1);
        let total_items = total_items.max(0);
        let total_pages = (total_items + limit - 1) / limit;
        Self {
            current_page: page,
            total_pages,
            total_items,
            items_per_page: limit,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }
}

/// Row offset of a 1-based page, or a validation error when it does not fit
/// in an `i64`.
pub fn offset_for(page: i64, limit: i64) -> Result<i64, CoreError> {
    (page.max(1) - 1)
        .checked_mul(limit.max(0))
        .ok_or_else(|| CoreError::Validation(format!("page {page} is out of range")))
}

/// Reject non-positive pages and page sizes, page sizes above
/// [`MAX_PAGE_SIZE`], and pages whose row offset overflows.
pub fn validate_page_params(page: i64, limit: i64) -> Result<(), CoreError> {
    if page < 1 {
        return Err(CoreError::Validation(format!("page must be >= 1, got {page}")));
    }
    if limit < 1 || limit > MAX_PAGE_SIZE {
        return Err(CoreError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
        )));
    }
    offset_for(page, limit).map(|_| ())
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided page to at least 1.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}
