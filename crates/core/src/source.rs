//! The query-service seam.
//!
//! [`EntrySource`] is what the pagination controller talks to. The
//! PostgreSQL implementation lives in `vitrine-db`; tests use in-memory
//! doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::CoreError;
use crate::pagination::{validate_page_params, PaginationInfo, DEFAULT_PAGE_SIZE};
use crate::sorting::SortDirection;
use crate::status::{StatusCounts, StatusFilter};
use crate::types::DbId;

/// Parameters of one paginated entry query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoadEntriesParams {
    pub form_id: Option<DbId>,
    /// 1-based page number.
    pub page: i64,
    pub limit: i64,
    pub sort_field: Option<String>,
    pub sort_direction: SortDirection,
    pub search_term: Option<String>,
    pub status_filter: StatusFilter,
}

impl Default for LoadEntriesParams {
    fn default() -> Self {
        Self {
            form_id: None,
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            sort_field: None,
            sort_direction: SortDirection::Desc,
            search_term: None,
            status_filter: StatusFilter::All,
        }
    }
}

impl LoadEntriesParams {
    pub fn for_form(form_id: DbId) -> Self {
        Self {
            form_id: Some(form_id),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_page_params(self.page, self.limit)
    }

    /// Serialized form of these parameters; identical parameters always
    /// produce the same key.
    pub fn cache_key(&self) -> String {
        // Field order is fixed by the struct, so the JSON text is canonical.
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// One page of entries with its page metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPage {
    pub data: Vec<Entry>,
    pub pagination: PaginationInfo,
}

impl EntryPage {
    pub fn empty(page: i64, limit: i64) -> Self {
        Self {
            data: Vec::new(),
            pagination: PaginationInfo::compute(page, limit, 0),
        }
    }
}

/// Backend that answers entry queries.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared
/// behind an `Arc` across tasks.
#[async_trait]
pub trait EntrySource: Send + Sync + 'static {
    /// Fetch one page of entries.
    ///
    /// Filtering by form and status and ordering by server columns happen in
    /// the backend; search and dynamic-field ordering are applied to the
    /// fetched page.
    async fn load_entries_paginated(
        &self,
        params: &LoadEntriesParams,
    ) -> Result<EntryPage, CoreError>;

    /// Per-status tallies, optionally scoped to one form.
    async fn load_status_counts(&self, form_id: Option<DbId>) -> Result<StatusCounts, CoreError>;
}
