//! Query parameter types for the entry endpoints.

use serde::Deserialize;
use vitrine_core::pagination::{clamp_limit, clamp_page, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use vitrine_core::sorting::SortDirection;
use vitrine_core::source::LoadEntriesParams;
use vitrine_core::status::StatusFilter;
use vitrine_core::types::DbId;

/// `?page=&limit=&search=&status=&sort_field=&sort_direction=`
#[derive(Debug, Default, Deserialize)]
pub struct EntryListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
}

impl EntryListParams {
    /// Clamp paging values and normalize blanks for a form's list query.
    pub fn into_load_params(self, form_id: DbId) -> LoadEntriesParams {
        let defaults = LoadEntriesParams::default();
        LoadEntriesParams {
            form_id: Some(form_id),
            page: clamp_page(self.page),
            limit: clamp_limit(self.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE),
            sort_field: non_blank(self.sort_field),
            sort_direction: self.sort_direction.unwrap_or(defaults.sort_direction),
            search_term: non_blank(self.search),
            status_filter: self.status.unwrap_or(defaults.status_filter),
        }
    }
}

/// `?status=` for status-scoped endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct StatusParams {
    pub status: Option<StatusFilter>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
