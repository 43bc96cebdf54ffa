//! Observable state of an entries table.

use serde::Serialize;
use vitrine_core::entry::Entry;
use vitrine_core::pagination::PaginationInfo;
use vitrine_core::sorting::SortState;
use vitrine_core::status::{StatusCounts, StatusFilter};

/// Lifecycle of the current page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// The last load failed; retry with a refresh.
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Point-in-time copy of everything a view renders.
#[derive(Debug, Clone, Serialize)]
pub struct TableView {
    pub load_state: LoadState,
    pub entries: Vec<Entry>,
    pub pagination: PaginationInfo,
    pub counts: StatusCounts,
    pub page: i64,
    pub page_size: i64,
    pub sort: SortState,
    pub search_term: Option<String>,
    pub status_filter: StatusFilter,
}
