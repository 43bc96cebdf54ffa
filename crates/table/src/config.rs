//! Table controller configuration.

use std::time::Duration;

use vitrine_core::pagination::DEFAULT_PAGE_SIZE;
use vitrine_core::sorting::SortDirection;

use crate::cache::{DEFAULT_MAX_AGE, DEFAULT_MAX_ENTRIES};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub page_size: i64,
    pub cache_max_age: Duration,
    pub cache_max_entries: usize,
    /// Direction applied when a new sort column is activated.
    pub initial_sort_direction: SortDirection,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            cache_max_age: DEFAULT_MAX_AGE,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            initial_sort_direction: SortDirection::Asc,
        }
    }
}
