//! Entries table controller: pagination state, a bounded page cache, and
//! sync-driven refresh.

pub mod cache;
pub mod config;
pub mod controller;
pub mod state;

pub use cache::{CacheTicket, PageCache};
pub use config::TableConfig;
pub use controller::EntriesTable;
pub use state::{LoadState, TableView};
