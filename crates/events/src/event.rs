//! The entry change notification carried by the [`SyncBus`](crate::SyncBus).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use vitrine_core::types::{DbId, Timestamp};

/// What happened to the entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncEventKind {
    Created,
    Updated,
    Deleted,
}

impl SyncEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
        }
    }
}

impl std::fmt::Display for SyncEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A change to one entry of one form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    #[serde(rename = "type")]
    pub kind: SyncEventKind,
    pub entry_id: DbId,
    pub form_id: DbId,
    pub timestamp: Timestamp,
    /// Optional change details, e.g. the new status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SyncEvent {
    /// Create an event stamped with the current time.
    pub fn new(kind: SyncEventKind, entry_id: DbId, form_id: DbId) -> Self {
        Self {
            kind,
            entry_id,
            form_id,
            timestamp: Utc::now(),
            data: None,
        }
    }

    pub fn created(entry_id: DbId, form_id: DbId) -> Self {
        Self::new(SyncEventKind::Created, entry_id, form_id)
    }

    pub fn updated(entry_id: DbId, form_id: DbId) -> Self {
        Self::new(SyncEventKind::Updated, entry_id, form_id)
    }

    pub fn deleted(entry_id: DbId, form_id: DbId) -> Self {
        Self::new(SyncEventKind::Deleted, entry_id, form_id)
    }

    /// Attach change details.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}
