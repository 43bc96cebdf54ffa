//! Entry view model returned by the query layer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::status::EntryStatus;
use crate::types::{DbId, Timestamp};

/// Identity table a publisher was resolved from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublisherSource {
    Admin,
    User,
}

/// Denormalized identity of the user who submitted an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publisher {
    pub user_id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub source: PublisherSource,
}

/// Free-text reviewer note attached to an entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryNote {
    pub id: DbId,
    pub entry_id: DbId,
    pub content: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// One submitted form record with its processed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: DbId,
    pub form_id: DbId,
    pub status: EntryStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by: Option<DbId>,
    /// Processed value per field id.
    pub values: BTreeMap<DbId, serde_json::Value>,
    #[serde(default)]
    pub notes: Vec<EntryNote>,
    pub publisher: Option<Publisher>,
}
