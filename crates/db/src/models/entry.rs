//! Form entry model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitrine_core::entry::{Entry, EntryNote, Publisher};
use vitrine_core::error::CoreError;
use vitrine_core::status::EntryStatus;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the `form_entries` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EntryRow {
    pub id: DbId,
    pub form_id: DbId,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl EntryRow {
    /// Parsed review status. The table's CHECK constraint keeps this valid.
    pub fn status(&self) -> Result<EntryStatus, CoreError> {
        self.status.parse()
    }

    /// Assemble the view model from this row and its joined data.
    pub fn into_entry(
        self,
        values: BTreeMap<DbId, serde_json::Value>,
        notes: Vec<EntryNote>,
        publisher: Option<Publisher>,
    ) -> Result<Entry, CoreError> {
        let status = self.status()?;
        Ok(Entry {
            id: self.id,
            form_id: self.form_id,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            values,
            notes,
            publisher,
        })
    }
}

/// DTO for inserting an entry. Form submission itself happens elsewhere;
/// this exists for imports and fixtures.
#[derive(Debug, Deserialize)]
pub struct CreateEntry {
    pub form_id: DbId,
    pub status: Option<EntryStatus>,
    pub created_by: Option<DbId>,
}

/// DTO for a review status change.
#[derive(Debug, Deserialize)]
pub struct UpdateEntryStatus {
    pub status: EntryStatus,
}
