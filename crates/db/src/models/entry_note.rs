//! Reviewer note model.

use serde::Deserialize;
use sqlx::FromRow;
use vitrine_core::entry::EntryNote;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the `form_entry_notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntryNoteRow {
    pub id: DbId,
    pub entry_id: DbId,
    pub content: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for adding a note to an entry.
#[derive(Debug, Deserialize)]
pub struct CreateEntryNote {
    pub content: String,
    pub created_by: Option<DbId>,
}

impl From<EntryNoteRow> for EntryNote {
    fn from(row: EntryNoteRow) -> Self {
        EntryNote {
            id: row.id,
            entry_id: row.entry_id,
            content: row.content,
            created_by: row.created_by,
            created_at: row.created_at,
        }
    }
}
