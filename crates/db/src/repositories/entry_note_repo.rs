//! Repository for the `form_entry_notes` table.

use sqlx::PgPool;
use vitrine_core::types::DbId;

use crate::models::entry_note::{CreateEntryNote, EntryNoteRow};

/// Column list for form_entry_notes queries.
const COLUMNS: &str = "id, entry_id, content, created_by, created_at";

pub struct EntryNoteRepo;

impl EntryNoteRepo {
    /// Notes of the given entries, oldest first.
    pub async fn list_for_entries(
        pool: &PgPool,
        entry_ids: &[DbId],
    ) -> Result<Vec<EntryNoteRow>, sqlx::Error> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM form_entry_notes
             WHERE entry_id = ANY($1)
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, EntryNoteRow>(&query)
            .bind(entry_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn create(
        pool: &PgPool,
        entry_id: DbId,
        input: &CreateEntryNote,
    ) -> Result<EntryNoteRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_entry_notes (entry_id, content, created_by)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntryNoteRow>(&query)
            .bind(entry_id)
            .bind(&input.content)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }
}
