//! Repository for the `form_entry_values` table.

use sqlx::PgPool;
use vitrine_core::types::DbId;

use crate::models::entry_value::EntryValueRow;

/// Column list for form_entry_values queries.
const COLUMNS: &str = "entry_id, field_id, value, value_json";

pub struct EntryValueRepo;

impl EntryValueRepo {
    /// All value rows of the given entries, in one round trip.
    pub async fn list_for_entries(
        pool: &PgPool,
        entry_ids: &[DbId],
    ) -> Result<Vec<EntryValueRow>, sqlx::Error> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM form_entry_values WHERE entry_id = ANY($1)");
        sqlx::query_as::<_, EntryValueRow>(&query)
            .bind(entry_ids)
            .fetch_all(pool)
            .await
    }

    /// Insert or replace the value of one field of an entry.
    pub async fn upsert(
        pool: &PgPool,
        entry_id: DbId,
        field_id: DbId,
        value: Option<&str>,
        value_json: Option<&serde_json::Value>,
    ) -> Result<EntryValueRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_entry_values (entry_id, field_id, value, value_json)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (entry_id, field_id)
             DO UPDATE SET value = EXCLUDED.value, value_json = EXCLUDED.value_json
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntryValueRow>(&query)
            .bind(entry_id)
            .bind(field_id)
            .bind(value)
            .bind(value_json.cloned())
            .fetch_one(pool)
            .await
    }
}
