//! Entry value model.

use sqlx::FromRow;
use vitrine_core::types::DbId;
use vitrine_core::value::RawEntryValue;

/// A row from the `form_entry_values` table.
#[derive(Debug, Clone, FromRow)]
pub struct EntryValueRow {
    pub entry_id: DbId,
    pub field_id: DbId,
    pub value: Option<String>,
    pub value_json: Option<serde_json::Value>,
}

impl From<EntryValueRow> for RawEntryValue {
    fn from(row: EntryValueRow) -> Self {
        RawEntryValue {
            field_id: row.field_id,
            value: row.value,
            value_json: row.value_json,
        }
    }
}
