//! Form field model.

use serde::Deserialize;
use sqlx::FromRow;
use vitrine_core::error::CoreError;
use vitrine_core::field::{FieldDefinition, FieldSettings, FieldType};
use vitrine_core::types::DbId;

/// A row from the `form_fields` table.
#[derive(Debug, Clone, FromRow)]
pub struct FieldRow {
    pub id: DbId,
    pub form_id: DbId,
    pub field_type: String,
    pub label: String,
    pub settings: Option<serde_json::Value>,
    pub position: i32,
}

/// DTO for creating a field.
#[derive(Debug, Deserialize)]
pub struct CreateField {
    pub form_id: DbId,
    pub field_type: FieldType,
    pub label: String,
    pub settings: Option<FieldSettings>,
    pub position: Option<i32>,
}

impl TryFrom<FieldRow> for FieldDefinition {
    type Error = CoreError;

    /// Fails on an unknown `field_type`. Malformed settings fall back to
    /// the defaults.
    fn try_from(row: FieldRow) -> Result<Self, Self::Error> {
        let field_type = row.field_type.parse::<FieldType>()?;
        let settings = row
            .settings
            .and_then(|s| serde_json::from_value::<FieldSettings>(s).ok())
            .unwrap_or_default();
        Ok(FieldDefinition {
            id: row.id,
            field_type,
            label: row.label,
            settings,
        })
    }
}
