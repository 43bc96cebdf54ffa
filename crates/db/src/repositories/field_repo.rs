//! Repository for the `form_fields` table.

use sqlx::PgPool;
use vitrine_core::types::DbId;

use crate::models::field::{CreateField, FieldRow};

/// Column list for form_fields queries.
const COLUMNS: &str = "id, form_id, field_type, label, settings, position";

/// Read access to form field definitions, plus inserts for fixtures.
pub struct FieldRepo;

impl FieldRepo {
    /// List a form's fields in display order.
    pub async fn list_for_form(pool: &PgPool, form_id: DbId) -> Result<Vec<FieldRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_fields
             WHERE form_id = $1
             ORDER BY position ASC, created_at ASC"
        );
        sqlx::query_as::<_, FieldRow>(&query)
            .bind(form_id)
            .fetch_all(pool)
            .await
    }

    pub async fn create(pool: &PgPool, input: &CreateField) -> Result<FieldRow, sqlx::Error> {
        let settings = input
            .settings
            .as_ref()
            .and_then(|s| serde_json::to_value(s).ok());
        let query = format!(
            "INSERT INTO form_fields (form_id, field_type, label, settings, position)
             VALUES ($1, $2, $3, $4, COALESCE($5, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FieldRow>(&query)
            .bind(input.form_id)
            .bind(input.field_type.as_str())
            .bind(&input.label)
            .bind(settings)
            .bind(input.position)
            .fetch_one(pool)
            .await
    }
}
