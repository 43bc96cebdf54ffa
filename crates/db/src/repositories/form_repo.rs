//! Repository for the `forms` table.

use sqlx::PgPool;
use vitrine_core::types::DbId;

use crate::models::form::{CreateForm, Form};

/// Column list for forms queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

pub struct FormRepo;

impl FormRepo {
    pub async fn create(pool: &PgPool, input: &CreateForm) -> Result<Form, sqlx::Error> {
        let query = format!("INSERT INTO forms (name) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Form>(&query)
            .bind(&input.name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
