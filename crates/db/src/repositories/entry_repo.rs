//! Repository for the `form_entries` table.

use sqlx::PgPool;
use vitrine_core::sorting::{EntryColumn, SortDirection};
use vitrine_core::status::EntryStatus;
use vitrine_core::types::DbId;

use crate::models::entry::{CreateEntry, EntryRow};

/// Column list for form_entries queries.
const COLUMNS: &str = "id, form_id, status, created_by, created_at, updated_at";

/// Filters shared by the page, count, and export queries.
///
/// `$1` is the optional form id and `$2` the optional status.
const FILTER: &str = "($1::UUID IS NULL OR form_id = $1) AND ($2::TEXT IS NULL OR status = $2)";

/// Provides listing, counting, and review mutations for entries.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert an entry. Status defaults to `em_analise`.
    pub async fn create(pool: &PgPool, input: &CreateEntry) -> Result<EntryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_entries (form_id, status, created_by)
             VALUES ($1, COALESCE($2, 'em_analise'), $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(input.form_id)
            .bind(input.status.map(EntryStatus::as_str))
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EntryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_entries WHERE id = $1");
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of entries ordered by a whitelisted column.
    ///
    /// `id` breaks ties so pages never overlap.
    pub async fn list_page(
        pool: &PgPool,
        form_id: Option<DbId>,
        status: Option<EntryStatus>,
        order_by: EntryColumn,
        direction: SortDirection,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<EntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_entries
             WHERE {FILTER}
             ORDER BY {column} {dir}, id {dir}
             LIMIT $3 OFFSET $4",
            column = order_by.as_sql(),
            dir = direction.as_sql(),
        );
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(form_id)
            .bind(status.map(EntryStatus::as_str))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Exact number of entries matching the filters.
    pub async fn count(
        pool: &PgPool,
        form_id: Option<DbId>,
        status: Option<EntryStatus>,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM form_entries WHERE {FILTER}");
        let row: (i64,) = sqlx::query_as(&query)
            .bind(form_id)
            .bind(status.map(EntryStatus::as_str))
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// `(status, count)` pairs, optionally scoped to one form.
    pub async fn count_by_status(
        pool: &PgPool,
        form_id: Option<DbId>,
    ) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            "SELECT status, COUNT(*) FROM form_entries
             WHERE ($1::UUID IS NULL OR form_id = $1)
             GROUP BY status",
        )
        .bind(form_id)
        .fetch_all(pool)
        .await
    }

    /// Every matching entry, newest first, capped at `max_rows`.
    pub async fn list_all(
        pool: &PgPool,
        form_id: Option<DbId>,
        status: Option<EntryStatus>,
        max_rows: i64,
    ) -> Result<Vec<EntryRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM form_entries
             WHERE {FILTER}
             ORDER BY created_at DESC, id DESC
             LIMIT $3"
        );
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(form_id)
            .bind(status.map(EntryStatus::as_str))
            .bind(max_rows)
            .fetch_all(pool)
            .await
    }

    /// Change the review status. Returns `None` if the entry does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: EntryStatus,
    ) -> Result<Option<EntryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE form_entries SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Bump `updated_at` after a change to a dependent table.
    pub async fn touch(pool: &PgPool, id: DbId) -> Result<Option<EntryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE form_entries SET updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an entry (values and notes cascade). Returns the deleted row.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<EntryRow>, sqlx::Error> {
        let query = format!("DELETE FROM form_entries WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, EntryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
