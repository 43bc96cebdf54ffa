//! PostgreSQL-backed entry query service.
//!
//! Runs the filtered/sorted/paginated query with an exact count, then
//! hydrates each row: processed field values, notes, and the publisher
//! resolved from the creator id. Search and dynamic-field ordering are
//! applied to the hydrated page.

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use sqlx::PgPool;
use vitrine_core::entry::{Entry, EntryNote};
use vitrine_core::error::CoreError;
use vitrine_core::field::FieldDefinition;
use vitrine_core::pagination::{offset_for, PaginationInfo};
use vitrine_core::search::filter_page;
use vitrine_core::sorting::{resolve_sort, sort_entries, SortTarget};
use vitrine_core::source::{EntryPage, EntrySource, LoadEntriesParams};
use vitrine_core::status::{EntryStatus, StatusCounts, StatusFilter};
use vitrine_core::types::DbId;
use vitrine_core::value::{process_entry_values, RawEntryValue};

use crate::models::entry::EntryRow;
use crate::repositories::{EntryNoteRepo, EntryRepo, EntryValueRepo, FieldRepo, PublisherRepo};

/// Upper bound on rows returned by an export.
pub const MAX_EXPORT_ROWS: i64 = 10_000;

/// Map a database failure onto the retryable core error.
fn unavailable(err: sqlx::Error) -> CoreError {
    tracing::error!(error = %err, "Entry query failed");
    CoreError::Unavailable(err.to_string())
}

/// [`EntrySource`] over a PostgreSQL pool.
#[derive(Clone)]
pub struct PgEntrySource {
    pool: PgPool,
}

impl PgEntrySource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Field definitions of a form in display order.
    ///
    /// Rows with an unknown field type are skipped with a warning.
    pub async fn load_fields(&self, form_id: DbId) -> Result<Vec<FieldDefinition>, CoreError> {
        let rows = FieldRepo::list_for_form(&self.pool, form_id)
            .await
            .map_err(unavailable)?;

        let mut fields = Vec::with_capacity(rows.len());
        for row in rows {
            let field_id = row.id;
            match FieldDefinition::try_from(row) {
                Ok(field) => fields.push(field),
                Err(err) => {
                    tracing::warn!(%form_id, %field_id, error = %err, "Skipping field with unknown type");
                }
            }
        }
        Ok(fields)
    }

    /// Every entry of a form matching the status filter, hydrated, newest
    /// first. Used by CSV export.
    pub async fn load_entries_for_export(
        &self,
        form_id: DbId,
        status_filter: StatusFilter,
    ) -> Result<Vec<Entry>, CoreError> {
        let rows = EntryRepo::list_all(
            &self.pool,
            Some(form_id),
            status_filter.status(),
            MAX_EXPORT_ROWS,
        )
        .await
        .map_err(unavailable)?;
        self.hydrate(rows).await
    }

    /// Attach processed values, notes, and publishers to entry rows,
    /// preserving row order.
    async fn hydrate(&self, rows: Vec<EntryRow>) -> Result<Vec<Entry>, CoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let entry_ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();
        let creator_ids: Vec<DbId> = rows
            .iter()
            .filter_map(|r| r.created_by)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let (value_rows, note_rows, publishers) = tokio::try_join!(
            EntryValueRepo::list_for_entries(&self.pool, &entry_ids),
            EntryNoteRepo::list_for_entries(&self.pool, &entry_ids),
            PublisherRepo::resolve(&self.pool, &creator_ids),
        )
        .map_err(unavailable)?;

        let mut raw_values: HashMap<DbId, Vec<RawEntryValue>> = HashMap::new();
        for row in value_rows {
            raw_values.entry(row.entry_id).or_default().push(row.into());
        }

        let mut notes: HashMap<DbId, Vec<EntryNote>> = HashMap::new();
        for row in note_rows {
            notes.entry(row.entry_id).or_default().push(row.into());
        }

        rows.into_iter()
            .map(|row| {
                let values = raw_values
                    .get(&row.id)
                    .map(|raws| process_entry_values(raws))
                    .unwrap_or_else(BTreeMap::new);
                let entry_notes = notes.remove(&row.id).unwrap_or_default();
                let publisher = row.created_by.and_then(|id| publishers.get(&id).cloned());
                row.into_entry(values, entry_notes, publisher)
            })
            .collect()
    }
}

#[async_trait]
impl EntrySource for PgEntrySource {
    async fn load_entries_paginated(
        &self,
        params: &LoadEntriesParams,
    ) -> Result<EntryPage, CoreError> {
        params.validate()?;

        let fields = match params.form_id {
            Some(form_id) => self.load_fields(form_id).await?,
            None => Vec::new(),
        };
        let target = resolve_sort(params.sort_field.as_deref(), &fields);
        let status = params.status_filter.status();

        let rows = EntryRepo::list_page(
            &self.pool,
            params.form_id,
            status,
            target.server_column(),
            params.sort_direction,
            params.limit,
            offset_for(params.page, params.limit)?,
        )
        .await
        .map_err(unavailable)?;
        let total = EntryRepo::count(&self.pool, params.form_id, status)
            .await
            .map_err(unavailable)?;

        let mut entries = self.hydrate(rows).await?;

        if let SortTarget::Client { field_id, kind } = target {
            sort_entries(&mut entries, field_id, kind, params.sort_direction);
        }
        let entries = filter_page(entries, &fields, params.search_term.as_deref());

        tracing::debug!(
            form_id = ?params.form_id,
            page = params.page,
            limit = params.limit,
            returned = entries.len(),
            total,
            "Loaded entry page"
        );

        Ok(EntryPage {
            data: entries,
            pagination: PaginationInfo::compute(params.page, params.limit, total),
        })
    }

    async fn load_status_counts(&self, form_id: Option<DbId>) -> Result<StatusCounts, CoreError> {
        let pairs = EntryRepo::count_by_status(&self.pool, form_id)
            .await
            .map_err(unavailable)?;

        let parsed = pairs.into_iter().filter_map(|(status, count)| {
            match status.parse::<EntryStatus>() {
                Ok(status) => Some((status, count)),
                Err(_) => {
                    tracing::warn!(%status, "Ignoring entries with unknown status");
                    None
                }
            }
        });
        Ok(StatusCounts::from_pairs(parsed))
    }
}
