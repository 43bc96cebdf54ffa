//! Handlers for entry review: listing, counts, export, and review actions.
//!
//! Review actions emit a [`SyncEvent`] after the change is committed so the
//! page cache and attached tables refresh.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use vitrine_core::entry::EntryNote;
use vitrine_core::error::CoreError;
use vitrine_core::export::build_entries_csv;
use vitrine_core::source::EntrySource;
use vitrine_core::types::DbId;
use vitrine_db::models::entry::{EntryRow, UpdateEntryStatus};
use vitrine_db::models::entry_note::CreateEntryNote;
use vitrine_db::models::form::Form;
use vitrine_db::repositories::{EntryNoteRepo, EntryRepo, FormRepo};
use vitrine_events::SyncEvent;

use crate::error::{AppError, AppResult};
use crate::query::{EntryListParams, StatusParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_form(pool: &sqlx::PgPool, form_id: DbId) -> AppResult<Form> {
    FormRepo::find_by_id(pool, form_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Form",
            id: form_id,
        }))
}

async fn ensure_entry(pool: &sqlx::PgPool, id: DbId) -> AppResult<EntryRow> {
    EntryRepo::find_by_id(pool, id)
        .await?
        .ok_or_else(|| entry_not_found(id))
}

fn entry_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Entry", id })
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// GET /forms/{form_id}/entries
///
/// One page of entries with pagination metadata. Responses are cached per
/// parameter set until they age out or an entry of the form changes. A page
/// whose load overlapped such a change is returned but not cached.
pub async fn list_entries(
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Query(params): Query<EntryListParams>,
) -> AppResult<impl IntoResponse> {
    ensure_form(&state.pool, form_id).await?;
    let params = params.into_load_params(form_id);

    if let Some(page) = state.page_cache.get(&params) {
        tracing::debug!(%form_id, page = params.page, "Serving entry page from cache");
        return Ok(Json(page));
    }

    let ticket = state.page_cache.ticket();
    let page = state.entries.load_entries_paginated(&params).await?;
    state.page_cache.insert(ticket, &params, page.clone());
    Ok(Json(page))
}

/// GET /forms/{form_id}/entries/counts
pub async fn status_counts(
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_form(&state.pool, form_id).await?;
    let counts = state.entries.load_status_counts(Some(form_id)).await?;
    Ok(Json(DataResponse { data: counts }))
}

/// GET /forms/{form_id}/entries/export
///
/// Every entry of the form matching `?status=` as a CSV attachment.
pub async fn export_entries(
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Query(params): Query<StatusParams>,
) -> AppResult<impl IntoResponse> {
    ensure_form(&state.pool, form_id).await?;
    let status = params.status.unwrap_or_default();

    let fields = state.entries.load_fields(form_id).await?;
    let entries = state.entries.load_entries_for_export(form_id, status).await?;
    let csv = build_entries_csv(&entries, &fields);

    tracing::info!(%form_id, rows = entries.len(), status = status.as_str(), "Exported entries");

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"entries-{form_id}.csv\""),
            ),
        ],
        csv,
    ))
}

/// GET /forms/{form_id}/fields
pub async fn list_fields(
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_form(&state.pool, form_id).await?;
    let fields = state.entries.load_fields(form_id).await?;
    Ok(Json(DataResponse { data: fields }))
}

// ---------------------------------------------------------------------------
// Review actions
// ---------------------------------------------------------------------------

/// PATCH /entries/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEntryStatus>,
) -> AppResult<impl IntoResponse> {
    let entry = EntryRepo::update_status(&state.pool, id, input.status)
        .await?
        .ok_or_else(|| entry_not_found(id))?;

    tracing::info!(entry_id = %id, status = input.status.as_str(), "Entry status changed");
    state
        .sync_bus
        .emit(
            SyncEvent::updated(entry.id, entry.form_id)
                .with_data(json!({ "status": input.status })),
        )
        .await;

    Ok(Json(DataResponse { data: entry }))
}

/// POST /entries/{id}/notes
pub async fn add_note(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateEntryNote>,
) -> AppResult<impl IntoResponse> {
    let content = input.content.trim();
    if content.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Note content must not be empty".to_string(),
        )));
    }
    let entry = ensure_entry(&state.pool, id).await?;

    let input = CreateEntryNote {
        content: content.to_string(),
        created_by: input.created_by,
    };
    let note: EntryNote = EntryNoteRepo::create(&state.pool, id, &input).await?.into();
    EntryRepo::touch(&state.pool, id).await?;

    tracing::info!(entry_id = %id, note_id = %note.id, "Note added to entry");
    state
        .sync_bus
        .emit(SyncEvent::updated(entry.id, entry.form_id).with_data(json!({ "note_id": note.id })))
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// DELETE /entries/{id}
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let entry = EntryRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| entry_not_found(id))?;

    tracing::info!(entry_id = %id, form_id = %entry.form_id, "Entry deleted");
    state
        .sync_bus
        .emit(SyncEvent::deleted(entry.id, entry.form_id))
        .await;

    Ok(StatusCode::NO_CONTENT)
}
