//! Integration tests for the entry query service.
//!
//! Exercises pagination, status filtering, sorting, value processing,
//! publisher resolution, and status counts against a real database.

use serde_json::json;
use sqlx::PgPool;
use vitrine_core::entry::PublisherSource;
use vitrine_core::field::{FieldSettings, FieldType};
use vitrine_core::sorting::SortDirection;
use vitrine_core::source::{EntrySource, LoadEntriesParams};
use vitrine_core::status::{EntryStatus, StatusFilter};
use vitrine_core::types::DbId;
use vitrine_db::models::entry::CreateEntry;
use vitrine_db::models::field::CreateField;
use vitrine_db::models::form::CreateForm;
use vitrine_db::models::identity::CreateIdentity;
use vitrine_db::repositories::{EntryRepo, EntryValueRepo, FieldRepo, FormRepo, PublisherRepo};
use vitrine_db::PgEntrySource;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_form(pool: &PgPool) -> DbId {
    FormRepo::create(pool, &CreateForm { name: "Ofertas".to_string() })
        .await
        .unwrap()
        .id
}

async fn seed_field(pool: &PgPool, form_id: DbId, field_type: FieldType, label: &str) -> DbId {
    FieldRepo::create(
        pool,
        &CreateField {
            form_id,
            field_type,
            label: label.to_string(),
            settings: Some(FieldSettings::default()),
            position: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn seed_entry(
    pool: &PgPool,
    form_id: DbId,
    status: EntryStatus,
    created_by: Option<DbId>,
) -> DbId {
    EntryRepo::create(
        pool,
        &CreateEntry {
            form_id,
            status: Some(status),
            created_by,
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pages_carry_exact_totals(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    for _ in 0..25 {
        seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
    }
    let source = PgEntrySource::new(pool);

    let params = LoadEntriesParams {
        page: 3,
        limit: 10,
        ..LoadEntriesParams::for_form(form_id)
    };
    let page = source.load_entries_paginated(&params).await.unwrap();

    assert_eq!(page.data.len(), 5);
    assert_eq!(page.pagination.total_items, 25);
    assert_eq!(page.pagination.total_pages, 3);
    assert!(!page.pagination.has_next_page);
    assert!(page.pagination.has_previous_page);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_form_has_zero_pages(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let source = PgEntrySource::new(pool);

    let page = source
        .load_entries_paginated(&LoadEntriesParams::for_form(form_id))
        .await
        .unwrap();

    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total_items, 0);
    assert_eq!(page.pagination.total_pages, 0);
    assert!(!page.pagination.has_next_page);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_page_is_rejected(pool: PgPool) {
    let source = PgEntrySource::new(pool);
    let params = LoadEntriesParams {
        page: 0,
        ..LoadEntriesParams::default()
    };
    assert!(source.load_entries_paginated(&params).await.is_err());
}

// ---------------------------------------------------------------------------
// Filtering and sorting
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_filter_restricts_rows_and_total(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    seed_entry(&pool, form_id, EntryStatus::Verificado, None).await;
    seed_entry(&pool, form_id, EntryStatus::Verificado, None).await;
    seed_entry(&pool, form_id, EntryStatus::Reprovado, None).await;
    let source = PgEntrySource::new(pool);

    let params = LoadEntriesParams {
        status_filter: StatusFilter::Only(EntryStatus::Verificado),
        ..LoadEntriesParams::for_form(form_id)
    };
    let page = source.load_entries_paginated(&params).await.unwrap();

    assert_eq!(page.pagination.total_items, 2);
    assert!(page.data.iter().all(|e| e.status == EntryStatus::Verificado));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_other_forms_are_excluded(pool: PgPool) {
    let form_a = seed_form(&pool).await;
    let form_b = seed_form(&pool).await;
    seed_entry(&pool, form_a, EntryStatus::EmAnalise, None).await;
    seed_entry(&pool, form_b, EntryStatus::EmAnalise, None).await;
    let source = PgEntrySource::new(pool);

    let page = source
        .load_entries_paginated(&LoadEntriesParams::for_form(form_a))
        .await
        .unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].form_id, form_a);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dynamic_field_sort_orders_the_page(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let price_field = seed_field(&pool, form_id, FieldType::Product, "Preço").await;
    for (price, promo) in [(300, 250), (100, 90), (200, 150)] {
        let entry_id = seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
        EntryValueRepo::upsert(
            &pool,
            entry_id,
            price_field,
            None,
            Some(&json!({"price": price, "promotional_price": promo})),
        )
        .await
        .unwrap();
    }
    let source = PgEntrySource::new(pool);

    let params = LoadEntriesParams {
        sort_field: Some(price_field.to_string()),
        sort_direction: SortDirection::Asc,
        ..LoadEntriesParams::for_form(form_id)
    };
    let page = source.load_entries_paginated(&params).await.unwrap();

    let promos: Vec<i64> = page
        .data
        .iter()
        .map(|e| e.values[&price_field]["promotional_price"].as_i64().unwrap())
        .collect();
    assert_eq!(promos, vec![90, 150, 250]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_search_filters_within_the_page(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let name_field = seed_field(&pool, form_id, FieldType::Text, "Loja").await;
    for name in ["Mercado Central", "Padaria Sol", "Central Eletro"] {
        let entry_id = seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
        EntryValueRepo::upsert(&pool, entry_id, name_field, Some(name), None)
            .await
            .unwrap();
    }
    let source = PgEntrySource::new(pool);

    let params = LoadEntriesParams {
        search_term: Some("central".to_string()),
        ..LoadEntriesParams::for_form(form_id)
    };
    let page = source.load_entries_paginated(&params).await.unwrap();

    assert_eq!(page.data.len(), 2);
    // Search narrows the page only; the total reflects the server filter.
    assert_eq!(page.pagination.total_items, 3);
}

// ---------------------------------------------------------------------------
// Hydration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_values_prefer_structured_slot(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let field_id = seed_field(&pool, form_id, FieldType::Product, "Preço").await;
    let entry_id = seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
    EntryValueRepo::upsert(
        &pool,
        entry_id,
        field_id,
        Some("ignored"),
        Some(&json!({"price": 10})),
    )
    .await
    .unwrap();
    let source = PgEntrySource::new(pool);

    let page = source
        .load_entries_paginated(&LoadEntriesParams::for_form(form_id))
        .await
        .unwrap();
    assert_eq!(page.data[0].values[&field_id], json!({"price": 10}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_publisher_prefers_admin_identity(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let shared = DbId::new_v4();
    let user_only = DbId::new_v4();
    let identity = |user_id, name: &str| CreateIdentity {
        user_id,
        name: Some(name.to_string()),
        email: None,
    };
    PublisherRepo::create_admin(&pool, &identity(shared, "Admin Ana")).await.unwrap();
    PublisherRepo::create_user(&pool, &identity(shared, "User Ana")).await.unwrap();
    PublisherRepo::create_user(&pool, &identity(user_only, "User Bia")).await.unwrap();

    let by_admin = seed_entry(&pool, form_id, EntryStatus::EmAnalise, Some(shared)).await;
    let by_user = seed_entry(&pool, form_id, EntryStatus::EmAnalise, Some(user_only)).await;
    let orphan = seed_entry(&pool, form_id, EntryStatus::EmAnalise, Some(DbId::new_v4())).await;
    let source = PgEntrySource::new(pool);

    let page = source
        .load_entries_paginated(&LoadEntriesParams::for_form(form_id))
        .await
        .unwrap();
    let find = |id| page.data.iter().find(|e| e.id == id).unwrap();

    let admin = find(by_admin).publisher.as_ref().unwrap();
    assert_eq!(admin.source, PublisherSource::Admin);
    assert_eq!(admin.name.as_deref(), Some("Admin Ana"));

    let user = find(by_user).publisher.as_ref().unwrap();
    assert_eq!(user.source, PublisherSource::User);

    assert!(find(orphan).publisher.is_none());
}

// ---------------------------------------------------------------------------
// Counts and export
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_counts_sum_to_total(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let other_form = seed_form(&pool).await;
    seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
    seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;
    seed_entry(&pool, form_id, EntryStatus::Reprovado, None).await;
    seed_entry(&pool, other_form, EntryStatus::Verificado, None).await;
    let source = PgEntrySource::new(pool);

    let counts = source.load_status_counts(Some(form_id)).await.unwrap();
    assert_eq!(counts.todos, 3);
    assert_eq!(counts.em_analise, 2);
    assert_eq!(counts.verificado, 0);
    assert_eq!(counts.reprovado, 1);

    let global = source.load_status_counts(None).await.unwrap();
    assert_eq!(global.todos, 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_export_loads_every_matching_entry(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    for _ in 0..15 {
        seed_entry(&pool, form_id, EntryStatus::Verificado, None).await;
    }
    seed_entry(&pool, form_id, EntryStatus::Reprovado, None).await;
    let source = PgEntrySource::new(pool);

    let all = source
        .load_entries_for_export(form_id, StatusFilter::All)
        .await
        .unwrap();
    assert_eq!(all.len(), 16);

    let verified = source
        .load_entries_for_export(form_id, StatusFilter::Only(EntryStatus::Verificado))
        .await
        .unwrap();
    assert_eq!(verified.len(), 15);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_update_and_delete(pool: PgPool) {
    let form_id = seed_form(&pool).await;
    let entry_id = seed_entry(&pool, form_id, EntryStatus::EmAnalise, None).await;

    let updated = EntryRepo::update_status(&pool, entry_id, EntryStatus::Verificado)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status().unwrap(), EntryStatus::Verificado);

    assert!(EntryRepo::delete(&pool, entry_id).await.unwrap().is_some());
    assert!(EntryRepo::find_by_id(&pool, entry_id).await.unwrap().is_none());
    assert!(EntryRepo::delete(&pool, entry_id).await.unwrap().is_none());
}
