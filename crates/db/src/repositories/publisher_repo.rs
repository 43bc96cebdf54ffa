//! Publisher resolution against the `admins` and `users` identity tables.
//!
//! An entry's creator id is looked up in `admins` first; ids not found
//! there are looked up in `users`. Lookups are batched per page.

use std::collections::HashMap;

use sqlx::PgPool;
use vitrine_core::entry::{Publisher, PublisherSource};
use vitrine_core::types::DbId;

use crate::models::identity::{CreateIdentity, IdentityRow};

/// Column list for identity queries (identical in both tables).
const COLUMNS: &str = "user_id, name, email";

pub struct PublisherRepo;

impl PublisherRepo {
    /// Admin identities for the given user ids.
    pub async fn find_admins(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<IdentityRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admins WHERE user_id = ANY($1)");
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(user_ids)
            .fetch_all(pool)
            .await
    }

    /// Platform-user identities for the given user ids.
    pub async fn find_users(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<Vec<IdentityRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE user_id = ANY($1)");
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(user_ids)
            .fetch_all(pool)
            .await
    }

    /// Resolve each user id to a publisher, admins taking precedence.
    ///
    /// Ids found in neither table are absent from the result.
    pub async fn resolve(
        pool: &PgPool,
        user_ids: &[DbId],
    ) -> Result<HashMap<DbId, Publisher>, sqlx::Error> {
        let mut resolved = HashMap::with_capacity(user_ids.len());
        if user_ids.is_empty() {
            return Ok(resolved);
        }

        for row in Self::find_admins(pool, user_ids).await? {
            resolved.insert(row.user_id, row.into_publisher(PublisherSource::Admin));
        }

        let missing: Vec<DbId> = user_ids
            .iter()
            .copied()
            .filter(|id| !resolved.contains_key(id))
            .collect();
        if !missing.is_empty() {
            for row in Self::find_users(pool, &missing).await? {
                resolved.insert(row.user_id, row.into_publisher(PublisherSource::User));
            }
        }

        Ok(resolved)
    }

    pub async fn create_admin(pool: &PgPool, input: &CreateIdentity) -> Result<IdentityRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO admins (user_id, name, email) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }

    pub async fn create_user(pool: &PgPool, input: &CreateIdentity) -> Result<IdentityRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (user_id, name, email) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IdentityRow>(&query)
            .bind(input.user_id)
            .bind(&input.name)
            .bind(&input.email)
            .fetch_one(pool)
            .await
    }
}
