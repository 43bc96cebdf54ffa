//! Identity rows from the `admins` and `users` tables.

use serde::Deserialize;
use sqlx::FromRow;
use vitrine_core::entry::{Publisher, PublisherSource};
use vitrine_core::types::DbId;

/// The identity columns shared by `admins` and `users`.
#[derive(Debug, Clone, FromRow)]
pub struct IdentityRow {
    pub user_id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl IdentityRow {
    pub fn into_publisher(self, source: PublisherSource) -> Publisher {
        Publisher {
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            source,
        }
    }
}

/// DTO for creating an identity row in either table.
#[derive(Debug, Deserialize)]
pub struct CreateIdentity {
    pub user_id: DbId,
    pub name: Option<String>,
    pub email: Option<String>,
}
