//! Form model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vitrine_core::types::{DbId, Timestamp};

/// A row from the `forms` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Form {
    pub id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a form.
#[derive(Debug, Deserialize)]
pub struct CreateForm {
    pub name: String,
}
