//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` struct matching the database row
//! - `Deserialize` DTOs for inserts and patches where the table is written
//! - Conversions into the `vitrine_core` view types

pub mod entry;
pub mod entry_note;
pub mod entry_value;
pub mod field;
pub mod form;
pub mod identity;
