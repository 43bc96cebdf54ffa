//! Vitrine domain core.
//!
//! Pure, database-free building blocks for the entry review pipeline:
//! field definitions, stored-value normalization, price simulation,
//! sorting, pagination math, page-local search, and CSV export. The
//! [`source::EntrySource`] trait is the seam between the pagination
//! controller and whatever backend actually runs the queries.

pub mod entry;
pub mod error;
pub mod export;
pub mod field;
pub mod pagination;
pub mod pricing;
pub mod search;
pub mod sorting;
pub mod source;
pub mod status;
pub mod types;
pub mod value;
