//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod entry_note_repo;
pub mod entry_repo;
pub mod entry_value_repo;
pub mod field_repo;
pub mod form_repo;
pub mod publisher_repo;

pub use entry_note_repo::EntryNoteRepo;
pub use entry_repo::EntryRepo;
pub use entry_value_repo::EntryValueRepo;
pub use field_repo::FieldRepo;
pub use form_repo::FormRepo;
pub use publisher_repo::PublisherRepo;
