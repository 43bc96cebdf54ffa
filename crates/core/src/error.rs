use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The backing data service failed or could not be reached. Retryable.
    #[error("Data service unavailable: {0}")]
    Unavailable(String),
}
