use crate::types::DbId;

/// Domain-level error taxonomy shared by every layer.
///
/// The HTTP layer maps each variant to a status code; see
/// `booking_api::error::AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}
