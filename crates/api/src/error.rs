use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use booking_core::error::CoreError;
use booking_db::store::StoreError;
use serde::Serialize;
use serde_json::json;

use crate::auth::jwt::TokenError;
use crate::engine::scheduling::SchedulingError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors plus the engine, token, and request
/// validation errors. Implements [`IntoResponse`] to produce consistent JSON
/// error responses of the form `{ "error": ..., "code": ... }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `booking_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A scheduling engine rejection.
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    /// A token could not be verified, refreshed, or signed.
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Field-level request validation failures.
    #[error("Validation failed: {0}")]
    InvalidFields(#[from] validator::ValidationErrors),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

/// One failed field in a `VALIDATION_ERROR` response.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => classify_core_error(core),

            // --- Engine errors ---
            AppError::Scheduling(err) => classify_scheduling_error(err),

            // --- Token errors ---
            AppError::Token(err) => classify_token_error(err),

            // --- Request validation: carries per-field detail ---
            AppError::InvalidFields(errors) => {
                let body = json!({
                    "error": "Request validation failed",
                    "code": "VALIDATION_ERROR",
                    "fields": field_errors(errors),
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Param naming the field a struct-level rule reports against.
pub const FIELD_PARAM: &str = "field";

/// Flatten `validator` errors into a stable, field-sorted list.
pub fn field_errors(errors: &validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: e
                    .params
                    .get(FIELD_PARAM)
                    .and_then(|v| v.as_str())
                    .unwrap_or(&*field)
                    .to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code)),
            })
        })
        .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    fields
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

fn classify_core_error(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
    }
}

fn classify_scheduling_error(err: &SchedulingError) -> (StatusCode, &'static str, String) {
    match err {
        SchedulingError::InvalidRange(window) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            window.to_string(),
        ),
        SchedulingError::OwnAppointment => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            err.to_string(),
        ),
        SchedulingError::Overlap
        | SchedulingError::JoinCodeCollision
        | SchedulingError::AlreadyRegistered => (StatusCode::CONFLICT, "CONFLICT", err.to_string()),
        SchedulingError::NotFound { entity, id } => classify_core_error(&CoreError::NotFound {
            entity: *entity,
            id: *id,
        }),
        SchedulingError::UnknownJoinCode => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string()),
        SchedulingError::Store(store) => match store {
            StoreError::Overlap | StoreError::DuplicateJoinCode | StoreError::DuplicateBooking => {
                (StatusCode::CONFLICT, "CONFLICT", store.to_string())
            }
            StoreError::Database(db) => classify_sqlx_error(db),
        },
    }
}

fn classify_token_error(err: &TokenError) -> (StatusCode, &'static str, String) {
    match err {
        TokenError::Malformed | TokenError::NotYetEligible { .. } => {
            (StatusCode::BAD_REQUEST, "BAD_REQUEST", err.to_string())
        }
        TokenError::SignatureInvalid | TokenError::Expired | TokenError::WrongClass { .. } => {
            (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
        }
        TokenError::Signing(msg) => {
            tracing::error!(error = %msg, "Token signing failed");
            internal()
        }
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Unique violations on `uq_*` constraints and exclusion violations on
///   `ex_*` constraints map to 409.
/// - Everything else maps to 500 with a sanitized message.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        sqlx::Error::Database(db_err) => {
            let constraint = db_err.constraint().unwrap_or("unknown");
            match db_err.code().as_deref() {
                // PostgreSQL unique_violation
                Some("23505") if constraint.starts_with("uq_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Duplicate value violates unique constraint: {constraint}"),
                    );
                }
                // PostgreSQL exclusion_violation
                Some("23P01") if constraint.starts_with("ex_") => {
                    return (
                        StatusCode::CONFLICT,
                        "CONFLICT",
                        format!("Value conflicts with existing row: {constraint}"),
                    );
                }
                _ => {}
            }
            tracing::error!(error = %db_err, "Database error");
            internal()
        }
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
