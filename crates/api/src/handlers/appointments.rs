//! Handlers for the `/appointments` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use booking_core::scheduling::duration_secs;
use booking_core::types::{DbId, Timestamp};
use booking_db::models::appointment::AppointmentResponse;
use booking_db::models::booking::Booking;
use booking_db::models::user::UserResponse;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::engine::scheduling::NewAppointment;
use crate::error::{AppError, AppResult, FIELD_PARAM};
use crate::extract::ValidatedJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /appointments`.
///
/// Every field is optional at the serde level so a request missing several
/// fields is answered with one `VALIDATION_ERROR` listing all of them.
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "check_window", skip_on_field_errors = false))]
pub struct CreateAppointmentRequest {
    #[validate(
        required(message = "Title is required"),
        length(min = 1, max = 200, message = "Title must be 1-200 characters")
    )]
    pub title: Option<String>,
    #[validate(required(message = "Start time is required"))]
    pub start_time: Option<Timestamp>,
    #[validate(required(message = "End time is required"))]
    pub end_time: Option<Timestamp>,
    /// Optional; when present it must equal `end_time - start_time`.
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_secs: Option<i64>,
}

/// Cross-field rules, reported against the field named in the `field` param.
fn check_window(input: &CreateAppointmentRequest) -> Result<(), ValidationError> {
    let (Some(start), Some(end)) = (input.start_time, input.end_time) else {
        return Ok(());
    };
    if end < start {
        return Err(field_error(
            "end_time",
            "end_before_start",
            "End time must not be before start time",
        ));
    }
    match input.duration_secs {
        Some(supplied) if supplied >= 0 && supplied != duration_secs(start, end) => Err(field_error(
            "duration_secs",
            "duration_mismatch",
            "Duration must equal the time between start and end",
        )),
        _ => Ok(()),
    }
}

fn field_error(field: &'static str, code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error.add_param(FIELD_PARAM.into(), &field);
    error
}

/// Request body for `POST /appointments/join`.
#[derive(Debug, Deserialize, Validate)]
pub struct JoinAppointmentRequest {
    #[validate(length(min = 1, max = 32, message = "Join code is required"))]
    pub join_code: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /appointments
///
/// Create an appointment owned by the caller. 409 if it overlaps one of the
/// caller's existing appointments.
pub async fn create_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<CreateAppointmentRequest>,
) -> AppResult<(StatusCode, Json<AppointmentResponse>)> {
    let (Some(title), Some(start_time), Some(end_time)) =
        (input.title, input.start_time, input.end_time)
    else {
        return Err(AppError::BadRequest("Missing required fields".into()));
    };
    let appointment = state
        .scheduling()
        .create_appointment(
            auth.user_id,
            NewAppointment {
                title,
                start_time,
                end_time,
                duration_secs: input.duration_secs,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// GET /appointments/my
pub async fn list_my_appointments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<AppointmentResponse>>> {
    let appointments = state
        .scheduling()
        .list_owned_appointments(auth.user_id)
        .await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// GET /appointments/registered
pub async fn list_registered_appointments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<AppointmentResponse>>> {
    let appointments = state
        .scheduling()
        .list_registered_appointments(auth.user_id)
        .await?;
    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// GET /appointments/{id}/users
///
/// Users registered for an appointment; 404 if the appointment does not exist.
pub async fn list_attendees(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.scheduling().list_attendees(id).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// POST /appointments/join
///
/// Register the caller for the appointment with the given join code.
pub async fn join_appointment(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(input): ValidatedJson<JoinAppointmentRequest>,
) -> AppResult<(StatusCode, Json<Booking>)> {
    let booking = state
        .scheduling()
        .register_by_join_code(auth.user_id, &input.join_code)
        .await?;
    Ok((StatusCode::CREATED, Json(booking)))
}
