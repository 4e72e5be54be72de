//! Appointment entity model and DTOs.

use booking_core::scheduling::duration_secs;
use booking_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full appointment row from the `appointments` table.
///
/// Duration is not a column; it is derived from the window on read.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Appointment {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub user_id: DbId,
    pub join_code: String,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Appointment {
    pub fn duration_secs(&self) -> i64 {
        duration_secs(self.start_time, self.end_time)
    }
}

/// API representation of an appointment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentResponse {
    pub id: DbId,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub duration_secs: i64,
    pub user_id: DbId,
    pub join_code: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            duration_secs: appointment.duration_secs(),
            id: appointment.id,
            title: appointment.title,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
            user_id: appointment.user_id,
            join_code: appointment.join_code,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

/// DTO for inserting an appointment that already passed validation.
#[derive(Debug, Clone)]
pub struct CreateAppointment {
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub user_id: DbId,
    pub join_code: String,
}
