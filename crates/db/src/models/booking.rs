//! Booking entity model and DTOs.

use booking_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A booking row: `user_id` attends `appointment_id`.
///
/// `start_time`/`end_time` are a snapshot of the appointment window taken
/// when the booking was made.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub user_id: DbId,
    pub appointment_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(skip_serializing)]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a booking.
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub user_id: DbId,
    pub appointment_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}
