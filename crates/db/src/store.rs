//! Persistence port for the scheduling engine.
//!
//! [`SchedulingStore`] is the query/insert interface the engine depends on;
//! [`PgSchedulingStore`] implements it over the repositories. Constraint
//! violations that carry scheduling meaning are classified into dedicated
//! [`StoreError`] variants so callers never inspect SQLSTATE codes or
//! message text.

use async_trait::async_trait;
use booking_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::appointment::{Appointment, CreateAppointment};
use crate::models::booking::{Booking, CreateBooking};
use crate::models::user::User;
use crate::repositories::{AppointmentRepo, BookingRepo, UserRepo};

/// Exclusion constraint preventing overlapping live appointments per owner.
pub const OVERLAP_CONSTRAINT: &str = "ex_appointments_owner_overlap";
/// Unique constraint on appointment join codes.
pub const JOIN_CODE_CONSTRAINT: &str = "uq_appointments_join_code";
/// Unique index on live bookings per (user, appointment).
pub const BOOKING_CONSTRAINT: &str = "uq_bookings_user_appointment";

/// PostgreSQL SQLSTATE for `unique_violation`.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL SQLSTATE for `exclusion_violation`.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A concurrent insert produced an overlapping appointment for the owner.
    #[error("Appointment overlaps an existing appointment of the same owner")]
    Overlap,

    /// The generated join code is already taken.
    #[error("Join code already in use")]
    DuplicateJoinCode,

    /// The user already holds a booking for the appointment.
    #[error("Booking already exists for this user and appointment")]
    DuplicateBooking,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a write error, lifting known constraint violations.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let code = db_err.code();
            match (code.as_deref(), db_err.constraint()) {
                (Some(EXCLUSION_VIOLATION), Some(OVERLAP_CONSTRAINT)) => return Self::Overlap,
                (Some(UNIQUE_VIOLATION), Some(JOIN_CODE_CONSTRAINT)) => {
                    return Self::DuplicateJoinCode
                }
                (Some(UNIQUE_VIOLATION), Some(BOOKING_CONSTRAINT)) => {
                    return Self::DuplicateBooking
                }
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// Query/insert interface consumed by the scheduling engine.
///
/// All reads exclude soft-deleted rows.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    /// Number of the owner's appointments overlapping `[start, end)`.
    async fn count_overlapping(
        &self,
        owner_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, StoreError>;

    async fn insert_appointment(
        &self,
        input: &CreateAppointment,
    ) -> Result<Appointment, StoreError>;

    async fn find_appointment_by_id(&self, id: DbId) -> Result<Option<Appointment>, StoreError>;

    async fn find_appointment_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<Appointment>, StoreError>;

    /// Owner's appointments in creation order.
    async fn find_appointments_by_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Appointments the user holds a booking for.
    async fn find_appointments_by_attendee(
        &self,
        user_id: DbId,
    ) -> Result<Vec<Appointment>, StoreError>;

    /// Users holding a booking for the appointment.
    async fn find_users_by_appointment(
        &self,
        appointment_id: DbId,
    ) -> Result<Vec<User>, StoreError>;

    async fn insert_booking(&self, input: &CreateBooking) -> Result<Booking, StoreError>;
}

/// [`SchedulingStore`] backed by the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub struct PgSchedulingStore {
    pool: PgPool,
}

impl PgSchedulingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SchedulingStore for PgSchedulingStore {
    async fn count_overlapping(
        &self,
        owner_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, StoreError> {
        Ok(AppointmentRepo::count_overlapping(&self.pool, owner_id, start, end).await?)
    }

    async fn insert_appointment(
        &self,
        input: &CreateAppointment,
    ) -> Result<Appointment, StoreError> {
        AppointmentRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::classify)
    }

    async fn find_appointment_by_id(&self, id: DbId) -> Result<Option<Appointment>, StoreError> {
        Ok(AppointmentRepo::find_by_id(&self.pool, id).await?)
    }

    async fn find_appointment_by_join_code(
        &self,
        join_code: &str,
    ) -> Result<Option<Appointment>, StoreError> {
        Ok(AppointmentRepo::find_by_join_code(&self.pool, join_code).await?)
    }

    async fn find_appointments_by_owner(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(AppointmentRepo::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn find_appointments_by_attendee(
        &self,
        user_id: DbId,
    ) -> Result<Vec<Appointment>, StoreError> {
        Ok(AppointmentRepo::list_by_attendee(&self.pool, user_id).await?)
    }

    async fn find_users_by_appointment(
        &self,
        appointment_id: DbId,
    ) -> Result<Vec<User>, StoreError> {
        Ok(UserRepo::list_by_appointment(&self.pool, appointment_id).await?)
    }

    async fn insert_booking(&self, input: &CreateBooking) -> Result<Booking, StoreError> {
        BookingRepo::create(&self.pool, input)
            .await
            .map_err(StoreError::classify)
    }
}
