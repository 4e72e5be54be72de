//! Appointment scheduling engine.
//!
//! Validates a proposed window, rejects it if it overlaps any of the owner's
//! live appointments, then commits it with a fresh join code. The database
//! exclusion constraint backs the read-side overlap check, so a concurrent
//! insert that slips past the count still surfaces as [`SchedulingError::Overlap`].

use booking_core::scheduling::{
    generate_join_code, is_valid_join_code, normalize_join_code, validate_window, WindowError,
};
use booking_core::types::{DbId, Timestamp};
use booking_db::models::appointment::{Appointment, CreateAppointment};
use booking_db::models::booking::{Booking, CreateBooking};
use booking_db::models::user::User;
use booking_db::store::{SchedulingStore, StoreError};

/// Insert attempts before giving up on join-code collisions.
pub const MAX_JOIN_CODE_ATTEMPTS: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error(transparent)]
    InvalidRange(#[from] WindowError),

    #[error("Appointment overlaps an existing appointment")]
    Overlap,

    #[error("Could not allocate a unique join code")]
    JoinCodeCollision,

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("No appointment matches this join code")]
    UnknownJoinCode,

    #[error("Cannot register for your own appointment")]
    OwnAppointment,

    #[error("Already registered for this appointment")]
    AlreadyRegistered,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A proposed appointment as received from the caller.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Optional client-supplied duration; must equal `end_time - start_time`.
    pub duration_secs: Option<i64>,
}

pub struct SchedulingEngine<S> {
    store: S,
}

impl<S: SchedulingStore> SchedulingEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create_appointment(
        &self,
        owner_id: DbId,
        input: NewAppointment,
    ) -> Result<Appointment, SchedulingError> {
        let title = input.title.trim();
        validate_window(title, input.start_time, input.end_time, input.duration_secs)?;

        let overlapping = self
            .store
            .count_overlapping(owner_id, input.start_time, input.end_time)
            .await?;
        if overlapping > 0 {
            tracing::debug!(owner_id = %owner_id, overlapping, "Rejected overlapping appointment");
            return Err(SchedulingError::Overlap);
        }

        for attempt in 1..=MAX_JOIN_CODE_ATTEMPTS {
            let create = CreateAppointment {
                title: title.to_string(),
                start_time: input.start_time,
                end_time: input.end_time,
                user_id: owner_id,
                join_code: generate_join_code(),
            };

            match self.store.insert_appointment(&create).await {
                Ok(appointment) => {
                    tracing::info!(
                        appointment_id = %appointment.id,
                        owner_id = %owner_id,
                        "Appointment created",
                    );
                    return Ok(appointment);
                }
                Err(StoreError::DuplicateJoinCode) => {
                    tracing::warn!(attempt, "Join code collision, retrying");
                }
                Err(StoreError::Overlap) => {
                    tracing::debug!(owner_id = %owner_id, "Overlap detected at commit");
                    return Err(SchedulingError::Overlap);
                }
                Err(e) => return Err(SchedulingError::Store(e)),
            }
        }

        Err(SchedulingError::JoinCodeCollision)
    }

    pub async fn list_owned_appointments(
        &self,
        owner_id: DbId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.store.find_appointments_by_owner(owner_id).await?)
    }

    pub async fn list_registered_appointments(
        &self,
        user_id: DbId,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        Ok(self.store.find_appointments_by_attendee(user_id).await?)
    }

    /// Users registered for the appointment. Empty when nobody has booked.
    pub async fn list_attendees(&self, appointment_id: DbId) -> Result<Vec<User>, SchedulingError> {
        if self
            .store
            .find_appointment_by_id(appointment_id)
            .await?
            .is_none()
        {
            return Err(SchedulingError::NotFound {
                entity: "Appointment",
                id: appointment_id,
            });
        }
        Ok(self.store.find_users_by_appointment(appointment_id).await?)
    }

    /// Book `user_id` onto the appointment identified by `join_code`.
    ///
    /// The booking keeps a copy of the appointment window at this moment.
    pub async fn register_by_join_code(
        &self,
        user_id: DbId,
        join_code: &str,
    ) -> Result<Booking, SchedulingError> {
        let code = normalize_join_code(join_code);
        if !is_valid_join_code(&code) {
            return Err(SchedulingError::UnknownJoinCode);
        }

        let appointment = self
            .store
            .find_appointment_by_join_code(&code)
            .await?
            .ok_or(SchedulingError::UnknownJoinCode)?;

        if appointment.user_id == user_id {
            return Err(SchedulingError::OwnAppointment);
        }

        let create = CreateBooking {
            user_id,
            appointment_id: appointment.id,
            start_time: appointment.start_time,
            end_time: appointment.end_time,
        };
        match self.store.insert_booking(&create).await {
            Ok(booking) => {
                tracing::info!(
                    booking_id = %booking.id,
                    appointment_id = %appointment.id,
                    user_id = %user_id,
                    "Booking created",
                );
                Ok(booking)
            }
            Err(StoreError::DuplicateBooking) => Err(SchedulingError::AlreadyRegistered),
            Err(e) => Err(SchedulingError::Store(e)),
        }
    }
}
