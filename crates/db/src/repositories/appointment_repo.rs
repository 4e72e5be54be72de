//! Repository for the `appointments` table.

use booking_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::appointment::{Appointment, CreateAppointment};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, title, start_time, end_time, user_id, join_code, deleted_at, created_at, updated_at";

/// Provides CRUD operations for appointments.
pub struct AppointmentRepo;

impl AppointmentRepo {
    /// Insert a new appointment, returning the created row.
    ///
    /// Fails with SQLSTATE `23P01` on `ex_appointments_owner_overlap` and
    /// `23505` on `uq_appointments_join_code`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAppointment,
    ) -> Result<Appointment, sqlx::Error> {
        let query = format!(
            "INSERT INTO appointments (title, start_time, end_time, user_id, join_code)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(&input.title)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.user_id)
            .bind(&input.join_code)
            .fetch_one(pool)
            .await
    }

    /// Find an appointment by internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Appointment>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM appointments WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Appointment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an appointment by its join code. Excludes soft-deleted rows.
    pub async fn find_by_join_code(
        pool: &PgPool,
        join_code: &str,
    ) -> Result<Option<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments WHERE join_code = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(join_code)
            .fetch_optional(pool)
            .await
    }

    /// List an owner's appointments in creation order.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM appointments
             WHERE user_id = $1 AND deleted_at IS NULL
             ORDER BY seq"
        );
        sqlx::query_as::<_, Appointment>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// List the appointments `user_id` holds a live booking for, in booking order.
    pub async fn list_by_attendee(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Appointment>, sqlx::Error> {
        let query = "SELECT a.id, a.title, a.start_time, a.end_time, a.user_id, a.join_code, \
                            a.deleted_at, a.created_at, a.updated_at
                     FROM bookings b
                     JOIN appointments a ON a.id = b.appointment_id
                     WHERE b.user_id = $1
                       AND b.deleted_at IS NULL
                       AND a.deleted_at IS NULL
                     ORDER BY b.seq";
        sqlx::query_as::<_, Appointment>(query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Count the owner's live appointments whose `[start_time, end_time)`
    /// overlaps `[start, end)`.
    pub async fn count_overlapping(
        pool: &PgPool,
        user_id: DbId,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM appointments
             WHERE user_id = $1
               AND deleted_at IS NULL
               AND NOT (end_time <= $2 OR start_time >= $3)",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Soft-delete an appointment by ID. Returns `true` if a row was marked deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE appointments SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
