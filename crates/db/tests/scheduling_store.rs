//! Integration tests for the repositories and the Postgres scheduling store.
//!
//! Exercises the persistence layer against a real database to verify that:
//! - Soft-deleted rows are hidden from lookups and lists
//! - The overlap count uses half-open windows
//! - Constraint violations surface as the matching `StoreError` variant

use assert_matches::assert_matches;
use booking_core::types::{DbId, Timestamp};
use booking_db::models::appointment::CreateAppointment;
use booking_db::models::booking::CreateBooking;
use booking_db::models::user::CreateUser;
use booking_db::repositories::{AppointmentRepo, BookingRepo, UserRepo};
use booking_db::store::{PgSchedulingStore, SchedulingStore, StoreError};
use chrono::{TimeZone, Utc};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn at(hour: u32, minute: u32) -> Timestamp {
    Utc.with_ymd_and_hms(2026, 3, 14, hour, minute, 0).unwrap()
}

async fn seed_user(pool: &PgPool, email: &str) -> DbId {
    UserRepo::create(
        pool,
        &CreateUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "not-a-real-hash".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

async fn count(pool: &PgPool, owner: DbId, start: Timestamp, end: Timestamp) -> i64 {
    AppointmentRepo::count_overlapping(pool, owner, start, end)
        .await
        .unwrap()
}

fn new_appointment(
    owner: DbId,
    title: &str,
    start: Timestamp,
    end: Timestamp,
    code: &str,
) -> CreateAppointment {
    CreateAppointment {
        title: title.to_string(),
        start_time: start,
        end_time: end,
        user_id: owner,
        join_code: code.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_user_by_email(pool: PgPool) {
    let id = seed_user(&pool, "a@x.com").await;

    let found = UserRepo::find_by_email(&pool, "a@x.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(id));

    let missing = UserRepo::find_by_email(&pool, "nobody@x.com").await.unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_live_email_rejected(pool: PgPool) {
    seed_user(&pool, "dup@x.com").await;

    let err = UserRepo::create(
        &pool,
        &CreateUser {
            name: "Second".to_string(),
            email: "dup@x.com".to_string(),
            password_hash: "h".to_string(),
        },
    )
    .await
    .unwrap_err();

    let db_err = err.as_database_error().expect("expected a database error");
    assert_eq!(db_err.code().as_deref(), Some("23505"));
    assert_eq!(db_err.constraint(), Some("uq_users_email"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_deleted_user_hidden_and_email_reusable(pool: PgPool) {
    let id = seed_user(&pool, "gone@x.com").await;

    assert!(UserRepo::soft_delete(&pool, id).await.unwrap());
    assert!(!UserRepo::soft_delete(&pool, id).await.unwrap());
    assert!(UserRepo::find_by_id(&pool, id).await.unwrap().is_none());
    assert!(UserRepo::find_by_email(&pool, "gone@x.com")
        .await
        .unwrap()
        .is_none());

    let again = seed_user(&pool, "gone@x.com").await;
    assert_ne!(again, id);
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_count_overlapping_uses_half_open_windows(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let other = seed_user(&pool, "other@x.com").await;
    AppointmentRepo::create(
        &pool,
        &new_appointment(owner, "Standup", at(10, 0), at(11, 0), "AAAAAA"),
    )
    .await
    .unwrap();

    assert_eq!(count(&pool, owner, at(10, 30), at(11, 30)).await, 1);
    assert_eq!(count(&pool, owner, at(9, 0), at(12, 0)).await, 1);
    assert_eq!(count(&pool, owner, at(11, 0), at(12, 0)).await, 0);
    assert_eq!(count(&pool, owner, at(9, 0), at(10, 0)).await, 0);

    // Another owner's calendar is independent.
    assert_eq!(count(&pool, other, at(10, 0), at(11, 0)).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_deleted_appointment_ignored(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let appt = AppointmentRepo::create(
        &pool,
        &new_appointment(owner, "Cancelled", at(10, 0), at(11, 0), "BBBBBB"),
    )
    .await
    .unwrap();

    assert!(AppointmentRepo::soft_delete(&pool, appt.id).await.unwrap());

    assert!(AppointmentRepo::find_by_id(&pool, appt.id)
        .await
        .unwrap()
        .is_none());
    assert!(AppointmentRepo::find_by_join_code(&pool, "BBBBBB")
        .await
        .unwrap()
        .is_none());
    assert!(AppointmentRepo::list_by_owner(&pool, owner)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(count(&pool, owner, at(10, 0), at(11, 0)).await, 0);

    // The freed slot can be taken again.
    AppointmentRepo::create(
        &pool,
        &new_appointment(owner, "Replacement", at(10, 0), at(11, 0), "CCCCCC"),
    )
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_owner_in_creation_order(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let store = PgSchedulingStore::new(pool.clone());

    let late = store
        .insert_appointment(&new_appointment(owner, "Late", at(15, 0), at(16, 0), "LATE01"))
        .await
        .unwrap();
    let early = store
        .insert_appointment(&new_appointment(owner, "Early", at(8, 0), at(9, 0), "EARLY1"))
        .await
        .unwrap();

    let listed: Vec<DbId> = store
        .find_appointments_by_owner(owner)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(listed, vec![late.id, early.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_same_transaction_inserts_list_in_insertion_order(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;

    // NOW() is fixed for a transaction, so every row shares one created_at.
    let mut tx = pool.begin().await.unwrap();
    let mut inserted = Vec::new();
    for (i, hour) in [9, 13, 10, 16, 11].into_iter().enumerate() {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO appointments (title, start_time, end_time, user_id, join_code)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(format!("Slot {i}"))
        .bind(at(hour, 0))
        .bind(at(hour, 30))
        .bind(owner)
        .bind(format!("BATCH{i}"))
        .fetch_one(&mut *tx)
        .await
        .unwrap();
        inserted.push(id);
    }
    tx.commit().await.unwrap();

    let listed: Vec<DbId> = AppointmentRepo::list_by_owner(&pool, owner)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert_eq!(listed, inserted);
}

// ---------------------------------------------------------------------------
// Store error classification
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_exclusion_constraint_maps_to_overlap(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let store = PgSchedulingStore::new(pool);

    store
        .insert_appointment(&new_appointment(owner, "First", at(10, 0), at(11, 0), "FIRST1"))
        .await
        .unwrap();

    // Bypasses the application-level count, as a racing request would.
    let result = store
        .insert_appointment(&new_appointment(owner, "Second", at(10, 30), at(11, 30), "SECND2"))
        .await;
    assert_matches!(result, Err(StoreError::Overlap));

    // Touching windows are allowed.
    store
        .insert_appointment(&new_appointment(owner, "Third", at(11, 0), at(12, 0), "THIRD3"))
        .await
        .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_join_code_classified(pool: PgPool) {
    let a = seed_user(&pool, "a@x.com").await;
    let b = seed_user(&pool, "b@x.com").await;
    let store = PgSchedulingStore::new(pool);

    store
        .insert_appointment(&new_appointment(a, "One", at(10, 0), at(11, 0), "SAME01"))
        .await
        .unwrap();
    let result = store
        .insert_appointment(&new_appointment(b, "Two", at(10, 0), at(11, 0), "SAME01"))
        .await;
    assert_matches!(result, Err(StoreError::DuplicateJoinCode));
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bookings_drive_attendee_queries(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let guest = seed_user(&pool, "guest@x.com").await;
    let store = PgSchedulingStore::new(pool.clone());

    let appt = store
        .insert_appointment(&new_appointment(owner, "Review", at(10, 0), at(11, 0), "REVIEW"))
        .await
        .unwrap();
    assert!(store
        .find_users_by_appointment(appt.id)
        .await
        .unwrap()
        .is_empty());

    let booking = store
        .insert_booking(&CreateBooking {
            user_id: guest,
            appointment_id: appt.id,
            start_time: appt.start_time,
            end_time: appt.end_time,
        })
        .await
        .unwrap();
    assert_eq!(booking.start_time, appt.start_time);

    let attendees = store.find_users_by_appointment(appt.id).await.unwrap();
    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees[0].id, guest);

    let registered = store.find_appointments_by_attendee(guest).await.unwrap();
    assert_eq!(registered.len(), 1);
    assert_eq!(registered[0].id, appt.id);

    assert!(BookingRepo::soft_delete(&pool, booking.id).await.unwrap());
    assert!(store
        .find_appointments_by_attendee(guest)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_booking_classified(pool: PgPool) {
    let owner = seed_user(&pool, "owner@x.com").await;
    let guest = seed_user(&pool, "guest@x.com").await;
    let store = PgSchedulingStore::new(pool);

    let appt = store
        .insert_appointment(&new_appointment(owner, "Review", at(10, 0), at(11, 0), "REVIEW"))
        .await
        .unwrap();
    let booking = CreateBooking {
        user_id: guest,
        appointment_id: appt.id,
        start_time: appt.start_time,
        end_time: appt.end_time,
    };

    store.insert_booking(&booking).await.unwrap();
    assert_matches!(
        store.insert_booking(&booking).await,
        Err(StoreError::DuplicateBooking)
    );
}
