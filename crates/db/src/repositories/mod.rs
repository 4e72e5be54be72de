//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Every read excludes
//! soft-deleted rows.

pub mod appointment_repo;
pub mod booking_repo;
pub mod user_repo;

pub use appointment_repo::AppointmentRepo;
pub use booking_repo::BookingRepo;
pub use user_repo::UserRepo;
