//! Scheduling engine.
//!
//! Composes the pure rules from `booking_core::scheduling` with a
//! [`booking_db::store::SchedulingStore`] to create appointments without
//! owner-level overlaps and to manage bookings.

pub mod scheduling;
