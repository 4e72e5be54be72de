//! Domain rules for the booking backend.
//!
//! This crate has no I/O: it holds the shared error taxonomy, id/timestamp
//! aliases, and the pure scheduling rules used by the persistence and HTTP
//! layers.

pub mod error;
pub mod scheduling;
pub mod types;
