//! Appointment scheduling rules.
//!
//! Pure functions only: interval overlap, appointment window validation, and
//! join-code generation. The persistence-backed engine in `booking-api`
//! composes these with the store.

use rand::Rng;

use crate::types::Timestamp;

/// Number of characters in a join code.
pub const JOIN_CODE_LENGTH: usize = 6;

/// Characters a join code is drawn from (uppercase letters and digits).
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

// ---------------------------------------------------------------------------
// Window validation
// ---------------------------------------------------------------------------

/// Reasons a proposed appointment window is rejected before any store access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("Title must not be empty")]
    BlankTitle,

    #[error("End time {end} is before start time {start}")]
    EndBeforeStart { start: Timestamp, end: Timestamp },

    #[error("Duration of {supplied_secs}s does not match the {actual_secs}s between start and end")]
    DurationMismatch { supplied_secs: i64, actual_secs: i64 },
}

/// Seconds between `start` and `end`.
pub fn duration_secs(start: Timestamp, end: Timestamp) -> i64 {
    (end - start).num_seconds()
}

/// Validate a proposed appointment window.
///
/// `end == start` is accepted. A supplied duration must equal `end - start`;
/// it is never stored.
pub fn validate_window(
    title: &str,
    start: Timestamp,
    end: Timestamp,
    supplied_duration_secs: Option<i64>,
) -> Result<(), WindowError> {
    if title.trim().is_empty() {
        return Err(WindowError::BlankTitle);
    }
    if end < start {
        return Err(WindowError::EndBeforeStart { start, end });
    }
    if let Some(supplied_secs) = supplied_duration_secs {
        let actual_secs = duration_secs(start, end);
        if supplied_secs != actual_secs {
            return Err(WindowError::DurationMismatch {
                supplied_secs,
                actual_secs,
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Overlap
// ---------------------------------------------------------------------------

/// Whether the half-open intervals `[a_start, a_end)` and `[b_start, b_end)`
/// overlap: `NOT (a_end <= b_start OR a_start >= b_end)`.
///
/// The same predicate is evaluated in SQL by the appointment repository.
pub fn intervals_overlap(
    a_start: Timestamp,
    a_end: Timestamp,
    b_start: Timestamp,
    b_end: Timestamp,
) -> bool {
    !(a_end <= b_start || a_start >= b_end)
}

// ---------------------------------------------------------------------------
// Join codes
// ---------------------------------------------------------------------------

/// Generate a random join code of [`JOIN_CODE_LENGTH`] characters.
///
/// Uniqueness is not guaranteed here; the `uq_appointments_join_code`
/// constraint is the backstop and callers retry on collision.
pub fn generate_join_code() -> String {
    let mut rng = rand::rng();
    (0..JOIN_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..JOIN_CODE_ALPHABET.len());
            char::from(JOIN_CODE_ALPHABET[idx])
        })
        .collect()
}

/// Trim and uppercase a user-supplied join code.
pub fn normalize_join_code(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Whether `code` has the shape of a join code (length and alphabet).
pub fn is_valid_join_code(code: &str) -> bool {
    code.len() == JOIN_CODE_LENGTH && code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b))
}
