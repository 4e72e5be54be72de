//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- access/session token issuance, verification, and refresh.

pub mod jwt;
pub mod password;
