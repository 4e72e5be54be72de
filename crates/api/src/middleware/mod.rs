//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- resolves the caller from a bearer header or the
//!   session cookie.

pub mod auth;
