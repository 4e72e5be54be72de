//! Route definitions for login, logout, and token refresh.

use axum::routing::post;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at the root.
///
/// ```text
/// POST /login          -> login
/// POST /logout         -> logout
/// POST /auth/refresh   -> refresh (bearer header or session cookie)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/auth/refresh", post(auth::refresh))
}
