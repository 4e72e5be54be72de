pub mod appointments;
pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the API route tree.
///
/// Route hierarchy:
///
/// ```text
/// /users                         signup (public)
///
/// /login                         login (public)
/// /logout                        logout (public, clears cookie)
/// /auth/refresh                  refresh (requires token)
///
/// /appointments                  create (auth required)
/// /appointments/my               list owned
/// /appointments/registered       list booked
/// /appointments/join             register by join code
/// /appointments/{id}/users       list attendees
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Signup.
        .nest("/users", users::router())
        // Login, logout, refresh.
        .merge(auth::router())
        // Appointments and bookings.
        .nest("/appointments", appointments::router())
}
