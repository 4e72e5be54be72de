//! Route definitions for the `/appointments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::appointments;
use crate::state::AppState;

/// Routes mounted at `/appointments`. All require authentication.
///
/// ```text
/// POST /               -> create_appointment
/// GET  /my             -> list_my_appointments
/// GET  /registered     -> list_registered_appointments
/// POST /join           -> join_appointment
/// GET  /{id}/users     -> list_attendees
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(appointments::create_appointment))
        .route("/my", get(appointments::list_my_appointments))
        .route("/registered", get(appointments::list_registered_appointments))
        .route("/join", post(appointments::join_appointment))
        .route("/{id}/users", get(appointments::list_attendees))
}
