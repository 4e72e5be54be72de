//! Liveness endpoint reporting database reachability and schema version.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok` when the database answers, `degraded` otherwise.
    pub status: &'static str,
    pub db_healthy: bool,
    /// Newest applied migration; `null` when the database is unreachable.
    pub schema_version: Option<i64>,
}

/// GET /health
///
/// Always 200 so load balancers can tell a degraded backend from a dead one.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let schema_version = booking_db::schema_version(&state.pool)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Health check could not reach the database"));

    Json(HealthResponse {
        status: if schema_version.is_ok() { "ok" } else { "degraded" },
        db_healthy: schema_version.is_ok(),
        schema_version: schema_version.ok().flatten(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
