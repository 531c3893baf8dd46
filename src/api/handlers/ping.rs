//! Handler for the database liveness probe.

use axum::{extract::State, http::StatusCode};
use tracing::warn;

use crate::state::AppState;

/// Checks that the relational store answers.
///
/// # Endpoint
///
/// `GET /ping`
///
/// # Response Codes
///
/// - **200 OK**: the PostgreSQL store is in use and reachable
/// - **500 Internal Server Error**: no database is in use, or it did not answer
pub async fn ping_handler(State(state): State<AppState>) -> StatusCode {
    match state.store.ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            warn!(backend = state.store.backend_name(), error = %e, "Ping failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
