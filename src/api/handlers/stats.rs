//! Handler for service-wide statistics.

use axum::{Json, extract::State};

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns link and owner totals.
///
/// # Endpoint
///
/// `GET /api/internal/stats`
///
/// # Response
///
/// ```json
/// { "urls": 42, "users": 7 }
/// ```
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<StatsResponse>, AppError> {
    let stats = state.link_service.stats().await?;

    Ok(Json(stats.into()))
}
