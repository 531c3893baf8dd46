//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Response Codes
///
/// - **307 Temporary Redirect**: `Location` holds the original URL
/// - **400 Bad Request**: the code is not a 16-character hex string
/// - **404 Not Found**: the code was never issued
/// - **410 Gone**: the link was deleted by its owner
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let origin = state.link_service.resolve(&code).await?;

    // Plain-text submissions are stored verbatim and may not fit in a header.
    let location = HeaderValue::from_str(&origin).map_err(|_| {
        AppError::internal(
            "Stored URL cannot be used as a redirect target",
            json!({ "code": code }),
        )
    })?;

    debug!(code = %code, "Redirecting");

    Ok((StatusCode::TEMPORARY_REDIRECT, [(header::LOCATION, location)]).into_response())
}
