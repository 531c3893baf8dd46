//! Handlers for the caller's own links.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::user_links::UserLink;
use crate::domain::entities::Owner;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's live links.
///
/// # Endpoint
///
/// `GET /api/user/urls`
///
/// # Response Codes
///
/// - **200 OK**: array of `{ "short_url", "original_url" }`
/// - **204 No Content**: the caller has no live links
pub async fn user_links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
) -> Result<Response, AppError> {
    let links = state.link_service.links_by_owner(&owner).await?;

    if links.is_empty() {
        return Ok(StatusCode::NO_CONTENT.into_response());
    }

    let body: Vec<UserLink> = links
        .into_iter()
        .map(|(code, origin)| UserLink {
            short_url: state.link_service.short_url(&code),
            original_url: origin,
        })
        .collect();

    Ok(Json(body).into_response())
}

/// Queues the caller's links for deletion.
///
/// # Endpoint
///
/// `DELETE /api/user/urls`
///
/// # Request Body
///
/// ```json
/// ["3f2a9c1be07d4a11", "9b0e4d7c2a5f8e61"]
/// ```
///
/// Codes owned by someone else are ignored. Deletion happens in the
/// background; a later redirect to a deleted code answers 410.
///
/// # Errors
///
/// Returns 400 Bad Request for an empty array or a malformed code.
pub async fn delete_user_links_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    payload: Result<Json<Vec<String>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(codes) = payload.map_err(|rejection| {
        AppError::bad_request(
            "Invalid JSON body",
            json!({ "reason": rejection.body_text() }),
        )
    })?;

    state.link_service.delete_links(&owner, &codes)?;

    Ok(StatusCode::ACCEPTED)
}
