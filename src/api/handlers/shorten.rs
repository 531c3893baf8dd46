//! Handlers for link shortening endpoints.

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::debug;
use validator::Validate;

use crate::api::dto::shorten::{
    BatchShortenItem, BatchShortenResult, ShortenRequest, ShortenResponse,
};
use crate::domain::entities::{BatchItem, Owner};
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL sent as a plain-text body.
///
/// # Endpoint
///
/// `POST /`
///
/// # Response Codes
///
/// - **201 Created**: new short URL in the body as `text/plain`
/// - **409 Conflict**: the caller already shortened this URL; the existing
///   short URL is in the body
/// - **400 Bad Request**: empty body
pub async fn shorten_text_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    body: String,
) -> Result<Response, AppError> {
    let saved = state.link_service.shorten(&owner, &body).await?;
    let short_url = state.link_service.short_url(&saved.code);

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        short_url,
    )
        .into_response())
}

/// Shortens a single URL sent as JSON.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com" }
/// ```
///
/// # Response
///
/// ```json
/// { "result": "http://localhost:8080/3f2a9c1be07d4a11" }
/// ```
///
/// Returned with 201 when created and 409 when the caller already had it.
pub async fn shorten_json_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload.map_err(reject_json)?;
    payload.validate()?;

    let saved = state.link_service.shorten(&owner, &payload.url).await?;
    let response = ShortenResponse {
        result: state.link_service.short_url(&saved.code),
    };

    let status = if saved.created {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };

    Ok((status, Json(response)).into_response())
}

/// Shortens several URLs at once.
///
/// # Endpoint
///
/// `POST /api/shorten/batch`
///
/// # Batch Processing
///
/// Entries with an invalid URL and URLs the caller already shortened are
/// left out of the response; the others are stored together.
///
/// # Request Body
///
/// ```json
/// [
///   { "correlation_id": "1", "original_url": "https://example.com" }
/// ]
/// ```
///
/// # Response
///
/// ```json
/// [
///   { "correlation_id": "1", "short_url": "http://localhost:8080/3f2a9c1be07d4a11" }
/// ]
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for an empty array.
pub async fn shorten_batch_handler(
    State(state): State<AppState>,
    Extension(owner): Extension<Owner>,
    payload: Result<Json<Vec<BatchShortenItem>>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<BatchShortenResult>>), AppError> {
    let Json(items) = payload.map_err(reject_json)?;

    if items.is_empty() {
        return Err(AppError::bad_request(
            "Batch must not be empty",
            json!({}),
        ));
    }

    let submitted = items.len();
    let items: Vec<BatchItem> = items
        .into_iter()
        .filter(|item| item.validate().is_ok())
        .map(|item| BatchItem::new(item.correlation_id, item.original_url))
        .collect();

    if items.len() < submitted {
        debug!(
            dropped = submitted - items.len(),
            "Invalid batch entries dropped"
        );
    }

    let results = if items.is_empty() {
        Vec::new()
    } else {
        state.link_service.shorten_batch(&owner, items).await?
    };

    let body = results
        .into_iter()
        .map(|result| BatchShortenResult {
            short_url: state.link_service.short_url(&result.code),
            correlation_id: result.correlation_id,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(body)))
}

fn reject_json(rejection: JsonRejection) -> AppError {
    AppError::bad_request(
        "Invalid JSON body",
        json!({ "reason": rejection.body_text() }),
    )
}
