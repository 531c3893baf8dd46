//! API route configuration.
//!
//! Every API route runs behind [`crate::api::middleware::identity`], which
//! supplies the caller's owner id.

use crate::api::handlers::{
    delete_user_links_handler, shorten_batch_handler, shorten_json_handler, stats_handler,
    user_links_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All routes nested under `/api`.
///
/// # Endpoints
///
/// - `POST   /shorten`         - Shorten one URL (JSON)
/// - `POST   /shorten/batch`   - Shorten several URLs with correlation ids
/// - `GET    /user/urls`       - List the caller's live links
/// - `DELETE /user/urls`       - Queue the caller's links for deletion
/// - `GET    /internal/stats`  - Link and owner totals
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_json_handler))
        .route("/shorten/batch", post(shorten_batch_handler))
        .route(
            "/user/urls",
            get(user_links_handler).delete(delete_user_links_handler),
        )
        .route("/internal/stats", get(stats_handler))
}
