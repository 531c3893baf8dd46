//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /{code}`  - Short link redirect
//! - `GET  /ping`    - Database liveness probe
//! - `POST /`        - Shorten a plain-text URL
//! - `/api/*`        - JSON API (see [`crate::api::routes`])
//!
//! # Middleware
//!
//! - **Identity** - Signed `user_id` cookie on every route that needs an owner
//! - **Compression** - Gzip responses, gzip request bodies
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{ping_handler, redirect_handler, shorten_text_handler};
use crate::api::middleware::{identity, tracing};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Router, middleware};
use tower::Layer;
use tower_http::compression::CompressionLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes whose handlers read the caller's [`Owner`](crate::domain::entities::Owner)
/// from request extensions.
///
/// The owner is not supplied here; [`app_routes`] adds the identity
/// middleware, tests may insert a fixed owner instead.
pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(shorten_text_handler))
        .nest("/api", api::routes::api_routes())
}

/// Routes that do not need an owner.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/{code}", get(redirect_handler))
        .route("/ping", get(ping_handler))
}

/// All routes with identity, compression and tracing applied.
pub fn app_routes(state: AppState) -> Router {
    let owned = owner_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        identity::layer,
    ));

    public_routes()
        .merge(owned)
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(RequestDecompressionLayer::new())
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(app_routes(state))
}
