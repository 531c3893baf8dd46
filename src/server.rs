//! HTTP server initialization and runtime setup.
//!
//! Handles store selection, delete pipeline startup, the Axum server
//! lifecycle and the ordered shutdown that follows it.

use crate::application::services::{IdentityService, LinkService};
use crate::config::Config;
use crate::domain::delete_pipeline::DeletePipeline;
use crate::infrastructure::Store;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage backend (PostgreSQL, snapshot file or memory)
/// - Soft-delete pipeline
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting connections, the delete
/// pipeline drains, and only then is the store closed.
///
/// # Errors
///
/// Returns an error if:
/// - Migrations fail or a snapshot file cannot be read
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let store = Arc::new(
        Store::select(&config)
            .await
            .context("Failed to initialise storage")?,
    );
    tracing::info!(backend = store.backend_name(), "Store ready");

    let (delete_queue, pipeline) = DeletePipeline::spawn(store.clone(), config.delete_workers);

    let identity = match &config.owner_signing_secret {
        Some(secret) => IdentityService::new(secret.as_bytes()),
        None => IdentityService::ephemeral().context("Failed to generate signing secret")?,
    };

    let link_service = LinkService::new(
        store.clone(),
        delete_queue,
        config.base_url.clone(),
        Duration::from_secs(config.store_timeout_seconds),
    );

    let state = AppState::new(Arc::new(link_service), store.clone(), Arc::new(identity));

    let app = app_router(state);

    let addr: SocketAddr = config.server_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    let served = axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracing::info!("Server stopped, draining delete pipeline");
    pipeline.shutdown().await;
    store.close().await;

    served?;

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
