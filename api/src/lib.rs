//! HTTP surface of the RAG front end.
//!
//! [`router`] wires the handlers over a shared [`AppState`]; [`start`] binds
//! the configured address and serves until Ctrl+C.

pub mod core;
pub mod error_handler;
mod middleware_layer;
mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::{app_config::AppConfig, app_state::AppState};
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::error_mapper::json_error_mapper,
    routes::{
        ask::ask_route::ask_route, health::health_route::health_route, index_route::index_route,
        ingestion::ingestion_status_route::ingestion_status_route, sync::sync_route::sync_route,
        sync::sync_status_route::sync_status_route, upload::upload_route::upload_route,
    },
};

/// Builds the application router over `state`.
pub fn router<K, D, G>(state: Arc<AppState<K, D, G>>) -> Router
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index_route))
        .route("/health", get(health_route::<K, D, G>))
        .route("/upload", post(upload_route::<K, D, G>))
        .route("/sync", post(sync_route::<K, D, G>))
        .route("/sync/status", get(sync_status_route::<K, D, G>))
        .route(
            "/ingestion-status/{job_id}",
            get(ingestion_status_route::<K, D, G>),
        )
        .route("/ask", post(ask_route::<K, D, G>))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Serves [`router`] on `state.config.bind_addr()` with graceful shutdown.
///
/// # Errors
/// [`AppError::Bind`] if the address cannot be bound, [`AppError::Server`]
/// if serving fails.
pub async fn start<K, D, G>(state: Arc<AppState<K, D, G>>) -> AppResult<()>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let addr = state.config.bind_addr();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(AppError::Bind)?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("HTTP server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed. If the handler cannot be installed the
/// server keeps running until killed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
