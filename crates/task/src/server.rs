//! HTTP trigger for the sweep.
//!
//! `POST /invoke` runs one invocation and answers with its status code and
//! JSON body. `GET /health` reports whether the database is reachable.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use qr_sweep_core::cleanup::ResponseBody;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::factory::ConnectionFactory;
use crate::task::CleanupTask;

/// Shared handler state.
pub struct AppState<F> {
    pub task: Arc<CleanupTask<F>>,
}

impl<F> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            task: Arc::clone(&self.task),
        }
    }
}

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Whether the database is reachable.
    pub db_healthy: bool,
}

/// POST /invoke -- run one cleanup invocation.
async fn invoke<F>(State(state): State<AppState<F>>) -> (StatusCode, Json<ResponseBody>)
where
    F: ConnectionFactory + 'static,
{
    let response = state.task.invoke().await;
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body))
}

/// GET /health -- returns service and database health.
async fn health_check<F>(State(state): State<AppState<F>>) -> Json<HealthResponse>
where
    F: ConnectionFactory + 'static,
{
    let db_healthy = match state.task.check_database().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    let status = if db_healthy { "ok" } else { "degraded" };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Build the application router with tracing.
pub fn build_app<F>(task: Arc<CleanupTask<F>>) -> Router
where
    F: ConnectionFactory + 'static,
{
    Router::new()
        .route("/invoke", post(invoke::<F>))
        .route("/health", get(health_check::<F>))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { task })
}

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F, S>(
    task: Arc<CleanupTask<F>>,
    addr: SocketAddr,
    shutdown: S,
) -> std::io::Result<()>
where
    F: ConnectionFactory + 'static,
    S: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Cleanup trigger listening");

    axum::serve(listener, build_app(task))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Wait for a termination signal.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
