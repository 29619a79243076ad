//! `qr-sweep` -- clears expired QR-login tokens from the `sessions` table.
//!
//! Runs a single UPDATE per invocation and reports how many rows it
//! changed. How it is triggered depends on `CLEANUP_MODE`:
//!
//! | Mode       | Behaviour                                                   |
//! |------------|-------------------------------------------------------------|
//! | `once`     | One invocation, JSON body on stdout, exit 0 (200) / 1 (500) |
//! | `serve`    | HTTP `POST /invoke` and `GET /health` on `HOST:PORT`         |
//! | `schedule` | Invoke every `CLEANUP_INTERVAL_SECS` until SIGINT/SIGTERM   |
//!
//! See [`TaskConfig::from_env`] for the full list of environment variables.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qr_sweep_task::config::{RunMode, TaskConfig};
use qr_sweep_task::{schedule, server, CleanupTask, PgConnectionFactory};

/// Exit code for configuration errors detected before any invocation.
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qr_sweep_task=info,qr_sweep_db=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match TaskConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let options = match config.connect_options() {
        Ok(options) => options,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    let ssl_mode = options.get_ssl_mode();
    if qr_sweep_db::is_unverified(ssl_mode) {
        tracing::warn!(
            ssl_mode = ?ssl_mode,
            "Database TLS does not verify the server certificate; set DB_TLS_MODE=verify-full to enforce it"
        );
    }

    tracing::info!(
        mode = ?config.mode,
        ssl_mode = ?ssl_mode,
        tls_explicit = config.tls.is_explicit(),
        statement_timeout_ms = config
            .statement_timeout
            .and_then(|t| u64::try_from(t.as_millis()).ok()),
        "Starting qr-sweep",
    );

    let task = Arc::new(CleanupTask::new(PgConnectionFactory::new(options)));

    match config.mode {
        RunMode::Once => run_once(&task).await,
        RunMode::Serve => {
            let addr = match config.host.parse() {
                Ok(ip) => SocketAddr::new(ip, config.port),
                Err(_) => {
                    tracing::error!(host = %config.host, "HOST is not a valid IP address");
                    return ExitCode::from(EXIT_CONFIG);
                }
            };
            match server::serve(task, addr, server::shutdown_signal()).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "HTTP trigger failed");
                    ExitCode::FAILURE
                }
            }
        }
        RunMode::Schedule => {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(schedule::run(task, config.interval, cancel.clone()));

            server::shutdown_signal().await;
            cancel.cancel();
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Cleanup schedule task panicked");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
    }
}

/// One invocation with the response body printed to stdout.
async fn run_once(task: &CleanupTask<PgConnectionFactory>) -> ExitCode {
    let response = task.invoke().await;

    match serde_json::to_string(&response.body) {
        Ok(body) => println!("{body}"),
        Err(e) => tracing::error!(error = %e, "Failed to serialize response body"),
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
