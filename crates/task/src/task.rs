//! The cleanup task: one connection, one statement, one count.

use qr_sweep_core::cleanup::{CleanupOutcome, InvocationResponse};

use crate::error::CleanupError;
use crate::factory::{ConnectionFactory, SessionConnection};

/// Clears expired QR tokens through connections handed out by `F`.
///
/// Every call opens its own connection and closes it before returning,
/// so overlapping invocations never share state. Concurrent runs rely on
/// the database making the single UPDATE atomic.
pub struct CleanupTask<F> {
    factory: F,
}

impl<F: ConnectionFactory> CleanupTask<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Run the sweep once.
    ///
    /// Once a connection is open it is closed on every path, whether the
    /// statement succeeded or not. A failed close is logged and does not
    /// change the result.
    pub async fn run(&self) -> Result<CleanupOutcome, CleanupError> {
        let mut conn = self
            .factory
            .connect()
            .await
            .map_err(CleanupError::Connection)?;

        let cleared = conn.clear_expired_qr_tokens().await;
        release(conn).await;

        let rows_affected = cleared.map_err(CleanupError::Query)?;
        Ok(CleanupOutcome::new(rows_affected))
    }

    /// Run the sweep once and convert the result into the uniform
    /// response. Never fails; the error detail only goes to the log.
    pub async fn invoke(&self) -> InvocationResponse {
        match self.run().await {
            Ok(outcome) => {
                tracing::info!(
                    rows_affected = outcome.rows_affected,
                    "Cleaned up {} expired QR tokens",
                    outcome.rows_affected,
                );
                InvocationResponse::success(outcome)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = e.kind().as_str(),
                    "Expired QR token cleanup failed"
                );
                InvocationResponse::failure()
            }
        }
    }

    /// Check that a connection can be opened and answers a trivial query.
    pub async fn check_database(&self) -> Result<(), CleanupError> {
        let mut conn = self
            .factory
            .connect()
            .await
            .map_err(CleanupError::Connection)?;

        let pinged = conn.ping().await;
        release(conn).await;

        pinged.map_err(CleanupError::Query)
    }
}

async fn release<C: SessionConnection>(conn: C) {
    if let Err(e) = conn.close().await {
        tracing::warn!(error = %e, "Failed to close database connection");
    }
}
