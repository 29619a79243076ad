//! In-process schedule for the sweep.
//!
//! Invokes the task on a fixed interval using `tokio::time::interval`.
//! Every tick is an independent invocation with its own connection; a
//! failed tick is logged by the task and the loop waits for the next one.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::factory::ConnectionFactory;
use crate::task::CleanupTask;

/// Run the cleanup loop until `cancel` is triggered.
///
/// The first invocation happens immediately.
pub async fn run<F: ConnectionFactory>(
    task: Arc<CleanupTask<F>>,
    every: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(
        interval_secs = every.as_secs(),
        "Expired QR token cleanup schedule started"
    );

    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Expired QR token cleanup schedule stopping");
                break;
            }
            _ = interval.tick() => {
                let response = task.invoke().await;
                if !response.is_success() {
                    tracing::debug!("Cleanup tick failed, waiting for next tick");
                }
            }
        }
    }
}
