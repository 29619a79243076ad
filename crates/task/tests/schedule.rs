//! The in-process schedule keeps invoking until cancelled.
//!
//! Time is paused, so sleeping only moves the tokio clock and tick counts
//! are exact.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Behaviour, FakeFactory};
use qr_sweep_task::{schedule, CleanupTask};
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn first_tick_runs_immediately_and_cancel_stops_loop() {
    let (factory, counters) = FakeFactory::new(Behaviour::Clears(0));
    let task = Arc::new(CleanupTask::new(factory));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(schedule::run(
        task,
        Duration::from_secs(3600),
        cancel.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(counters.statements(), 1);

    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(counters.statements(), 1);
    assert_eq!(counters.closes(), 1);
}

#[tokio::test(start_paused = true)]
async fn ticks_follow_the_interval() {
    let (factory, counters) = FakeFactory::new(Behaviour::Clears(2));
    let task = Arc::new(CleanupTask::new(factory));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(schedule::run(
        task,
        Duration::from_secs(60),
        cancel.clone(),
    ));

    // Ticks at 0s, 60s and 120s.
    tokio::time::sleep(Duration::from_secs(150)).await;
    assert_eq!(counters.statements(), 3);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(counters.statements(), 4);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failing_ticks_do_not_stop_the_loop() {
    let (factory, counters) = FakeFactory::new(Behaviour::QueryFails);
    let task = Arc::new(CleanupTask::new(factory));
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(schedule::run(
        task,
        Duration::from_millis(10),
        cancel.clone(),
    ));

    // Ticks at 0, 10, 20 and 30 ms.
    tokio::time::sleep(Duration::from_millis(35)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert_eq!(counters.statements(), 4);
    assert_eq!(counters.connects(), counters.closes());
}
