// src/scheduler.rs
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::relay::Relay;

/// Spawn the fixed-interval poll loop. The first tick fires immediately at
/// startup; manual triggers go through `Relay::run_cycle` directly and do
/// not alter the timer phase.
pub fn spawn_poll_scheduler(relay: Arc<Relay>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let report = relay.run_cycle().await;
            tracing::info!(
                target: "relay",
                fetched = report.fetched,
                announced = report.announced,
                skipped_seen = report.skipped_seen,
                send_failures = report.send_failures,
                "poll cycle complete"
            );
        }
    })
}
