//! Fixed-interval reconciliation loop.
//!
//! Passes are not serialized against manual runs or other pollers: concurrent writers
//! race on the venues table and the last write wins until the next tick.

use std::future::Future;
use std::time::Duration;

use log::{debug, info};
use tokio::time::MissedTickBehavior;

use super::reconcile::{ReconcileOutcome, ReconcileService};

/// Run a pass every `interval` (the first immediately) until `shutdown` resolves.
/// `on_pass` sees each outcome. Returns the number of completed passes.
pub async fn poll_until<F, S>(
    service: &ReconcileService<'_>,
    interval: Duration,
    shutdown: S,
    mut on_pass: F,
) -> usize
where
    F: FnMut(&ReconcileOutcome),
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut passes = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("[poller] stopping after {} passes", passes);
                break;
            }
            _ = ticker.tick() => {
                let outcome = service.run_pass().await;
                passes += 1;
                debug!("[poller] pass {} produced {} venues", passes, outcome.venues.len());
                on_pass(&outcome);
            }
        }
    }
    passes
}
