//! Commands for venue reconciliation and the local cache

use std::future::Future;

use serde::Serialize;

use crate::models::venues::Venue;
use crate::services::poller;
use crate::services::reconcile::{ReconcileOutcome, ReconcileService};
use crate::state::AppState;

fn service(state: &AppState) -> ReconcileService<'_> {
    ReconcileService::new(&state.remote, &state.remote, &state.cache)
}

/// One pass. Never fails; see the outcome for where the data came from and went.
pub async fn reconcile_venues(state: &AppState) -> ReconcileOutcome {
    service(state).run_pass().await
}

/// Passes on the configured interval until `shutdown` resolves
pub async fn poll_venues<S, F>(state: &AppState, shutdown: S, on_pass: F) -> usize
where
    S: Future<Output = ()>,
    F: FnMut(&ReconcileOutcome),
{
    poller::poll_until(&service(state), state.config.poll_interval, shutdown, on_pass).await
}

/// What the cache slot holds and when it was written
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedVenues {
    pub written_at: Option<String>,
    pub venues: Option<Vec<Venue>>,
}

pub async fn show_cached_venues(state: &AppState) -> Result<CachedVenues, String> {
    let written_at = state.cache.written_at().await.map_err(|e| e.to_string())?;
    let venues = state.cache.load().await.map_err(|e| e.to_string())?;
    Ok(CachedVenues { written_at, venues })
}

pub async fn invalidate_cache(state: &AppState) -> Result<(), String> {
    state.cache.invalidate().await.map_err(|e| e.to_string())
}

pub async fn refresh_cache(state: &AppState) -> Result<usize, String> {
    state
        .cache
        .refresh(&state.remote)
        .await
        .map_err(|e| e.to_string())
}
