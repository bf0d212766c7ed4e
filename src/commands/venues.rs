//! Commands for venue operations

use crate::models::venues::{Provenance, Venue, VenueDraft, VenueStatus};
use crate::services::venues::VenueService;
use crate::state::AppState;

fn service(state: &AppState, actor: Provenance) -> VenueService<'_> {
    VenueService::new(&state.remote, &state.cache, actor)
}

pub async fn list_venues(state: &AppState) -> Result<Vec<Venue>, String> {
    service(state, Provenance::User)
        .list()
        .await
        .map_err(|e| e.to_string())
}

pub async fn create_venue(
    state: &AppState,
    actor: Provenance,
    draft: VenueDraft,
) -> Result<Venue, String> {
    service(state, actor)
        .create(draft)
        .await
        .map_err(|e| e.to_string())
}

pub async fn update_venue(
    state: &AppState,
    actor: Provenance,
    id: &str,
    draft: VenueDraft,
) -> Result<Venue, String> {
    service(state, actor)
        .update(id, draft)
        .await
        .map_err(|e| e.to_string())
}

pub async fn set_venue_status(
    state: &AppState,
    actor: Provenance,
    id: &str,
    status: VenueStatus,
) -> Result<Venue, String> {
    service(state, actor)
        .set_status(id, status)
        .await
        .map_err(|e| e.to_string())
}

pub async fn delete_venue(state: &AppState, actor: Provenance, id: &str) -> Result<(), String> {
    service(state, actor)
        .delete(id)
        .await
        .map_err(|e| e.to_string())
}
