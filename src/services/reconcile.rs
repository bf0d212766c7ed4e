//! Venue reconciliation.
//!
//! Merges three sources of venue truth into one list keyed by normalized name:
//! 1. the durable venues table (authoritative, includes every user edit)
//! 2. the local cache (read only when the durable table is unreachable)
//! 3. approved event requests (synthesize venues nobody has entered yet)
//!
//! Every pass folds the *full* approved-event set over the baseline, recomputing
//! `events_count` from zero. Running a pass twice over the same inputs gives the
//! same list. Passes never propagate errors: store and cache failures are logged and
//! the pass falls back to whatever it could read.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::Serialize;
use uuid::Uuid;

use crate::database::local::VenueCache;
use crate::database::store::{EventSource, VenueStore};
use crate::models::events::EventRequest;
use crate::models::venues::{
    normalize_name, EventDetails, Provenance, Venue, VenueStatus, DEFAULT_CAPACITY,
};

pub const DEFAULT_AMENITIES: [&str; 3] = ["Audio System", "Seating", "Lighting"];

// ============================================================================
// Pure fold
// ============================================================================

/// Result of folding events over a baseline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub venues: Vec<Venue>,
    /// Approved events with a venue that could not be associated
    pub skipped_events: usize,
    /// Positions in `venues` of the venues synthesized from events
    pub synthesized: Vec<usize>,
}

/// Stable id for a venue synthesized from events, derived from its key
pub fn synthesized_venue_id(key: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("eventdesk:venue:{}", key).as_bytes()).to_string()
}

fn participants(event: &EventRequest) -> u32 {
    event
        .expected_participants
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CAPACITY)
}

fn details_for(event: &EventRequest) -> EventDetails {
    EventDetails {
        event_name: event.title.clone(),
        event_date: event.date.clone(),
        participants_count: participants(event),
    }
}

fn synthesize(event: &EventRequest, name: &str, key: &str, now: &str) -> Venue {
    Venue {
        id: synthesized_venue_id(key),
        name: name.to_string(),
        location: name.to_string(),
        capacity: participants(event),
        description: Some(format!("Venue for {}", event.title.trim())),
        amenities: DEFAULT_AMENITIES.iter().map(|a| a.to_string()).collect(),
        image_reference: None,
        status: VenueStatus::Available,
        is_available: true,
        is_active: true,
        events_count: 1,
        event_details: Some(details_for(event)),
        created_by: Provenance::System,
        last_modified_by: Provenance::System,
        created_at: now.to_string(),
        updated_at: now.to_string(),
    }
}

/// Why an approved event with a venue cannot contribute to it
fn association_problem(event: &EventRequest) -> Option<&'static str> {
    if event.title.trim().is_empty() {
        Some("missing title")
    } else if event.date.trim().is_empty() {
        Some("missing date")
    } else {
        None
    }
}

/// Fold approved events over a baseline venue list.
///
/// Baseline venues keep every user-editable field. Only `events_count`,
/// `event_details`, `capacity` (never lowered) and `updated_at` are derived here.
/// Output order is first-seen key order: baseline first, then new venues in event order.
pub fn reconcile_venues(events: &[EventRequest], baseline: &[Venue], now: &str) -> Reconciled {
    let mut venues: Vec<Venue> = Vec::with_capacity(baseline.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    // Derived fields each seeded venue arrived with, to tell whether the pass changed it
    let mut arrived: Vec<Option<(u32, Option<EventDetails>)>> = Vec::new();

    for venue in baseline {
        let key = venue.key();
        if key.is_empty() {
            warn!("[reconcile] ignoring baseline venue {} with blank name", venue.id);
            continue;
        }
        if index.contains_key(&key) {
            warn!(
                "[reconcile] duplicate baseline venue '{}' ({}), keeping the first",
                venue.name, venue.id
            );
            continue;
        }

        let mut seeded = venue.clone();
        arrived.push(Some((seeded.events_count, seeded.event_details.take())));
        seeded.events_count = 0;
        index.insert(key, venues.len());
        venues.push(seeded);
    }

    let mut touched = vec![false; venues.len()];
    let mut skipped_events = 0;
    let mut synthesized = Vec::new();

    for event in events.iter().filter(|e| e.is_approved()) {
        let Some(name) = event.venue_name() else {
            continue;
        };
        if let Some(problem) = association_problem(event) {
            warn!("[reconcile] skipping event {}: {}", event.id, problem);
            skipped_events += 1;
            continue;
        }

        let key = normalize_name(name);
        match index.get(&key).copied() {
            Some(slot) => {
                let venue = &mut venues[slot];
                venue.events_count += 1;
                venue.capacity = venue.capacity.max(participants(event));
                venue.event_details = Some(details_for(event));
                venue.updated_at = now.to_string();
                touched[slot] = true;
            }
            None => {
                debug!("[reconcile] synthesizing venue '{}' from event {}", name, event.id);
                index.insert(key.clone(), venues.len());
                synthesized.push(venues.len());
                venues.push(synthesize(event, name, &key, now));
                arrived.push(None);
                touched.push(true);
            }
        }
    }

    // Seeded venues no event touched this pass: their snapshot is now empty
    for (slot, venue) in venues.iter_mut().enumerate() {
        if touched[slot] {
            continue;
        }
        if let Some((count, details)) = &arrived[slot] {
            if *count != 0 || details.is_some() {
                venue.updated_at = now.to_string();
            }
        }
    }

    Reconciled {
        venues,
        skipped_events,
        synthesized,
    }
}

/// Put synthesized venues back onto soft-deleted rows with the same key.
///
/// The dormant row keeps its id, name, user fields and provenance. The pass supplies
/// the derived fields and reactivates it. Returns how many venues were revived.
pub fn revive_dormant(venues: &mut [Venue], synthesized: &[usize], dormant: &[Venue]) -> usize {
    let mut by_key: HashMap<String, &Venue> = HashMap::new();
    for venue in dormant {
        by_key.entry(venue.key()).or_insert(venue);
    }

    let mut revived = 0;
    for &slot in synthesized {
        let Some(venue) = venues.get_mut(slot) else {
            continue;
        };
        let Some(old) = by_key.get(&venue.key()) else {
            continue;
        };

        let mut restored = (*old).clone();
        restored.is_active = true;
        restored.capacity = restored.capacity.max(venue.capacity);
        restored.events_count = venue.events_count;
        restored.event_details = venue.event_details.take();
        restored.updated_at = venue.updated_at.clone();
        info!(
            "[reconcile] reactivating deleted venue '{}' ({})",
            restored.name, restored.id
        );
        *venue = restored;
        revived += 1;
    }
    revived
}

// ============================================================================
// Service
// ============================================================================

/// Which tier supplied the baseline of a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineSource {
    Store,
    Cache,
    Empty,
}

/// Where the result of a pass ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persisted {
    Store,
    CacheOnly,
    Nothing,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub venues: Vec<Venue>,
    pub baseline: BaselineSource,
    pub persisted: Persisted,
    pub events_considered: usize,
    pub skipped_events: usize,
}

/// Runs reconciliation passes against the injected store, event source and cache
pub struct ReconcileService<'a> {
    pub store: &'a dyn VenueStore,
    pub events: &'a dyn EventSource,
    pub cache: &'a VenueCache,
}

impl<'a> ReconcileService<'a> {
    pub fn new(
        store: &'a dyn VenueStore,
        events: &'a dyn EventSource,
        cache: &'a VenueCache,
    ) -> Self {
        Self {
            store,
            events,
            cache,
        }
    }

    /// Three-tier baseline: durable store when reachable, else cache, else nothing.
    ///
    /// A reachable but empty store is still the store tier; the cache is not consulted.
    pub async fn resolve_baseline(&self) -> (Vec<Venue>, BaselineSource) {
        match self.store.list_active_venues().await {
            Ok(venues) => return (venues, BaselineSource::Store),
            Err(e) => warn!("[reconcile] venues store unreachable, trying cache: {}", e),
        }

        match self.cache.load().await {
            Ok(Some(venues)) => (
                venues.into_iter().filter(|v| v.is_active).collect(),
                BaselineSource::Cache,
            ),
            Ok(None) => {
                info!("[reconcile] cache empty, reconciling from events only");
                (Vec::new(), BaselineSource::Empty)
            }
            Err(e) => {
                warn!("[reconcile] cache unreadable, reconciling from events only: {}", e);
                (Vec::new(), BaselineSource::Empty)
            }
        }
    }

    pub async fn run_pass(&self) -> ReconcileOutcome {
        let now = chrono::Utc::now().to_rfc3339();
        self.run_pass_at(&now).await
    }

    /// One reconciliation pass stamped with `now`
    pub async fn run_pass_at(&self, now: &str) -> ReconcileOutcome {
        let (baseline, source) = self.resolve_baseline().await;

        let events = match self.events.list_approved_events().await {
            Ok(events) => events,
            Err(e) => {
                // Without the full event set a recompute would zero every count,
                // so hand back the baseline as read.
                warn!("[reconcile] event source unreachable, returning baseline: {}", e);
                return ReconcileOutcome {
                    venues: baseline,
                    baseline: source,
                    persisted: Persisted::Nothing,
                    events_considered: 0,
                    skipped_events: 0,
                };
            }
        };

        let Reconciled {
            mut venues,
            skipped_events,
            synthesized,
        } = reconcile_venues(&events, &baseline, now);

        let mut write_store = true;
        if !synthesized.is_empty() {
            match self.store.list_inactive_venues().await {
                Ok(dormant) => {
                    revive_dormant(&mut venues, &synthesized, &dormant);
                }
                Err(e) => {
                    // A new venue may collide with a deleted row we cannot see
                    warn!("[reconcile] cannot read deleted venues, keeping this pass local: {}", e);
                    write_store = false;
                }
            }
        }

        let persisted = self.persist(&venues, write_store).await;
        info!(
            "[reconcile] pass complete: {} venues from {} events (baseline: {:?}, persisted: {:?}, skipped: {})",
            venues.len(),
            events.len(),
            source,
            persisted,
            skipped_events
        );

        ReconcileOutcome {
            venues,
            baseline: source,
            persisted,
            events_considered: events.len(),
            skipped_events,
        }
    }

    /// Best-effort write: durable store first, local cache either way
    async fn persist(&self, venues: &[Venue], write_store: bool) -> Persisted {
        let stored = write_store
            && match self.store.upsert_venues(venues).await {
                Ok(()) => true,
                Err(e) => {
                    warn!("[reconcile] failed to persist venues, falling back to cache: {}", e);
                    false
                }
            };

        match self.cache.store(venues).await {
            Ok(()) if stored => Persisted::Store,
            Ok(()) => Persisted::CacheOnly,
            Err(e) => {
                warn!("[reconcile] failed to write venue cache: {}", e);
                if stored {
                    Persisted::Store
                } else {
                    Persisted::Nothing
                }
            }
        }
    }
}
