#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use eventdesk_lib::database::local::{init_memory_cache_db, VenueCache};
use eventdesk_lib::database::remote::common::SyncError;
use eventdesk_lib::database::store::{EventSource, VenueStore};
use eventdesk_lib::models::events::EventRequest;
use eventdesk_lib::models::venues::{normalize_name, Provenance, Venue, VenueStatus};

fn unreachable_store() -> SyncError {
    SyncError::RequestFailed("connection refused".to_string())
}

/// Venues table kept in memory. Upserts match on exact name, like the hosted unique index.
#[derive(Default)]
pub struct MemoryVenueStore {
    rows: Mutex<Vec<Venue>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryVenueStore {
    pub fn with_rows(rows: Vec<Venue>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn rows(&self) -> Vec<Venue> {
        self.rows.lock().unwrap().clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_write(&self) -> Result<(), SyncError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl VenueStore for MemoryVenueStore {
    async fn list_active_venues(&self) -> Result<Vec<Venue>, SyncError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        let mut venues: Vec<Venue> = self.rows().into_iter().filter(|v| v.is_active).collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn list_inactive_venues(&self) -> Result<Vec<Venue>, SyncError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        let mut venues: Vec<Venue> = self.rows().into_iter().filter(|v| !v.is_active).collect();
        venues.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(venues)
    }

    async fn upsert_venues(&self, venues: &[Venue]) -> Result<(), SyncError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        for venue in venues {
            match rows.iter_mut().find(|row| row.name == venue.name) {
                Some(row) => *row = venue.clone(),
                None => rows.push(venue.clone()),
            }
        }
        Ok(())
    }

    async fn update_venue(&self, venue: &Venue) -> Result<(), SyncError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == venue.id)
            .ok_or_else(|| SyncError::ApiError {
                status: 404,
                message: format!("no venue {}", venue.id),
            })?;
        *row = venue.clone();
        Ok(())
    }

    async fn deactivate_venue(&self, id: &str, updated_at: &str) -> Result<(), SyncError> {
        self.check_write()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|row| row.id == id) {
            row.is_active = false;
            row.updated_at = updated_at.to_string();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEventSource {
    pub events: Mutex<Vec<EventRequest>>,
    pub fail: AtomicBool,
}

impl MemoryEventSource {
    pub fn with_events(events: Vec<EventRequest>) -> Self {
        Self {
            events: Mutex::new(events),
            ..Default::default()
        }
    }
}

#[async_trait]
impl EventSource for MemoryEventSource {
    async fn list_approved_events(&self) -> Result<Vec<EventRequest>, SyncError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(unreachable_store());
        }
        Ok(self.events.lock().unwrap().clone())
    }
}

pub async fn memory_cache() -> VenueCache {
    let db = init_memory_cache_db().await.expect("in-memory cache db");
    VenueCache::new(db.0)
}

pub fn approved(id: &str, venue: &str, title: &str, participants: Option<u32>) -> EventRequest {
    EventRequest {
        id: id.to_string(),
        title: title.to_string(),
        venue: Some(venue.to_string()),
        date: "2025-07-14".to_string(),
        expected_participants: participants,
        status: "approved".to_string(),
    }
}

pub fn deleted_venue(name: &str, capacity: u32) -> Venue {
    let mut venue = stored_venue(name, capacity);
    venue.is_active = false;
    venue
}

pub fn stored_venue(name: &str, capacity: u32) -> Venue {
    Venue {
        id: format!("db-{}", normalize_name(name).replace(' ', "-")),
        name: name.to_string(),
        location: format!("{} (Block A)", name),
        capacity,
        description: None,
        amenities: Vec::new(),
        image_reference: None,
        status: VenueStatus::Available,
        is_available: true,
        is_active: true,
        events_count: 0,
        event_details: None,
        created_by: Provenance::Admin,
        last_modified_by: Provenance::Admin,
        created_at: "2025-06-01T08:00:00+00:00".to_string(),
        updated_at: "2025-06-01T08:00:00+00:00".to_string(),
    }
}

/// No two venues share a normalized name
pub fn assert_unique_names(venues: &[Venue]) {
    let mut keys: Vec<String> = venues.iter().map(|v| v.key()).collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total, "duplicate venue names in {:?}", venues);
}
