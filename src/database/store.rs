//! Seams between the venue services and the hosted tables.
//!
//! `database::remote` implements these against Supabase; tests swap in in-memory fakes.

use async_trait::async_trait;

use crate::database::remote::common::SyncError;
use crate::models::events::EventRequest;
use crate::models::venues::Venue;

/// The durable venues table
#[async_trait]
pub trait VenueStore: Send + Sync {
    /// Venues that have not been soft-deleted, in stable (name) order
    async fn list_active_venues(&self) -> Result<Vec<Venue>, SyncError>;

    /// Soft-deleted venues, in name order
    async fn list_inactive_venues(&self) -> Result<Vec<Venue>, SyncError>;

    /// Insert or merge venues, matching existing rows by unique name
    async fn upsert_venues(&self, venues: &[Venue]) -> Result<(), SyncError>;

    /// Overwrite every column of an existing venue
    async fn update_venue(&self, venue: &Venue) -> Result<(), SyncError>;

    /// Mark a venue inactive
    async fn deactivate_venue(&self, id: &str, updated_at: &str) -> Result<(), SyncError>;
}

/// Read side of the event requests table
#[async_trait]
pub trait EventSource: Send + Sync {
    async fn list_approved_events(&self) -> Result<Vec<EventRequest>, SyncError>;
}
