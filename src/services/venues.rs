//! Business logic for explicit venue edits.
//!
//! Unlike reconciliation, an explicit create/update overwrites every user-editable
//! field. Creating a name that already exists (in any casing) edits that venue in
//! place so names stay unique. Deletes only flip `is_active`.

use std::fmt;

use log::{info, warn};
use uuid::Uuid;

use crate::database::local::{CacheError, VenueCache};
use crate::database::remote::common::SyncError;
use crate::database::store::VenueStore;
use crate::models::venues::{normalize_name, Provenance, Venue, VenueDraft, VenueStatus};

#[derive(Debug)]
pub enum VenueError {
    /// Input rejected before anything was written; the message is user-facing
    Validation(String),
    /// No active venue with this id
    NotFound(String),
    /// Durable store call failed
    Remote(SyncError),
    /// Local cache call failed
    Cache(CacheError),
}

impl From<SyncError> for VenueError {
    fn from(e: SyncError) -> Self {
        VenueError::Remote(e)
    }
}

impl From<CacheError> for VenueError {
    fn from(e: CacheError) -> Self {
        VenueError::Cache(e)
    }
}

impl fmt::Display for VenueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueError::Validation(msg) => write!(f, "{}", msg),
            VenueError::NotFound(id) => write!(f, "Venue {} not found", id),
            VenueError::Remote(e) => write!(f, "Could not save venue: {}", e),
            VenueError::Cache(e) => write!(f, "Could not update local venues: {}", e),
        }
    }
}

impl std::error::Error for VenueError {}

/// Check form input. Returns the first problem found.
pub fn validate_draft(draft: &VenueDraft) -> Result<(), VenueError> {
    if draft.name.trim().is_empty() {
        return Err(VenueError::Validation("Venue name is required".to_string()));
    }
    if draft.location.trim().is_empty() {
        return Err(VenueError::Validation(
            "Venue location is required".to_string(),
        ));
    }
    if draft.capacity <= 0 {
        return Err(VenueError::Validation(
            "Capacity must be greater than zero".to_string(),
        ));
    }
    if u32::try_from(draft.capacity).is_err() {
        return Err(VenueError::Validation(format!(
            "Capacity must be at most {}",
            u32::MAX
        )));
    }
    Ok(())
}

/// Overwrite every user-editable field of `venue` with the draft
fn apply_draft(venue: &mut Venue, draft: &VenueDraft, actor: Provenance, now: &str) {
    venue.name = draft.name.trim().to_string();
    venue.location = draft.location.trim().to_string();
    venue.capacity = draft.capacity as u32;
    venue.description = draft
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    venue.amenities = draft
        .amenities
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .map(str::to_string)
        .collect();
    venue.image_reference = draft.image_reference.clone();
    venue.set_status(draft.status);
    venue.last_modified_by = actor;
    venue.updated_at = now.to_string();
}

/// Explicit venue edits on behalf of `actor`
pub struct VenueService<'a> {
    pub store: &'a dyn VenueStore,
    pub cache: &'a VenueCache,
    pub actor: Provenance,
}

impl<'a> VenueService<'a> {
    pub fn new(store: &'a dyn VenueStore, cache: &'a VenueCache, actor: Provenance) -> Self {
        Self {
            store,
            cache,
            actor,
        }
    }

    /// Active venues from the durable store, or the cached list if it is unreachable
    pub async fn list(&self) -> Result<Vec<Venue>, VenueError> {
        match self.store.list_active_venues().await {
            Ok(venues) => Ok(venues),
            Err(e) => {
                warn!("[venues] store unreachable, listing cached venues: {}", e);
                match self.cache.load().await? {
                    Some(venues) => Ok(venues.into_iter().filter(|v| v.is_active).collect()),
                    None => Err(VenueError::Remote(e)),
                }
            }
        }
    }

    async fn find_active(&self, id: &str) -> Result<(Vec<Venue>, usize), VenueError> {
        let venues = self.store.list_active_venues().await?;
        let position = venues
            .iter()
            .position(|v| v.id == id)
            .ok_or_else(|| VenueError::NotFound(id.to_string()))?;
        Ok((venues, position))
    }

    /// Create a venue, or edit in place when the name is already taken
    pub async fn create(&self, draft: VenueDraft) -> Result<Venue, VenueError> {
        validate_draft(&draft)?;
        let now = chrono::Utc::now().to_rfc3339();
        let key = normalize_name(&draft.name);

        let venues = self.store.list_active_venues().await?;
        let venue = match venues.into_iter().find(|v| v.key() == key) {
            Some(mut existing) => {
                info!(
                    "[venues] '{}' already exists as {}, updating in place",
                    draft.name.trim(),
                    existing.id
                );
                apply_draft(&mut existing, &draft, self.actor, &now);
                self.store.update_venue(&existing).await?;
                existing
            }
            None => match self.find_deleted(&key).await? {
                Some(mut dormant) => {
                    info!(
                        "[venues] '{}' was deleted as {}, reactivating it",
                        draft.name.trim(),
                        dormant.id
                    );
                    apply_draft(&mut dormant, &draft, self.actor, &now);
                    dormant.is_active = true;
                    self.store.update_venue(&dormant).await?;
                    dormant
                }
                None => self.insert_new(&draft, &now).await?,
            },
        };

        self.refresh_cache().await;
        Ok(venue)
    }

    async fn find_deleted(&self, key: &str) -> Result<Option<Venue>, VenueError> {
        let deleted = self.store.list_inactive_venues().await?;
        Ok(deleted.into_iter().find(|v| v.key() == key))
    }

    async fn insert_new(&self, draft: &VenueDraft, now: &str) -> Result<Venue, VenueError> {
        let mut venue = Venue {
            id: Uuid::new_v4().to_string(),
            name: String::new(),
            location: String::new(),
            capacity: 0,
            description: None,
            amenities: Vec::new(),
            image_reference: None,
            status: VenueStatus::Available,
            is_available: true,
            is_active: true,
            events_count: 0,
            event_details: None,
            created_by: self.actor,
            last_modified_by: self.actor,
            created_at: now.to_string(),
            updated_at: now.to_string(),
        };
        apply_draft(&mut venue, draft, self.actor, now);
        self.store.upsert_venues(std::slice::from_ref(&venue)).await?;
        Ok(venue)
    }

    /// Full overwrite of an existing venue's editable fields
    pub async fn update(&self, id: &str, draft: VenueDraft) -> Result<Venue, VenueError> {
        validate_draft(&draft)?;
        let now = chrono::Utc::now().to_rfc3339();
        let (mut venues, position) = self.find_active(id).await?;

        let key = normalize_name(&draft.name);
        if let Some(other) = venues.iter().find(|v| v.id != id && v.key() == key) {
            return Err(VenueError::Validation(format!(
                "A venue named '{}' already exists",
                other.name
            )));
        }

        let mut venue = venues.swap_remove(position);
        apply_draft(&mut venue, &draft, self.actor, &now);
        self.store.update_venue(&venue).await?;

        self.refresh_cache().await;
        Ok(venue)
    }

    pub async fn set_status(&self, id: &str, status: VenueStatus) -> Result<Venue, VenueError> {
        let (mut venues, position) = self.find_active(id).await?;
        let mut venue = venues.swap_remove(position);
        venue.set_status(status);
        venue.last_modified_by = self.actor;
        venue.updated_at = chrono::Utc::now().to_rfc3339();
        self.store.update_venue(&venue).await?;

        self.refresh_cache().await;
        Ok(venue)
    }

    /// Soft delete. The venue drops out of listings and reconciliation seeding.
    pub async fn delete(&self, id: &str) -> Result<(), VenueError> {
        self.find_active(id).await?;
        let now = chrono::Utc::now().to_rfc3339();
        self.store.deactivate_venue(id, &now).await?;
        info!("[venues] deactivated venue {}", id);

        self.refresh_cache().await;
        Ok(())
    }

    /// Keep the fallback list in step with an edit that already reached the store
    async fn refresh_cache(&self) {
        if let Err(e) = self.cache.refresh(self.store).await {
            warn!("[venues] failed to refresh venue cache: {}", e);
        }
    }
}
