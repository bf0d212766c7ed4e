//! Local fallback copy of the reconciled venue list.
//!
//! The list lives in one key-value slot as a serialized array. It is only read when
//! the hosted venues table cannot be reached.

use std::fmt;

use log::debug;
use sqlx::SqlitePool;

use crate::database::remote::common::SyncError;
use crate::database::store::VenueStore;
use crate::models::venues::Venue;

pub const SHARED_VENUES_SLOT: &str = "global_venues_shared";

#[derive(Debug)]
pub enum CacheError {
    /// Local database query failed
    Database(String),
    /// Slot contents could not be (de)serialized
    Serialization(String),
    /// Refresh could not read the durable store
    Source(SyncError),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Database(msg) => write!(f, "Cache database error: {}", msg),
            CacheError::Serialization(msg) => write!(f, "Cache serialization error: {}", msg),
            CacheError::Source(e) => write!(f, "Cache refresh failed: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

#[derive(sqlx::FromRow)]
struct SlotRow {
    value: String,
    written_at: String,
}

/// Handle to one cache slot. Passed explicitly to whatever needs the fallback list.
#[derive(Clone)]
pub struct VenueCache {
    pool: SqlitePool,
    slot: String,
}

impl VenueCache {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_slot(pool, SHARED_VENUES_SLOT)
    }

    pub fn with_slot(pool: SqlitePool, slot: &str) -> Self {
        Self {
            pool,
            slot: slot.to_string(),
        }
    }

    async fn read_slot(&self) -> Result<Option<SlotRow>, CacheError> {
        sqlx::query_as::<_, SlotRow>("SELECT value, written_at FROM cache_slots WHERE key = ?")
            .bind(&self.slot)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CacheError::Database(format!("Failed to read cache slot: {}", e)))
    }

    /// Last stored list, or None if the slot is empty
    pub async fn load(&self) -> Result<Option<Vec<Venue>>, CacheError> {
        let Some(row) = self.read_slot().await? else {
            return Ok(None);
        };

        let venues: Vec<Venue> = serde_json::from_str(&row.value)
            .map_err(|e| CacheError::Serialization(format!("Failed to parse cached venues: {}", e)))?;
        Ok(Some(venues))
    }

    /// When the slot was last written, if ever
    pub async fn written_at(&self) -> Result<Option<String>, CacheError> {
        Ok(self.read_slot().await?.map(|row| row.written_at))
    }

    /// Replace the slot contents
    pub async fn store(&self, venues: &[Venue]) -> Result<(), CacheError> {
        let value = serde_json::to_string(venues)
            .map_err(|e| CacheError::Serialization(format!("Failed to encode venues: {}", e)))?;
        let written_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO cache_slots (key, value, written_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, written_at = excluded.written_at",
        )
        .bind(&self.slot)
        .bind(&value)
        .bind(&written_at)
        .execute(&self.pool)
        .await
        .map_err(|e| CacheError::Database(format!("Failed to write cache slot: {}", e)))?;

        debug!("[cache] stored {} venues in '{}'", venues.len(), self.slot);
        Ok(())
    }

    /// Drop the slot so the next fallback read finds nothing
    pub async fn invalidate(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM cache_slots WHERE key = ?")
            .bind(&self.slot)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::Database(format!("Failed to clear cache slot: {}", e)))?;

        debug!("[cache] invalidated '{}'", self.slot);
        Ok(())
    }

    /// Re-read the active venues from the durable store and store them.
    /// Leaves the slot untouched if the store cannot be read.
    pub async fn refresh(&self, store: &dyn VenueStore) -> Result<usize, CacheError> {
        let venues = store
            .list_active_venues()
            .await
            .map_err(CacheError::Source)?;
        self.store(&venues).await?;
        Ok(venues.len())
    }
}
