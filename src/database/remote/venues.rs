// Remote CRUD operations for the venues table

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};

use super::common::SyncError;
use super::RemoteStore;
use crate::database::store::VenueStore;
use crate::models::venues::{EventDetails, Provenance, Venue, VenueStatus, DEFAULT_CAPACITY};

/// A row of the hosted `venues` table. Capacity is stored as text and amenities as
/// `facilities`; anything the table may leave null is optional here.
#[derive(Deserialize, Debug)]
struct VenueRow {
    #[serde(default)]
    id: serde_json::Value,
    name: String,
    description: Option<String>,
    capacity: Option<serde_json::Value>,
    location: Option<String>,
    facilities: Option<Vec<String>>,
    is_active: Option<bool>,
    image_url: Option<String>,
    status: Option<String>,
    events_count: Option<i64>,
    event_details: Option<EventDetails>,
    created_by: Option<String>,
    last_modified_by: Option<String>,
    created_at: Option<String>,
    updated_at: Option<String>,
}

/// Payload for upserting a venue to Supabase
#[derive(Serialize)]
struct VenuePayload<'a> {
    id: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    capacity: String,
    location: &'a str,
    facilities: &'a [String],
    is_active: bool,
    image_url: Option<&'a str>,
    status: String,
    events_count: u32,
    event_details: Option<&'a EventDetails>,
    created_by: String,
    last_modified_by: String,
    created_at: &'a str,
    updated_at: &'a str,
}

#[derive(Serialize)]
struct DeactivatePayload<'a> {
    is_active: bool,
    updated_at: &'a str,
}

impl<'a> From<&'a Venue> for VenuePayload<'a> {
    fn from(venue: &'a Venue) -> Self {
        Self {
            id: &venue.id,
            name: &venue.name,
            description: venue.description.as_deref(),
            capacity: venue.capacity.to_string(),
            location: &venue.location,
            facilities: &venue.amenities,
            is_active: venue.is_active,
            image_url: venue.image_reference.as_deref(),
            status: venue.status.to_string(),
            events_count: venue.events_count,
            event_details: venue.event_details.as_ref(),
            created_by: venue.created_by.to_string(),
            last_modified_by: venue.last_modified_by.to_string(),
            created_at: &venue.created_at,
            updated_at: &venue.updated_at,
        }
    }
}

/// Parse a capacity cell that may be text, a number, or garbage
fn parse_capacity(raw: Option<&serde_json::Value>, venue_name: &str) -> u32 {
    let parsed = match raw {
        Some(serde_json::Value::Number(n)) => n.as_u64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };

    match parsed.and_then(|n| u32::try_from(n).ok()).filter(|n| *n > 0) {
        Some(capacity) => capacity,
        None => {
            warn!(
                "[venues] venue '{}' has unusable capacity {:?}, using {}",
                venue_name, raw, DEFAULT_CAPACITY
            );
            DEFAULT_CAPACITY
        }
    }
}

fn id_to_string(id: &serde_json::Value) -> Result<String, SyncError> {
    match id {
        serde_json::Value::String(s) if !s.is_empty() => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        _ => Err(SyncError::MissingField("id".to_string())),
    }
}

impl TryFrom<VenueRow> for Venue {
    type Error = SyncError;

    fn try_from(row: VenueRow) -> Result<Self, Self::Error> {
        let id = id_to_string(&row.id)?;
        let capacity = parse_capacity(row.capacity.as_ref(), &row.name);
        let status = row
            .status
            .as_deref()
            .map(VenueStatus::from)
            .unwrap_or_default();
        let created_at = row.created_at.unwrap_or_default();
        let updated_at = row.updated_at.unwrap_or_else(|| created_at.clone());

        Ok(Venue {
            id,
            location: row
                .location
                .filter(|l| !l.trim().is_empty())
                .unwrap_or_else(|| row.name.clone()),
            name: row.name,
            capacity,
            description: row.description,
            amenities: row.facilities.unwrap_or_default(),
            image_reference: row.image_url,
            status,
            is_available: status == VenueStatus::Available,
            is_active: row.is_active.unwrap_or(true),
            events_count: row
                .events_count
                .and_then(|n| u32::try_from(n).ok())
                .unwrap_or(0),
            event_details: row.event_details,
            created_by: row
                .created_by
                .as_deref()
                .map(Provenance::from)
                .unwrap_or(Provenance::Database),
            last_modified_by: row
                .last_modified_by
                .as_deref()
                .map(Provenance::from)
                .unwrap_or(Provenance::Database),
            created_at,
            updated_at,
        })
    }
}

/// Decode rows one at a time so a single bad row does not hide the rest
fn decode_rows(rows: Vec<VenueRow>) -> Vec<Venue> {
    rows.into_iter()
        .filter_map(|row| {
            let name = row.name.clone();
            match Venue::try_from(row) {
                Ok(venue) => Some(venue),
                Err(e) => {
                    warn!("[venues] skipping venue row '{}': {}", name, e);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl VenueStore for RemoteStore {
    async fn list_active_venues(&self) -> Result<Vec<Venue>, SyncError> {
        let rows: Vec<VenueRow> = self
            .client
            .select(
                &self.venues_table,
                "select=*&is_active=eq.true&order=name.asc",
                &self.access_token,
            )
            .await?;

        Ok(decode_rows(rows))
    }

    async fn list_inactive_venues(&self) -> Result<Vec<Venue>, SyncError> {
        let rows: Vec<VenueRow> = self
            .client
            .select(
                &self.venues_table,
                "select=*&is_active=eq.false&order=name.asc",
                &self.access_token,
            )
            .await?;

        Ok(decode_rows(rows))
    }

    async fn upsert_venues(&self, venues: &[Venue]) -> Result<(), SyncError> {
        if venues.is_empty() {
            return Ok(());
        }
        let payload: Vec<VenuePayload> = venues.iter().map(VenuePayload::from).collect();
        self.client
            .upsert(&self.venues_table, &payload, "name", &self.access_token)
            .await
    }

    async fn update_venue(&self, venue: &Venue) -> Result<(), SyncError> {
        let payload = VenuePayload::from(venue);
        self.client
            .update(&self.venues_table, &venue.id, &payload, &self.access_token)
            .await
    }

    async fn deactivate_venue(&self, id: &str, updated_at: &str) -> Result<(), SyncError> {
        let payload = DeactivatePayload {
            is_active: false,
            updated_at,
        };
        self.client
            .update(&self.venues_table, id, &payload, &self.access_token)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: serde_json::Value) -> VenueRow {
        serde_json::from_value(value).expect("row should deserialize")
    }

    #[test]
    fn text_capacity_is_parsed() {
        let venue = Venue::try_from(row(json!({
            "id": 7,
            "name": "Main Hall",
            "capacity": " 120 ",
            "location": "Block A",
            "facilities": ["Projector"],
            "is_active": true,
            "image_url": "img-1",
            "created_at": "2025-07-01T00:00:00+00:00"
        })))
        .unwrap();

        assert_eq!(venue.id, "7");
        assert_eq!(venue.capacity, 120);
        assert_eq!(venue.amenities, vec!["Projector".to_string()]);
        assert_eq!(venue.image_reference.as_deref(), Some("img-1"));
        assert_eq!(venue.created_by, Provenance::Database);
        assert_eq!(venue.updated_at, "2025-07-01T00:00:00+00:00");
        assert!(venue.is_available);
    }

    #[test]
    fn bad_capacity_and_location_fall_back() {
        let venue = Venue::try_from(row(json!({
            "id": "abc",
            "name": "Gym",
            "capacity": "lots",
            "location": "  ",
            "status": "Maintenance"
        })))
        .unwrap();

        assert_eq!(venue.capacity, DEFAULT_CAPACITY);
        assert_eq!(venue.location, "Gym");
        assert_eq!(venue.status, VenueStatus::Maintenance);
        assert!(!venue.is_available);
    }

    #[test]
    fn rows_without_id_are_skipped() {
        let venues = decode_rows(vec![
            row(json!({ "id": null, "name": "Nowhere" })),
            row(json!({ "id": "v-1", "name": "Library", "capacity": 30 })),
        ]);
        assert_eq!(venues.len(), 1);
        assert_eq!(venues[0].name, "Library");
        assert_eq!(venues[0].capacity, 30);
    }

    #[test]
    fn payload_writes_capacity_as_text() {
        let venue = Venue::try_from(row(json!({
            "id": "v-1",
            "name": "Library",
            "capacity": 30,
            "created_by": "admin"
        })))
        .unwrap();
        let value = serde_json::to_value(VenuePayload::from(&venue)).unwrap();
        assert_eq!(value["capacity"], "30");
        assert_eq!(value["created_by"], "admin");
        assert_eq!(value["status"], "Available");
        assert_eq!(value["facilities"], json!([]));
    }
}
