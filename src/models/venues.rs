use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Capacity and participant count used when a row or event does not say
pub const DEFAULT_CAPACITY: u32 = 50;

/// Booking state of a venue
#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[ts(export, export_to = "../bindings/venues.ts")]
pub enum VenueStatus {
    #[default]
    Available,
    Booked,
    Maintenance,
}

impl From<&str> for VenueStatus {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "booked" => VenueStatus::Booked,
            "maintenance" => VenueStatus::Maintenance,
            _ => VenueStatus::Available,
        }
    }
}

impl std::fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenueStatus::Available => write!(f, "Available"),
            VenueStatus::Booked => write!(f, "Booked"),
            VenueStatus::Maintenance => write!(f, "Maintenance"),
        }
    }
}

/// Who produced a venue record. Diagnostic only; never used to resolve conflicts.
#[derive(TS, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[ts(export, export_to = "../bindings/venues.ts")]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    System,
    Database,
    Organizer,
    Admin,
    User,
}

impl From<&str> for Provenance {
    fn from(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "system" => Provenance::System,
            "organizer" => Provenance::Organizer,
            "admin" => Provenance::Admin,
            "user" => Provenance::User,
            _ => Provenance::Database,
        }
    }
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::System => write!(f, "system"),
            Provenance::Database => write!(f, "database"),
            Provenance::Organizer => write!(f, "organizer"),
            Provenance::Admin => write!(f, "admin"),
            Provenance::User => write!(f, "user"),
        }
    }
}

/// Snapshot of the most recent approved event held at a venue
#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../bindings/venues.ts")]
#[ts(rename_all = "camelCase")]
pub struct EventDetails {
    pub event_name: String,
    pub event_date: String,
    #[ts(type = "number")]
    pub participants_count: u32,
}

#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../bindings/venues.ts")]
#[ts(rename_all = "camelCase")]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub location: String,
    #[ts(type = "number")]
    pub capacity: u32,
    pub description: Option<String>,
    pub amenities: Vec<String>,
    pub image_reference: Option<String>,
    pub status: VenueStatus,
    pub is_available: bool,
    pub is_active: bool,
    /// Approved events referencing this venue in the latest reconciliation pass.
    /// An approximation for the dashboard, not an attendance figure.
    #[ts(type = "number")]
    pub events_count: u32,
    pub event_details: Option<EventDetails>,
    pub created_by: Provenance,
    pub last_modified_by: Provenance,
    pub created_at: String,
    pub updated_at: String,
}

impl Venue {
    /// De-duplication key for this venue
    pub fn key(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn set_status(&mut self, status: VenueStatus) {
        self.status = status;
        self.is_available = status == VenueStatus::Available;
    }
}

/// Lowercased, trimmed venue name. Only used for matching; display names keep their casing.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// User-entered venue fields from the create/edit form
#[derive(TS, Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../bindings/venues.ts")]
#[ts(rename_all = "camelCase")]
pub struct VenueDraft {
    pub name: String,
    pub location: String,
    #[ts(type = "number")]
    pub capacity: i64,
    pub description: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub image_reference: Option<String>,
    #[serde(default)]
    pub status: VenueStatus,
}
