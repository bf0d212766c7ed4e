use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const APPROVED_STATUS: &str = "approved";

/// An event request as read from the events table. Owned by the events side of the app;
/// venue reconciliation only reads it.
#[derive(TS, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../bindings/events.ts")]
#[ts(rename_all = "camelCase")]
pub struct EventRequest {
    pub id: String,
    pub title: String,
    pub venue: Option<String>,
    pub date: String,
    #[ts(type = "number | null")]
    pub expected_participants: Option<u32>,
    pub status: String,
}

impl EventRequest {
    pub fn is_approved(&self) -> bool {
        self.status.trim().eq_ignore_ascii_case(APPROVED_STATUS)
    }

    /// Venue name with surrounding whitespace removed, or None when blank
    pub fn venue_name(&self) -> Option<&str> {
        self.venue
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}
