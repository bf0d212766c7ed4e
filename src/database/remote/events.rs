// Remote reads of the event requests table

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use super::common::SyncError;
use super::RemoteStore;
use crate::database::store::EventSource;
use crate::models::events::{EventRequest, APPROVED_STATUS};

fn text_field(row: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match row.get(*key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Participants may be stored as a number or as numeric text
fn participants_field(row: &Value) -> Result<Option<u32>, String> {
    let raw = ["expected_participants", "expectedParticipants"]
        .iter()
        .find_map(|key| row.get(*key))
        .filter(|v| !v.is_null());

    let Some(raw) = raw else {
        return Ok(None);
    };

    let parsed = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.trim().is_empty() => return Ok(None),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n <= 0 => Ok(None),
        Some(n) => u32::try_from(n)
            .map(Some)
            .map_err(|_| format!("expected participants out of range: {}", n)),
        None => Err(format!("expected participants is not a number: {}", raw)),
    }
}

/// Decode one event row. Rows missing an id or title are rejected.
pub fn decode_event(row: &Value) -> Result<EventRequest, String> {
    let id = text_field(row, &["id"]).ok_or("missing id")?;
    let title = text_field(row, &["title", "event_name"])
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| format!("event {} has no title", id))?;
    let expected_participants =
        participants_field(row).map_err(|e| format!("event {}: {}", id, e))?;

    Ok(EventRequest {
        venue: text_field(row, &["venue", "venue_name"]),
        date: text_field(row, &["date", "event_date"]).unwrap_or_default(),
        status: text_field(row, &["status"]).unwrap_or_default(),
        id,
        title,
        expected_participants,
    })
}

#[async_trait]
impl EventSource for RemoteStore {
    async fn list_approved_events(&self) -> Result<Vec<EventRequest>, SyncError> {
        let query = format!("select=*&status=eq.{}&order=id.asc", APPROVED_STATUS);
        let rows: Vec<Value> = self
            .client
            .select(&self.events_table, &query, &self.access_token)
            .await?;

        let total = rows.len();
        let events: Vec<EventRequest> = rows
            .iter()
            .filter_map(|row| match decode_event(row) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("[events] skipping malformed event row: {}", e);
                    None
                }
            })
            .collect();

        debug!("[events] decoded {} of {} approved rows", events.len(), total);
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_numeric_ids_and_text_participants() {
        let event = decode_event(&json!({
            "id": 12,
            "title": "Orientation",
            "venue": "Main Hall",
            "date": "2025-07-14",
            "expected_participants": "80",
            "status": "approved"
        }))
        .unwrap();

        assert_eq!(event.id, "12");
        assert_eq!(event.expected_participants, Some(80));
        assert_eq!(event.venue_name(), Some("Main Hall"));
        assert!(event.is_approved());
    }

    #[test]
    fn non_positive_participants_mean_unknown() {
        let event = decode_event(&json!({
            "id": "e-1",
            "title": "Chess Club",
            "expected_participants": 0,
            "status": "approved"
        }))
        .unwrap();
        assert_eq!(event.expected_participants, None);
        assert_eq!(event.venue_name(), None);
    }

    #[test]
    fn malformed_rows_are_rejected() {
        assert!(decode_event(&json!({ "title": "No id" })).is_err());
        assert!(decode_event(&json!({ "id": 3, "title": "  " })).is_err());
        assert!(decode_event(&json!({
            "id": 4,
            "title": "Sports Day",
            "expected_participants": "many"
        }))
        .is_err());
    }

    #[test]
    fn alternate_column_names_are_accepted() {
        let event = decode_event(&json!({
            "id": "e-9",
            "event_name": "Science Fair",
            "venue_name": "Lab 2",
            "event_date": "2025-09-01",
            "expectedParticipants": 40,
            "status": "Approved"
        }))
        .unwrap();
        assert_eq!(event.title, "Science Fair");
        assert_eq!(event.venue.as_deref(), Some("Lab 2"));
        assert_eq!(event.date, "2025-09-01");
        assert_eq!(event.expected_participants, Some(40));
        assert!(event.is_approved());
    }
}
