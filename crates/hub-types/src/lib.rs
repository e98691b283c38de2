//! Shared API Types for the Airsoft Hub UI
//!
//! Single source of truth for everything crossing the HTTP boundary between
//! the events API and the WASM UI.
//!
//! ## Rules
//!
//! 1. Every field except `id` and `name` is optional on the wire; a missing
//!    field never fails deserialization of the whole record.
//! 2. A list payload that is not a JSON array is an error, never a crash.
//! 3. Array entries that cannot be read as an event are skipped, not fatal.

pub mod auth;
pub mod dates;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub use auth::{
    api_error_message, AuthRequest, AuthResponse, MeResponse, SavedEvent, NO_CLUB_LABEL,
};
pub use dates::{format_date_ddmmyyyy, parse_event_date};

/// Stable identifier of an event as issued by the API.
pub type EventId = u64;

// ============================================================================
// CATEGORY
// ============================================================================

/// Event category.
///
/// The API stores free text; anything absent, blank or unrecognised reads
/// as [`Category::Skirmish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Category {
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
    #[default]
    #[serde(rename = "Skirmish")]
    Skirmish,
}

impl Category {
    /// All categories in display order.
    pub fn all() -> &'static [Category] {
        &[
            Category::TwentyFourHour,
            Category::TwelveHour,
            Category::Skirmish,
        ]
    }

    /// Wire / display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::TwentyFourHour => "24h",
            Category::TwelveHour => "12h",
            Category::Skirmish => "Skirmish",
        }
    }

    /// Lenient parse used by the deserializer.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "24h" => Category::TwentyFourHour,
            "12h" => Category::TwelveHour,
            _ => Category::Skirmish,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.map(|s| Category::from_label(&s)).unwrap_or_default())
    }
}

// ============================================================================
// EVENTS API
// ============================================================================

/// Geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// One event as returned by `GET /api/events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    pub id: EventId,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default, alias = "latitude")]
    pub lat: Option<f64>,
    #[serde(default, alias = "longitude")]
    pub lng: Option<f64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub detailed_description: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub facebook_link: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub creator_email: Option<String>,
}

impl EventSummary {
    /// Minimal event, mostly for tests and fixtures.
    pub fn new(id: EventId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            date: None,
            location: None,
            category: Category::default(),
            lat: None,
            lng: None,
            description: None,
            detailed_description: None,
            thumbnail: None,
            facebook_link: None,
            creator_email: None,
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_position(mut self, lat: f64, lng: f64) -> Self {
        self.lat = Some(lat);
        self.lng = Some(lng);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_creator(mut self, email: impl Into<String>) -> Self {
        self.creator_email = Some(email.into());
        self
    }

    /// Position of the event, if both coordinates are present and finite.
    pub fn coordinates(&self) -> Option<LatLng> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => {
                Some(LatLng::new(lat, lng))
            }
            _ => None,
        }
    }
}

/// Body of `POST /api/events` and `PUT /api/events/{id}`.
///
/// The server binds snake_case fields; optional text is sent only when set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventDraft {
    pub name: String,
    pub date: String,
    pub location: String,
    pub category: Category,
    pub lat: f64,
    pub lng: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook_link: Option<String>,
}

/// Payload shape problems at the list boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("expected a JSON array, got {0}")]
    NotAnArray(&'static str),
}

/// Read an events payload.
///
/// Entries that are not objects with at least an integer `id` and a string
/// `name` are dropped with a warning.
pub fn parse_event_list(value: serde_json::Value) -> Result<Vec<EventSummary>, PayloadError> {
    let serde_json::Value::Array(items) = value else {
        return Err(PayloadError::NotAnArray(json_kind(&value)));
    };

    let mut events = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<EventSummary>(item) {
            Ok(event) => events.push(event),
            Err(e) => tracing::warn!("skipping event entry {}: {}", index, e),
        }
    }
    Ok(events)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Treat `null`, missing and whitespace-only strings alike.
pub(crate) fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn category_defaults_to_skirmish() {
        let event: EventSummary = serde_json::from_value(json!({"id": 1, "name": "A"})).unwrap();
        assert_eq!(event.category, Category::Skirmish);

        let blank: EventSummary =
            serde_json::from_value(json!({"id": 1, "name": "A", "category": "  "})).unwrap();
        assert_eq!(blank.category, Category::Skirmish);

        let null: EventSummary =
            serde_json::from_value(json!({"id": 1, "name": "A", "category": null})).unwrap();
        assert_eq!(null.category, Category::Skirmish);
    }

    #[test]
    fn category_reads_known_labels() {
        assert_eq!(Category::from_label("24h"), Category::TwentyFourHour);
        assert_eq!(Category::from_label("12H"), Category::TwelveHour);
        assert_eq!(Category::from_label("milsim"), Category::Skirmish);
        assert_eq!(
            serde_json::to_value(Category::TwentyFourHour).unwrap(),
            json!("24h")
        );
    }

    #[test]
    fn optional_fields_are_absent_tolerant() {
        let event: EventSummary = serde_json::from_value(json!({
            "id": 7,
            "name": "Night Op",
            "date": "",
            "location": "Zagreb",
            "lat": 45.8,
            "lng": 15.9
        }))
        .unwrap();

        assert_eq!(event.date, None);
        assert_eq!(event.location.as_deref(), Some("Zagreb"));
        assert_eq!(event.coordinates(), Some(LatLng::new(45.8, 15.9)));
    }

    #[test]
    fn coordinates_require_both_axes() {
        let mut event = EventSummary::new(1, "A");
        event.lat = Some(45.0);
        assert_eq!(event.coordinates(), None);

        let nan = EventSummary::new(2, "B").with_position(f64::NAN, 15.0);
        assert_eq!(nan.coordinates(), None);
    }

    #[test]
    fn draft_uses_server_field_names() {
        let draft = EventDraft {
            name: "Night Op".into(),
            date: "2024-06-01".into(),
            location: "Zagreb".into(),
            category: Category::TwelveHour,
            lat: 45.8,
            lng: 15.9,
            description: String::new(),
            detailed_description: Some("Bring NVGs".into()),
            facebook_link: None,
        };
        assert_eq!(
            serde_json::to_value(&draft).unwrap(),
            json!({
                "name": "Night Op",
                "date": "2024-06-01",
                "location": "Zagreb",
                "category": "12h",
                "lat": 45.8,
                "lng": 15.9,
                "description": "",
                "detailed_description": "Bring NVGs"
            })
        );
    }

    #[test]
    fn non_array_payload_is_an_error() {
        let err = parse_event_list(json!({"error": "boom"})).unwrap_err();
        assert_eq!(err, PayloadError::NotAnArray("an object"));
        assert!(err.to_string().contains("JSON array"));
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let events = parse_event_list(json!([
            {"id": 1, "name": "Alpha"},
            {"name": "no id"},
            {"id": "x", "name": "bad id"},
            42,
            {"id": 2, "name": "Beta", "date": "2024-05-01"}
        ]))
        .unwrap();

        let names: Vec<_> = events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }
}
