//! Auth and account API types.

use serde::{Deserialize, Serialize};

use crate::{blank_as_none, EventId};

/// Shown when a profile has no club set.
pub const NO_CLUB_LABEL: &str = "No Club/Freelancer";

/// Body for `POST /api/auth/login` and `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(
        default,
        rename = "airsoftClub",
        alias = "airsoft_club",
        skip_serializing_if = "Option::is_none"
    )]
    pub airsoft_club: Option<String>,
}

impl AuthRequest {
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: None,
            airsoft_club: None,
        }
    }

    /// Register request. Blank profile fields are left out.
    pub fn register(
        email: impl Into<String>,
        password: impl Into<String>,
        username: &str,
        airsoft_club: &str,
    ) -> Self {
        let non_blank = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        Self {
            username: non_blank(username),
            airsoft_club: non_blank(airsoft_club),
            ..Self::login(email, password)
        }
    }
}

/// Response of the login / register endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub token: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub error: Option<String>,
}

/// `GET /api/auth/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeResponse {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub airsoft_club: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub error: Option<String>,
}

impl MeResponse {
    pub fn club_label(&self) -> &str {
        self.airsoft_club.as_deref().unwrap_or(NO_CLUB_LABEL)
    }
}

/// Entry of `GET /api/saved-events`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedEvent {
    pub id: EventId,
    pub name: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub location: Option<String>,
}

/// Extract the server's `{"error": "..."}` message, if any.
pub fn api_error_message(value: &serde_json::Value) -> Option<String> {
    value
        .get("error")
        .and_then(|e| e.as_str())
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string)
}
