//! Hub configuration.
//!
//! Schema of `config/hub_settings.yaml`. Every section has defaults, so a
//! partial file (or none at all) is valid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    pub api: ApiConfig,
    pub storage: StorageKeys,
    pub focus: FocusConfig,
    pub map: MapConfig,
}

/// REST endpoints of the events/auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Prefix for every path. Empty means same origin as the page.
    pub base_url: String,
    pub events_path: String,
    pub login_path: String,
    pub register_path: String,
    pub me_path: String,
    pub saved_events_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            events_path: "/api/events".to_string(),
            login_path: "/api/auth/login".to_string(),
            register_path: "/api/auth/register".to_string(),
            me_path: "/api/auth/me".to_string(),
            saved_events_path: "/api/saved-events".to_string(),
        }
    }
}

/// Persistent key-value storage keys for the auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub token: String,
    pub email: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "authToken".to_string(),
            email: "authEmail".to_string(),
        }
    }
}

/// Focus coordinator tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Delay between starting the fly-to and opening the callout (seconds).
    /// Must outlast the camera animation.
    pub settle_delay_secs: f64,

    /// Zoom the fly-to aims for when the map is zoomed further out.
    pub focus_zoom: f64,

    /// The fly-to never zooms in past this.
    pub max_focus_zoom: f64,

    /// Vertical nudge after the callout opens, as a fraction of the viewport
    /// height, so the callout clears the header.
    pub callout_nudge_fraction: f64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            settle_delay_secs: 0.45,
            focus_zoom: 11.0,
            max_focus_zoom: 13.0,
            callout_nudge_fraction: 0.18,
        }
    }
}

impl FocusConfig {
    /// Zoom for a fly-to starting at `current`: never out past the current
    /// zoom, never in past `max_focus_zoom`.
    pub fn bounded_zoom(&self, current: f64) -> f64 {
        if current >= self.max_focus_zoom {
            current
        } else {
            self.focus_zoom.max(current).min(self.max_focus_zoom)
        }
    }
}

/// Initial map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: 45.1,
            center_lng: 15.2,
            zoom: 7.0,
            min_zoom: 3.0,
            max_zoom: 18.0,
        }
    }
}

impl HubConfig {
    /// Parse and validate YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: HubConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse YAML, falling back to defaults with a warning.
    pub fn from_yaml_or_default(yaml: &str) -> Self {
        Self::from_yaml(yaml).unwrap_or_else(|e| {
            tracing::warn!("{}; using default configuration", e);
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let focus = &self.focus;
        if !(focus.settle_delay_secs.is_finite() && focus.settle_delay_secs >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "focus.settle_delay_secs",
                reason: "must be a non-negative number".to_string(),
            });
        }
        if focus.focus_zoom > focus.max_focus_zoom {
            return Err(ConfigError::Invalid {
                field: "focus.focus_zoom",
                reason: format!("exceeds max_focus_zoom {}", focus.max_focus_zoom),
            });
        }
        if !(0.0..1.0).contains(&focus.callout_nudge_fraction) {
            return Err(ConfigError::Invalid {
                field: "focus.callout_nudge_fraction",
                reason: "must be in [0, 1)".to_string(),
            });
        }
        if self.map.min_zoom > self.map.max_zoom {
            return Err(ConfigError::Invalid {
                field: "map.min_zoom",
                reason: format!("exceeds max_zoom {}", self.map.max_zoom),
            });
        }
        if self.storage.token == self.storage.email {
            return Err(ConfigError::Invalid {
                field: "storage",
                reason: "token and email keys must differ".to_string(),
            });
        }
        Ok(())
    }

    /// Set the settle delay.
    pub fn settle_delay(mut self, secs: f64) -> Self {
        self.focus.settle_delay_secs = secs;
        self
    }

    /// Set the API base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.api.base_url = base_url.into();
        self
    }
}
