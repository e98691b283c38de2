//! Embedded settings
//!
//! `config/hub_settings.yaml` is compiled in and parsed once on first use.

use std::sync::OnceLock;

use hub_nav::HubConfig;

const SETTINGS_YAML: &str = include_str!("../config/hub_settings.yaml");

static CONFIG: OnceLock<HubConfig> = OnceLock::new();

/// Process-wide settings. Falls back to defaults if the embedded file is bad.
pub fn global_config() -> &'static HubConfig {
    CONFIG.get_or_init(|| HubConfig::from_yaml_or_default(SETTINGS_YAML))
}
