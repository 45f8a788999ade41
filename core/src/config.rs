use serde::{Deserialize, Serialize};

use crate::{GestureResolver, Layout};

/// Tunables of the session and its presentation helpers. Every field has a default, so a partial TOML
/// document is enough.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Viewports narrower than this get the compact board layouts.
    pub compact_width_threshold: u32,
    /// How long a touch tap waits for a second tap that turns it into a flag.
    pub double_tap_window_ms: u64,
    /// Display refresh period of the running timer. Cosmetic only.
    pub tick_interval_ms: u32,
    pub show_hours: bool,
    pub log_level: log::LevelFilter,
    pub records_key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            compact_width_threshold: 768,
            double_tap_window_ms: 200,
            tick_interval_ms: 25,
            show_hours: false,
            log_level: log::LevelFilter::Info,
            records_key: "mineclear:records".to_owned(),
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn layout_for_viewport(&self, width: u32) -> Layout {
        Layout::for_viewport(width, self.compact_width_threshold)
    }

    pub fn gesture_resolver(&self) -> GestureResolver {
        GestureResolver::new(self.double_tap_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_document_overrides_fields() {
        let config = SessionConfig::from_toml_str(
            r#"
            double_tap_window_ms = 600
            show_hours = true
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.double_tap_window_ms, 600);
        assert!(config.show_hours);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
        assert_eq!(config.compact_width_threshold, 768);
        assert_eq!(config.gesture_resolver().double_tap_window_ms(), 600);
    }

    #[test]
    fn viewport_threshold_is_configurable() {
        let config = SessionConfig {
            compact_width_threshold: 1200,
            ..SessionConfig::default()
        };
        assert_eq!(config.layout_for_viewport(1000), Layout::Compact);
        assert_eq!(config.layout_for_viewport(1200), Layout::Wide);
    }

    #[test]
    fn wrong_types_are_reported() {
        assert!(SessionConfig::from_toml_str("tick_interval_ms = \"fast\"").is_err());
    }
}
