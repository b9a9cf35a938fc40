use std::time::Duration;

use serde::Deserialize;

use crate::app::MiddlewarePolicy;
use crate::components::TextTag;
use crate::error::ConfigError;

/// Attribute on `<body>` that may carry a JSON config.
pub const CONFIG_ATTRIBUTE: &str = "data-config";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub root: String,
    pub history_delay_ms: u64,
    pub middleware_policy: MiddlewarePolicy,
    pub player: PlayerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root: "#app".to_string(),
            history_delay_ms: 1000,
            middleware_policy: MiddlewarePolicy::RunOnce,
            player: PlayerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub title: String,
    pub heading: TextTag,
    /// Value of the file input's `accept` attribute.
    pub accept: String,
    pub autoplay: bool,
    pub zoom: SliderRange,
    pub spectrogram_columns: SliderRange,
    pub fft_size: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            title: "Music Player".to_string(),
            heading: TextTag::H1,
            accept: ".mp3, .wav".to_string(),
            autoplay: true,
            zoom: SliderRange {
                min: 1,
                max: 4,
                value: 1,
                step: 1,
            },
            spectrogram_columns: SliderRange {
                min: 5,
                max: 10,
                value: 7,
                step: 1,
            },
            fft_size: 2048,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SliderRange {
    pub min: u32,
    pub max: u32,
    pub value: u32,
    #[serde(default = "default_step")]
    pub step: u32,
}

fn default_step() -> u32 {
    1
}

impl SliderRange {
    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::Range {
                field,
                min: self.min,
                max: self.max,
            });
        }
        if !(self.min..=self.max).contains(&self.value) {
            return Err(ConfigError::DefaultOutOfRange {
                field,
                value: self.value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.player.zoom.check("zoom")?;
        self.player.spectrogram_columns.check("spectrogram_columns")?;
        if !self.player.fft_size.is_power_of_two() || !(32..=32768).contains(&self.player.fft_size) {
            return Err(ConfigError::DefaultOutOfRange {
                field: "fft_size",
                value: self.player.fft_size,
                min: 32,
                max: 32768,
            });
        }
        Ok(())
    }

    pub fn history_delay(&self) -> Duration {
        Duration::from_millis(self.history_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.root, "#app");
        assert_eq!(config.player.spectrogram_columns.value, 7);
        assert_eq!(config.history_delay(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AppConfig::from_json(
            r#"{"middleware_policy": "replay", "player": {"title": "Demo", "heading": "h2"}}"#,
        )
        .unwrap();
        assert_eq!(config.middleware_policy, MiddlewarePolicy::Replay);
        assert_eq!(config.player.title, "Demo");
        assert_eq!(config.player.heading, TextTag::H2);
        assert_eq!(config.player.zoom.max, 4);
        assert_eq!(config.root, "#app");
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let err = AppConfig::from_json(r#"{"player": {"zoom": {"min": 4, "max": 1, "value": 2}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Range { field: "zoom", .. }));
    }

    #[test]
    fn test_default_outside_range_is_rejected() {
        let err = AppConfig::from_json(
            r#"{"player": {"spectrogram_columns": {"min": 5, "max": 10, "value": 12}}}"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::DefaultOutOfRange { field: "spectrogram_columns", value: 12, .. }
        ));
    }

    #[test]
    fn test_bad_fft_size() {
        let err = AppConfig::from_json(r#"{"player": {"fft_size": 1000}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::DefaultOutOfRange { field: "fft_size", .. }));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(AppConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
