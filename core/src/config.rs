//! Engine configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use tether_types::{OverlayKind, SourceKind};

const APP_NAME: &str = "tether";
const CONFIG_NAME: &str = "engine";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Source precedence, highest first (lower ordinal wins every tie).
    pub precedence: Vec<SourceKind>,
    /// Overlay kind kept when a single contribution carries both variants.
    pub overlay_preference: OverlayKind,
    /// Intensity decay toward the baseline, in points per second.
    pub decay_per_second: f32,
    /// Decay tick period in milliseconds.
    pub decay_tick_ms: u64,
    /// Bound on the in-memory audit trail.
    pub audit_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precedence: SourceKind::ALL.to_vec(),
            overlay_preference: OverlayKind::Blindfold,
            decay_per_second: 2.0,
            decay_tick_ms: 1000,
            audit_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Load from the platform config directory, falling back to defaults
    /// on first run or on a broken file.
    pub fn load() -> Self {
        match confy::load(APP_NAME, Some(CONFIG_NAME)) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("[CONFIG] load failed, using defaults: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Err(err) = confy::store(APP_NAME, Some(CONFIG_NAME), self) {
            tracing::error!("[CONFIG] save failed: {err}");
        }
    }

    /// Where the config lives, for diagnostics.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(format!("{CONFIG_NAME}.toml")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = EngineConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.precedence, config.precedence);
        assert_eq!(back.decay_tick_ms, config.decay_tick_ms);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: EngineConfig = toml::from_str("decay_per_second = 5.0").unwrap();
        assert_eq!(config.decay_per_second, 5.0);
        assert_eq!(config.precedence, SourceKind::ALL.to_vec());
    }
}
