//! Engine configuration
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use std::path::Path;

use folio_effects::EffectSettings;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pacing::Pacing;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Typewriter delays
    pub pacing: Pacing,
    /// Glitch re-roll period (ms)
    pub glitch_period_ms: u64,
    /// Per-character glitch probability
    pub glitch_probability: f64,
    /// Node a fresh reader starts on
    pub start_node: String,
    /// Storage key holding the saved progress
    pub storage_key: String,
    /// Seed for effect randomness; entropy when absent
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let effects = EffectSettings::default();
        Self {
            pacing: Pacing::default(),
            glitch_period_ms: effects.glitch_period_ms,
            glitch_probability: effects.glitch_probability,
            start_node: "portada".to_string(),
            storage_key: "storyState".to_string(),
            rng_seed: None,
        }
    }
}

impl Config {
    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.glitch_period_ms == 0 {
            return Err(ConfigError::Invalid("glitchPeriodMs must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.glitch_probability) {
            return Err(ConfigError::Invalid(format!(
                "glitchProbability must be within [0, 1], got {}",
                self.glitch_probability
            )));
        }
        if self.start_node.is_empty() {
            return Err(ConfigError::Invalid("startNode must not be empty".into()));
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::Invalid("storageKey must not be empty".into()));
        }
        Ok(())
    }

    /// Effect engine settings derived from this config
    pub fn effect_settings(&self) -> EffectSettings {
        EffectSettings {
            glitch_period_ms: self.glitch_period_ms,
            glitch_probability: self.glitch_probability,
            ..EffectSettings::default()
        }
    }
}
