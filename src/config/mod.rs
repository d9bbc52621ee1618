//! Tuning configuration for vitals and feedback signals.
//!
//! Loaded from `.ron` or `.json` files; every field falls back to the
//! defaults in `constants` when omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported config extension: {0}")]
    UnsupportedFormat(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Health/armor pool and lifecycle tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    pub max_health: f32,
    pub max_armor: f32,
    pub armor_damage_reduction: f32,
    pub regen_enabled: bool,
    pub regen_delay: f32,
    pub regen_rate: f32,
    pub respawn_invulnerability: f32,
    pub flash_frequency: f32,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            max_health: MAX_HEALTH,
            max_armor: MAX_ARMOR,
            armor_damage_reduction: ARMOR_DAMAGE_REDUCTION,
            regen_enabled: true,
            regen_delay: REGEN_DELAY_SECS,
            regen_rate: REGEN_RATE,
            respawn_invulnerability: RESPAWN_INVULNERABILITY_SECS,
            flash_frequency: INVULNERABILITY_FLASH_HZ,
        }
    }
}

/// Decay laws and presentation constants for the feedback signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub shake_baseline: f32,
    pub shake_decay_factor: f32,
    pub shake_max_translation: f32,
    pub shake_noise_speed: f32,
    pub impact_vignette_baseline: f32,
    pub impact_vignette_decay_rate: f32,
    pub chromatic_baseline: f32,
    pub chromatic_decay_rate: f32,
    pub damage_vignette_intensity: f32,
    pub low_health_threshold: f32,
    pub pulse_speed: f32,
    pub damage_vignette_approach_rate: f32,
    pub impact_color: [f32; 4],
    pub damage_color: [f32; 4],
    pub knockback_duration: f32,
    pub max_knockback_speed: f32,
    pub full_feedback_damage: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            shake_baseline: SHAKE_BASELINE,
            shake_decay_factor: SHAKE_DECAY_FACTOR,
            shake_max_translation: SHAKE_MAX_TRANSLATION,
            shake_noise_speed: SHAKE_NOISE_SPEED,
            impact_vignette_baseline: IMPACT_VIGNETTE_BASELINE,
            impact_vignette_decay_rate: IMPACT_VIGNETTE_DECAY_RATE,
            chromatic_baseline: CHROMATIC_BASELINE,
            chromatic_decay_rate: CHROMATIC_DECAY_RATE,
            damage_vignette_intensity: DAMAGE_VIGNETTE_INTENSITY,
            low_health_threshold: LOW_HEALTH_THRESHOLD,
            pulse_speed: PULSE_SPEED,
            damage_vignette_approach_rate: DAMAGE_VIGNETTE_APPROACH_RATE,
            impact_color: IMPACT_VIGNETTE_COLOR,
            damage_color: DAMAGE_VIGNETTE_COLOR,
            knockback_duration: KNOCKBACK_DURATION_SECS,
            max_knockback_speed: MAX_KNOCKBACK_SPEED,
            full_feedback_damage: FULL_FEEDBACK_DAMAGE,
        }
    }
}

/// Complete per-player tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackCoreConfig {
    pub vitals: VitalsConfig,
    pub feedback: FeedbackConfig,
}

fn require(ok: bool, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

fn unit_range(v: f32) -> bool {
    (0.0..=1.0).contains(&v)
}

impl VitalsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(self.max_health > 0.0, "max_health must be positive")?;
        require(self.max_armor >= 0.0, "max_armor must be non-negative")?;
        require(
            unit_range(self.armor_damage_reduction),
            "armor_damage_reduction must be within [0, 1]",
        )?;
        require(self.regen_delay >= 0.0, "regen_delay must be non-negative")?;
        require(self.regen_rate >= 0.0, "regen_rate must be non-negative")?;
        require(
            self.respawn_invulnerability >= 0.0,
            "respawn_invulnerability must be non-negative",
        )?;
        require(self.flash_frequency > 0.0, "flash_frequency must be positive")
    }
}

impl FeedbackConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        require(unit_range(self.shake_baseline), "shake_baseline must be within [0, 1]")?;
        require(
            self.shake_decay_factor > 0.0 && self.shake_decay_factor < 1.0,
            "shake_decay_factor must be within (0, 1)",
        )?;
        require(
            unit_range(self.impact_vignette_baseline),
            "impact_vignette_baseline must be within [0, 1]",
        )?;
        require(
            unit_range(self.chromatic_baseline),
            "chromatic_baseline must be within [0, 1]",
        )?;
        require(
            self.impact_vignette_decay_rate > 0.0 && self.chromatic_decay_rate > 0.0,
            "linear decay rates must be positive",
        )?;
        require(
            unit_range(self.damage_vignette_intensity),
            "damage_vignette_intensity must be within [0, 1]",
        )?;
        require(
            unit_range(self.low_health_threshold),
            "low_health_threshold must be within [0, 1]",
        )?;
        require(
            self.damage_vignette_approach_rate > 0.0,
            "damage_vignette_approach_rate must be positive",
        )?;
        require(self.knockback_duration > 0.0, "knockback_duration must be positive")?;
        require(
            self.max_knockback_speed >= 0.0,
            "max_knockback_speed must be non-negative",
        )?;
        require(
            self.full_feedback_damage > 0.0,
            "full_feedback_damage must be positive",
        )
    }
}

impl FeedbackCoreConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.vitals.validate()?;
        self.feedback.validate()
    }

    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file, choosing the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => Self::from_ron_str(&text),
            Some("json") => Self::from_json_str(&text),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
