//! Feedback signal model.
//!
//! Independent per-signal laws evaluated once per tick:
//! - shake amplitude: exponential impulse decay
//! - impact vignette / chromatic aberration: linear impulse decay
//! - damage vignette: eases toward a health-derived target, pulses at low health
//! - knockback: fixed-window linear velocity decay, last trigger wins
//!
//! Presentation reads (`sample_*`) are pure and may be called any number of
//! times per frame.

use bevy::prelude::*;
use serde::Serialize;

use crate::collaborators::PresentationCollaborator;
use crate::config::FeedbackConfig;
use crate::constants::VIGNETTE_WEIGHT_EPSILON;
use crate::math::{clamp01, color_from_array, frame_delta, lerp_color};

pub mod knockback;
pub mod signals;

pub use knockback::KnockbackSignal;
pub use signals::{DamageVignette, Decay, ImpulseSignal};

/// Composite vignette handed to the post-process pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VignetteSample {
    pub intensity: f32,
    pub color: LinearRgba,
}

/// One frame of presentation output, in plain arrays for FFI hosts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeedbackFrame {
    pub shake_offset: [f32; 3],
    pub vignette_intensity: f32,
    pub vignette_color: [f32; 4],
    pub chromatic_aberration: f32,
}

#[derive(Debug, Clone)]
pub struct FeedbackSignalModel {
    config: FeedbackConfig,
    shake: ImpulseSignal,
    impact_vignette: ImpulseSignal,
    chromatic: ImpulseSignal,
    damage_vignette: DamageVignette,
    knockback: KnockbackSignal,
}

impl Default for FeedbackSignalModel {
    fn default() -> Self {
        Self::new(FeedbackConfig::default())
    }
}

fn shake_signal(config: &FeedbackConfig) -> (f32, Decay) {
    (
        config.shake_baseline,
        Decay::Exponential {
            factor: config.shake_decay_factor,
        },
    )
}

fn impact_signal(config: &FeedbackConfig) -> (f32, Decay) {
    (
        config.impact_vignette_baseline,
        Decay::Linear {
            rate: config.impact_vignette_decay_rate,
        },
    )
}

fn chromatic_signal(config: &FeedbackConfig) -> (f32, Decay) {
    (
        config.chromatic_baseline,
        Decay::Linear {
            rate: config.chromatic_decay_rate,
        },
    )
}

impl FeedbackSignalModel {
    pub fn new(config: FeedbackConfig) -> Self {
        let (shake_base, shake_decay) = shake_signal(&config);
        let (impact_base, impact_decay) = impact_signal(&config);
        let (chroma_base, chroma_decay) = chromatic_signal(&config);
        Self {
            shake: ImpulseSignal::new(shake_base, shake_decay),
            impact_vignette: ImpulseSignal::new(impact_base, impact_decay),
            chromatic: ImpulseSignal::new(chroma_base, chroma_decay),
            damage_vignette: DamageVignette::new(
                config.damage_vignette_intensity,
                config.low_health_threshold,
                config.pulse_speed,
                config.damage_vignette_approach_rate,
            ),
            knockback: KnockbackSignal::new(config.knockback_duration, config.max_knockback_speed),
            config,
        }
    }

    pub fn config(&self) -> &FeedbackConfig {
        &self.config
    }

    /// Retune in place; in-flight values are kept (clamped to new baselines).
    pub fn set_config(&mut self, config: FeedbackConfig) {
        let (b, d) = shake_signal(&config);
        self.shake.retune(b, d);
        let (b, d) = impact_signal(&config);
        self.impact_vignette.retune(b, d);
        let (b, d) = chromatic_signal(&config);
        self.chromatic.retune(b, d);

        self.damage_vignette.intensity = config.damage_vignette_intensity;
        self.damage_vignette.low_health_threshold = config.low_health_threshold;
        self.damage_vignette.pulse_speed = config.pulse_speed;
        self.damage_vignette.approach_rate = config.damage_vignette_approach_rate;
        self.knockback.duration = config.knockback_duration;
        self.knockback.max_speed = config.max_knockback_speed;
        self.config = config;
    }

    pub fn trigger_shake(&mut self, strength: f32) {
        self.shake.trigger(strength);
    }

    pub fn trigger_vignette(&mut self, strength: f32) {
        self.impact_vignette.trigger(strength);
    }

    pub fn trigger_chromatic_aberration(&mut self, strength: f32) {
        self.chromatic.trigger(strength);
    }

    pub fn trigger_knockback(&mut self, direction: Vec3, magnitude: f32) -> bool {
        self.knockback.trigger(direction, magnitude)
    }

    /// Advance every signal. Returns the knockback displacement for this frame.
    pub fn tick(&mut self, dt: f32, health_percent: f32, now: f64) -> Vec3 {
        let dt = frame_delta(dt);
        self.shake.tick(dt);
        self.impact_vignette.tick(dt);
        self.chromatic.tick(dt);
        self.damage_vignette.tick(dt, health_percent, now);
        self.knockback.tick(dt)
    }

    /// Zero every signal (respawn).
    pub fn reset(&mut self) {
        self.shake.reset();
        self.impact_vignette.reset();
        self.chromatic.reset();
        self.damage_vignette.reset();
        self.knockback.reset();
    }

    pub fn shake_amplitude(&self) -> f32 {
        self.shake.value()
    }

    pub fn impact_vignette(&self) -> f32 {
        self.impact_vignette.value()
    }

    pub fn chromatic_aberration(&self) -> f32 {
        self.chromatic.value()
    }

    pub fn damage_vignette(&self) -> f32 {
        self.damage_vignette.value()
    }

    pub fn knockback_velocity(&self) -> Vec3 {
        self.knockback.velocity()
    }

    pub fn sample_vignette(&self) -> VignetteSample {
        let impact = self.impact_vignette.value();
        let damage = self.damage_vignette.value();
        let total = clamp01(impact + damage);
        let weight = clamp01(damage / (total + VIGNETTE_WEIGHT_EPSILON));
        VignetteSample {
            intensity: total,
            color: lerp_color(
                color_from_array(self.config.impact_color),
                color_from_array(self.config.damage_color),
                weight,
            ),
        }
    }

    /// Camera offset for this frame; zero amplitude gives a zero offset.
    pub fn sample_shake_offset(&self, now: f64) -> Vec3 {
        let amplitude = self.shake.value();
        if amplitude <= 0.0 {
            return Vec3::ZERO;
        }
        let t = (now * self.config.shake_noise_speed as f64) as f32;
        let x = (t * 1.0).sin() * 0.5 + (t * 2.3).cos() * 0.3 + (t * 4.1).sin() * 0.2;
        let y = (t * 1.7).cos() * 0.5 + (t * 3.1).sin() * 0.3 + (t * 5.3).cos() * 0.2;
        Vec3::new(x, y, 0.0) * amplitude * amplitude * self.config.shake_max_translation
    }

    pub fn sample(&self, now: f64) -> FeedbackFrame {
        let vignette = self.sample_vignette();
        FeedbackFrame {
            shake_offset: self.sample_shake_offset(now).to_array(),
            vignette_intensity: vignette.intensity,
            vignette_color: [
                vignette.color.red,
                vignette.color.green,
                vignette.color.blue,
                vignette.color.alpha,
            ],
            chromatic_aberration: self.chromatic.value(),
        }
    }

    pub fn present(&self, now: f64, presentation: &mut impl PresentationCollaborator) {
        let vignette = self.sample_vignette();
        presentation.set_shake_offset(self.sample_shake_offset(now));
        presentation.set_vignette(vignette.intensity, vignette.color);
        presentation.set_chromatic_aberration(self.chromatic.value());
    }
}
