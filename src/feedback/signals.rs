//! Scalar signal laws: impulse-decay and target-tracking.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::constants::SIGNAL_EPSILON;
use crate::math::{clamp01, exp_decay, move_toward, smooth_toward};

/// How an impulse signal falls back to zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Decay {
    /// `value *= factor^dt`, factor = fraction retained per second
    Exponential { factor: f32 },
    /// `value -= rate * dt`, clamped at zero
    Linear { rate: f32 },
}

/// A value raised by triggers and decayed every tick, kept in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpulseSignal {
    value: f32,
    baseline: f32,
    decay: Decay,
}

impl ImpulseSignal {
    pub fn new(baseline: f32, decay: Decay) -> Self {
        Self {
            value: 0.0,
            baseline: clamp01(baseline),
            decay,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Max-hold: a weaker trigger never cuts an in-flight decay short.
    pub fn trigger(&mut self, strength: f32) {
        let raised = self.baseline * clamp01(strength);
        self.value = self.value.max(raised);
    }

    pub fn tick(&mut self, dt: f32) {
        if self.value <= 0.0 {
            return;
        }
        self.value = match self.decay {
            Decay::Exponential { factor } => exp_decay(self.value, factor, dt),
            Decay::Linear { rate } => move_toward(self.value, 0.0, rate * dt),
        };
        if self.value < SIGNAL_EPSILON {
            self.value = 0.0;
        }
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn retune(&mut self, baseline: f32, decay: Decay) {
        self.baseline = clamp01(baseline);
        self.decay = decay;
        self.value = self.value.min(self.baseline);
    }
}

/// Health-driven vignette that eases toward its target instead of jumping
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageVignette {
    value: f32,
    pub intensity: f32,
    pub low_health_threshold: f32,
    pub pulse_speed: f32,
    pub approach_rate: f32,
}

impl DamageVignette {
    pub fn new(
        intensity: f32,
        low_health_threshold: f32,
        pulse_speed: f32,
        approach_rate: f32,
    ) -> Self {
        Self {
            value: 0.0,
            intensity,
            low_health_threshold,
            pulse_speed,
            approach_rate,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Steady part of the target: grows as health drops
    pub fn baseline_target(&self, health_percent: f32) -> f32 {
        (1.0 - clamp01(health_percent)) * self.intensity
    }

    /// Additive low-health pulse, zero above the threshold
    pub fn pulse(&self, health_percent: f32, now: f64) -> f32 {
        let hp = clamp01(health_percent);
        if hp > self.low_health_threshold {
            return 0.0;
        }
        let phase = (TAU as f64 * now * self.pulse_speed as f64).sin() as f32;
        (phase * 0.5 + 0.5) * (self.low_health_threshold - hp) * self.intensity
    }

    pub fn target(&self, health_percent: f32, now: f64) -> f32 {
        clamp01(self.baseline_target(health_percent) + self.pulse(health_percent, now))
    }

    pub fn tick(&mut self, dt: f32, health_percent: f32, now: f64) {
        let target = self.target(health_percent, now);
        self.value = clamp01(smooth_toward(self.value, target, self.approach_rate, dt));
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}
