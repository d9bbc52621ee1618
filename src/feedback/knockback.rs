//! Knockback impulse: a horizontal velocity that decays linearly to zero
//! over a fixed window. A retrigger restarts the window (last trigger wins).

use bevy::prelude::*;

use crate::constants::TIME_EPSILON;
use crate::math::{frame_delta, horizontal_unit, non_negative};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KnockbackSignal {
    direction: Vec3,
    magnitude: f32,
    elapsed: f32,
    pub duration: f32,
    pub max_speed: f32,
}

impl KnockbackSignal {
    pub fn new(duration: f32, max_speed: f32) -> Self {
        Self {
            direction: Vec3::ZERO,
            magnitude: 0.0,
            elapsed: 0.0,
            duration,
            max_speed,
        }
    }

    pub fn is_active(&self) -> bool {
        self.magnitude > 0.0 && self.elapsed < self.duration
    }

    /// Current velocity contribution
    pub fn velocity(&self) -> Vec3 {
        if !self.is_active() {
            return Vec3::ZERO;
        }
        let remaining = 1.0 - self.elapsed / self.duration;
        self.direction * self.magnitude * remaining
    }

    /// Returns false when the direction has no horizontal component or the
    /// magnitude is not positive; the current impulse is then left alone.
    pub fn trigger(&mut self, direction: Vec3, magnitude: f32) -> bool {
        let magnitude = non_negative(magnitude).min(self.max_speed);
        let Some(direction) = horizontal_unit(direction) else {
            return false;
        };
        if magnitude <= 0.0 {
            return false;
        }
        self.direction = direction;
        self.magnitude = magnitude;
        self.elapsed = 0.0;
        true
    }

    /// Advance and return this frame's displacement request.
    pub fn tick(&mut self, dt: f32) -> Vec3 {
        let dt = frame_delta(dt);
        if !self.is_active() {
            return Vec3::ZERO;
        }
        // A long frame only moves the player for what is left of the window
        let step = dt.min(self.duration - self.elapsed);
        let displacement = self.velocity() * step;
        self.elapsed += dt;
        if self.elapsed >= self.duration - TIME_EPSILON {
            self.reset();
        }
        displacement
    }

    pub fn reset(&mut self) {
        self.direction = Vec3::ZERO;
        self.magnitude = 0.0;
        self.elapsed = 0.0;
    }
}
