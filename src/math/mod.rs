//! Numeric helpers shared by the vitals and feedback models.
//!
//! Everything here is pure; inputs coming from outside the core (amounts,
//! strengths, directions) pass through these before touching any state.

use bevy::prelude::*;

/// Clamp to `[0, 1]`, mapping NaN to 0.
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Clamp a caller-supplied amount to `>= 0`, mapping NaN to 0.
pub fn non_negative(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// Sanitize a frame delta: negative, NaN and infinite steps become 0.
pub fn frame_delta(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.max(0.0)
    } else {
        0.0
    }
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Step `current` toward `target` by at most `max_delta`, never overshooting.
pub fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + delta.signum() * max_delta
    }
}

/// Multiplicative decay where `factor` is the fraction retained per second.
pub fn exp_decay(value: f32, factor: f32, dt: f32) -> f32 {
    value * factor.powf(dt)
}

/// Frame-rate independent smoothing toward `target`.
pub fn smooth_toward(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let t = 1.0 - (-rate * dt).exp();
    lerp(current, target, t)
}

/// Horizontal unit vector of `direction` (y dropped, renormalized).
/// Returns `None` for zero or non-finite input.
pub fn horizontal_unit(direction: Vec3) -> Option<Vec3> {
    let flat = Vec3::new(direction.x, 0.0, direction.z);
    let len = flat.length();
    if !len.is_finite() || len <= f32::EPSILON {
        return None;
    }
    Some(flat / len)
}

pub fn lerp_color(a: LinearRgba, b: LinearRgba, t: f32) -> LinearRgba {
    LinearRgba::new(
        lerp(a.red, b.red, t),
        lerp(a.green, b.green, t),
        lerp(a.blue, b.blue, t),
        lerp(a.alpha, b.alpha, t),
    )
}

pub fn color_from_array(rgba: [f32; 4]) -> LinearRgba {
    LinearRgba::new(rgba[0], rgba[1], rgba[2], rgba[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp01_handles_nan_and_range() {
        assert_eq!(clamp01(f32::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(7.0), 1.0);
        assert!((clamp01(0.25) - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn test_frame_delta_rejects_non_finite() {
        assert_eq!(frame_delta(f32::INFINITY), 0.0);
        assert_eq!(frame_delta(f32::NEG_INFINITY), 0.0);
        assert_eq!(frame_delta(f32::NAN), 0.0);
        assert_eq!(frame_delta(-0.1), 0.0);
        assert_eq!(frame_delta(0.016), 0.016);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(non_negative(-5.0), 0.0);
        assert_eq!(non_negative(f32::NAN), 0.0);
        assert_eq!(non_negative(12.5), 12.5);
    }

    #[test]
    fn test_move_toward_never_overshoots() {
        assert_eq!(move_toward(0.5, 0.0, 1.0), 0.0);
        assert!((move_toward(0.5, 0.0, 0.1) - 0.4).abs() < 1e-6);
        assert!((move_toward(0.0, 1.0, 0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_exp_decay_one_second() {
        let v = exp_decay(1.0, 0.05, 1.0);
        assert!((v - 0.05).abs() < 1e-6);
        // Two half-second steps match one full second
        let halves = exp_decay(exp_decay(1.0, 0.05, 0.5), 0.05, 0.5);
        assert!((halves - v).abs() < 1e-5);
    }

    #[test]
    fn test_smooth_toward_converges() {
        let mut v = 0.0;
        for _ in 0..200 {
            v = smooth_toward(v, 0.6, 4.0, 1.0 / 60.0);
        }
        assert!((v - 0.6).abs() < 1e-3);
    }

    #[test]
    fn test_horizontal_unit() {
        let dir = horizontal_unit(Vec3::new(3.0, 10.0, 4.0)).unwrap();
        assert!((dir - Vec3::new(0.6, 0.0, 0.8)).length() < 1e-5);
        assert!(horizontal_unit(Vec3::Y).is_none());
        assert!(horizontal_unit(Vec3::ZERO).is_none());
        assert!(horizontal_unit(Vec3::new(f32::NAN, 0.0, 1.0)).is_none());
    }

    #[test]
    fn test_lerp_color_endpoints() {
        let a = LinearRgba::new(1.0, 0.0, 0.0, 1.0);
        let b = LinearRgba::new(0.0, 0.0, 1.0, 1.0);
        assert_eq!(lerp_color(a, b, 0.0), a);
        assert_eq!(lerp_color(a, b, 1.0), b);
    }
}
