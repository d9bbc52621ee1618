//! Centralized tuning constants for the feedback core.
//!
//! These are the defaults behind `VitalsConfig` and `FeedbackConfig`; a loaded
//! config file overrides them per session.

// =====================================================
// Vitals
// =====================================================

/// Health pool at spawn
pub const MAX_HEALTH: f32 = 100.0;

/// Armor pool at spawn
pub const MAX_ARMOR: f32 = 100.0;

/// Fraction of incoming damage soaked by armor while armor remains
pub const ARMOR_DAMAGE_REDUCTION: f32 = 0.5;

/// Seconds without damage before regeneration kicks in
pub const REGEN_DELAY_SECS: f32 = 5.0;

/// Health regenerated per second once the delay has passed
pub const REGEN_RATE: f32 = 10.0;

/// Invulnerability window granted on respawn
pub const RESPAWN_INVULNERABILITY_SECS: f32 = 2.0;

/// Blink frequency of the invulnerability flash (full on/off cycles per second)
pub const INVULNERABILITY_FLASH_HZ: f32 = 8.0;

/// Tolerance when comparing accumulated frame time against a duration
pub const TIME_EPSILON: f32 = 1e-5;

// =====================================================
// Impulse signals
// =====================================================

/// Shake amplitude reached by a full-strength trigger
pub const SHAKE_BASELINE: f32 = 1.0;

/// Fraction of shake amplitude retained after one second
pub const SHAKE_DECAY_FACTOR: f32 = 0.05;

/// Camera translation at amplitude 1.0
pub const SHAKE_MAX_TRANSLATION: f32 = 0.25;

/// Time scale of the shake noise
pub const SHAKE_NOISE_SPEED: f32 = 25.0;

/// Impact vignette reached by a full-strength trigger
pub const IMPACT_VIGNETTE_BASELINE: f32 = 0.7;

/// Impact vignette lost per second
pub const IMPACT_VIGNETTE_DECAY_RATE: f32 = 1.5;

/// Chromatic aberration reached by a full-strength trigger
pub const CHROMATIC_BASELINE: f32 = 0.6;

/// Chromatic aberration lost per second
pub const CHROMATIC_DECAY_RATE: f32 = 2.0;

/// Below this an impulse signal is considered settled and snaps to zero
pub const SIGNAL_EPSILON: f32 = 1e-4;

// =====================================================
// Damage vignette
// =====================================================

/// Vignette at zero health (before the low-health pulse)
pub const DAMAGE_VIGNETTE_INTENSITY: f32 = 0.8;

/// Health fraction at or below which the vignette pulses
pub const LOW_HEALTH_THRESHOLD: f32 = 0.3;

/// Pulse cycles per second
pub const PULSE_SPEED: f32 = 1.5;

/// Approach rate of the current vignette toward its target (1/s)
pub const DAMAGE_VIGNETTE_APPROACH_RATE: f32 = 4.0;

/// Guards the color weight division when both vignettes are ~0
pub const VIGNETTE_WEIGHT_EPSILON: f32 = 1e-4;

/// Linear RGBA of the impact flash
pub const IMPACT_VIGNETTE_COLOR: [f32; 4] = [1.0, 0.35, 0.1, 1.0];

/// Linear RGBA of the low-health vignette
pub const DAMAGE_VIGNETTE_COLOR: [f32; 4] = [0.6, 0.0, 0.0, 1.0];

// =====================================================
// Knockback
// =====================================================

/// Seconds for a knockback impulse to decay to zero
pub const KNOCKBACK_DURATION_SECS: f32 = 0.2;

/// Upper bound on knockback speed (units/s)
pub const MAX_KNOCKBACK_SPEED: f32 = 20.0;

// =====================================================
// Damage -> feedback routing
// =====================================================

/// Health+armor loss that maps to a full-strength feedback trigger
pub const FULL_FEEDBACK_DAMAGE: f32 = 40.0;
