//! Property-based tests using proptest
//!
//! Invariants that must hold for ALL inputs:
//! - Vitals: health/armor stay inside their pools, damage is additive
//! - Invulnerability: any hit during the window is suppressed
//! - Signals: max-hold triggers, monotonic decay, bounded outputs
//! - Knockback: horizontal and speed-capped
//! - FFI: any tick delta yields a valid frame

use bevy::math::Vec3;
use proptest::prelude::*;
use std::ffi::CStr;

use feedback_core::bridge::*;
use feedback_core::collaborators::FrameMovement;
use feedback_core::config::VitalsConfig;
use feedback_core::feedback::FeedbackSignalModel;
use feedback_core::vitals::{DamageEvent, DamageStateMachine, DamageType, VitalsEvent};

fn machine() -> DamageStateMachine {
    DamageStateMachine::new(VitalsConfig {
        regen_enabled: false,
        ..Default::default()
    })
}

fn hit(amount: f32) -> DamageEvent {
    DamageEvent::new(amount, DamageType::Ballistic)
}

#[derive(Debug, Clone)]
enum Op {
    Damage(f32),
    Heal(f32),
    Armor(f32),
    Tick(f32),
    Respawn,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-50.0f32..300.0).prop_map(Op::Damage),
        (-50.0f32..150.0).prop_map(Op::Heal),
        (-50.0f32..150.0).prop_map(Op::Armor),
        (0.0f32..0.5).prop_map(Op::Tick),
        Just(Op::Respawn),
    ]
}

// ============================================================
// Vitals Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_pools_stay_in_bounds(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut m = DamageStateMachine::new(VitalsConfig::default());
        let mut events: Vec<VitalsEvent> = Vec::new();
        let mut movement = FrameMovement::default();
        for op in ops {
            match op {
                Op::Damage(a) => { m.apply_damage(&hit(a), &mut events); }
                Op::Heal(a) => { m.heal(a, &mut events); }
                Op::Armor(a) => { m.add_armor(a); }
                Op::Tick(dt) => m.tick(dt, &mut events),
                Op::Respawn => { m.respawn(Vec3::ZERO, &mut movement, &mut events); }
            }
            let max_health = m.config().max_health;
            let max_armor = m.config().max_armor;
            prop_assert!((0.0..=max_health).contains(&m.health()), "health {}", m.health());
            prop_assert!((0.0..=max_armor).contains(&m.armor()), "armor {}", m.armor());
            prop_assert_eq!(m.is_dead(), m.health() <= 0.0);
        }
    }

    #[test]
    fn prop_damage_is_additive_across_splits(a in 0.0f32..150.0, b in 0.0f32..150.0) {
        let mut split = machine();
        let mut whole = machine();
        let mut sink: Vec<VitalsEvent> = Vec::new();

        let first = split.apply_damage(&hit(a), &mut sink);
        // A killing first half leaves armor behind that the single hit would have used
        prop_assume!(!first.died());
        split.apply_damage(&hit(b), &mut sink);
        whole.apply_damage(&hit(a + b), &mut sink);

        prop_assert!((split.health() - whole.health()).abs() < 1e-3);
        prop_assert!((split.armor() - whole.armor()).abs() < 1e-3);
        prop_assert_eq!(split.is_dead(), whole.is_dead());
    }

    #[test]
    fn prop_health_loss_never_exceeds_remaining_health(amount in 0.0f32..1.0e6, pre in 0.0f32..99.0) {
        let mut m = machine();
        let mut sink: Vec<VitalsEvent> = Vec::new();
        m.apply_damage(&hit(pre), &mut sink);
        prop_assume!(!m.is_dead());

        let before = m.health();
        let outcome = m.apply_damage(&hit(amount), &mut sink);
        prop_assert!(outcome.health_loss() <= before + 1e-4);
        prop_assert!(outcome.health_loss() >= 0.0);
        prop_assert!(outcome.armor_loss() >= 0.0);
    }

    #[test]
    fn prop_invulnerability_suppresses_any_hit(amount in -100.0f32..1.0e6, elapsed in 0.0f32..1.9) {
        let mut m = machine();
        let mut sink: Vec<VitalsEvent> = Vec::new();
        m.apply_damage(&hit(1_000.0), &mut sink);
        m.respawn(Vec3::ZERO, &mut FrameMovement::default(), &mut sink);
        m.tick(elapsed, &mut sink);
        sink.clear();

        prop_assert!(m.is_invulnerable());
        prop_assert!(m.apply_damage(&hit(amount), &mut sink).is_suppressed());
        prop_assert_eq!(m.health(), m.config().max_health);
        prop_assert!(sink.is_empty());
    }

    #[test]
    fn prop_heal_never_exceeds_max(pre in 0.0f32..99.0, heal in -10.0f32..1.0e6) {
        let mut m = machine();
        let mut sink: Vec<VitalsEvent> = Vec::new();
        m.apply_damage(&hit(pre), &mut sink);
        let before = m.health();
        let healed = m.heal(heal, &mut sink);
        prop_assert!(m.health() <= m.config().max_health);
        prop_assert!((m.health() - before - healed).abs() < 1e-4);
    }
}

// ============================================================
// Feedback Signal Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_shake_trigger_is_max_hold(a in 0.0f32..1.0, b in 0.0f32..1.0) {
        let mut model = FeedbackSignalModel::default();
        model.trigger_shake(a);
        model.trigger_shake(b);
        let baseline = model.config().shake_baseline;
        prop_assert!((model.shake_amplitude() - a.max(b) * baseline).abs() < 1e-6);
    }

    #[test]
    fn prop_signals_decay_monotonically(
        strength in 0.0f32..1.0,
        dts in prop::collection::vec(-0.1f32..0.2, 1..40),
    ) {
        let mut model = FeedbackSignalModel::default();
        model.trigger_shake(strength);
        model.trigger_vignette(strength);
        model.trigger_chromatic_aberration(strength);

        let mut prev = (model.shake_amplitude(), model.impact_vignette(), model.chromatic_aberration());
        for dt in dts {
            model.tick(dt, 1.0, 0.0);
            let now = (model.shake_amplitude(), model.impact_vignette(), model.chromatic_aberration());
            prop_assert!(now.0 <= prev.0);
            prop_assert!(now.1 <= prev.1);
            prop_assert!(now.2 <= prev.2);
            prev = now;
        }
    }

    #[test]
    fn prop_vignette_sample_in_unit_range(
        impact in -1.0f32..2.0,
        hp in -0.5f32..1.5,
        frames in 1usize..200,
        now in 0.0f64..100.0,
    ) {
        let mut model = FeedbackSignalModel::default();
        model.trigger_vignette(impact);
        for _ in 0..frames {
            model.tick(1.0 / 60.0, hp, now);
        }
        let sample = model.sample_vignette();
        prop_assert!((0.0..=1.0).contains(&sample.intensity));
        prop_assert!((0.0..=1.0).contains(&model.damage_vignette()));
    }

    #[test]
    fn prop_knockback_is_horizontal_and_capped(
        x in -10.0f32..10.0,
        y in -10.0f32..10.0,
        z in -10.0f32..10.0,
        magnitude in -5.0f32..100.0,
        dt in 0.0f32..0.1,
    ) {
        let mut model = FeedbackSignalModel::default();
        model.trigger_knockback(Vec3::new(x, y, z), magnitude);
        let velocity = model.knockback_velocity();
        prop_assert_eq!(velocity.y, 0.0);
        prop_assert!(velocity.length() <= model.config().max_knockback_speed + 1e-3);

        let displacement = model.tick(dt, 1.0, 0.0);
        prop_assert_eq!(displacement.y, 0.0);
        prop_assert!(displacement.length() <= model.config().max_knockback_speed * dt + 1e-3);
    }
}

// ============================================================
// FFI Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_any_tick_delta_yields_valid_frame(dt in -1.0f32..1.0, damage in 0.0f32..500.0) {
        let player = feedback_player_create(std::ptr::null());
        prop_assert!(!player.is_null());
        let request = std::ffi::CString::new(format!("{{\"amount\": {damage}}}")).unwrap();
        free_string(feedback_apply_damage(player, request.as_ptr()));

        let ptr = feedback_tick(player, dt);
        prop_assert!(!ptr.is_null());
        let json = unsafe { CStr::from_ptr(ptr).to_str().unwrap().to_owned() };
        free_string(ptr);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let intensity = value["frame"]["vignette_intensity"].as_f64().unwrap();
        prop_assert!((0.0..=1.0).contains(&intensity));

        feedback_player_destroy(player);
    }
}
