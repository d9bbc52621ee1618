//! Player feedback session.
//!
//! `PlayerFeedback` pairs one damage state machine with one feedback signal
//! model and routes resolved damage from the first into triggers on the
//! second. It is the unit of ownership: one player, one worker per tick.

use bevy::prelude::*;
use rayon::prelude::*;

use crate::collaborators::{FrameMovement, MovementCollaborator, PresentationCollaborator};
use crate::config::FeedbackCoreConfig;
use crate::feedback::{FeedbackFrame, FeedbackSignalModel};
use crate::math::clamp01;
use crate::vitals::{DamageEvent, DamageOutcome, DamageStateMachine, VitalsEvent};

pub mod systems;

pub use systems::{
    ArmorPickup, FeedbackSettings, FeedbackUniforms, HealRequest, IncomingDamage, PlayerPlugin,
    RespawnRequest, VitalsNotification,
};

#[derive(Component, Debug, Clone)]
pub struct PlayerFeedback {
    vitals: DamageStateMachine,
    signals: FeedbackSignalModel,
    outbox: Vec<VitalsEvent>,
}

impl Default for PlayerFeedback {
    fn default() -> Self {
        Self::new(FeedbackCoreConfig::default())
    }
}

impl PlayerFeedback {
    pub fn new(config: FeedbackCoreConfig) -> Self {
        Self {
            vitals: DamageStateMachine::new(config.vitals),
            signals: FeedbackSignalModel::new(config.feedback),
            outbox: Vec::new(),
        }
    }

    pub fn vitals(&self) -> &DamageStateMachine {
        &self.vitals
    }

    pub fn signals(&self) -> &FeedbackSignalModel {
        &self.signals
    }

    pub fn config(&self) -> FeedbackCoreConfig {
        FeedbackCoreConfig {
            vitals: self.vitals.config().clone(),
            feedback: self.signals.config().clone(),
        }
    }

    pub fn set_config(&mut self, config: FeedbackCoreConfig) {
        self.vitals.set_config(config.vitals);
        self.signals.set_config(config.feedback);
    }

    /// Apply a resolved hit and raise the matching screen feedback.
    pub fn apply_damage(&mut self, event: &DamageEvent) -> DamageOutcome {
        let outcome = self.vitals.apply_damage(event, &mut self.outbox);

        if let DamageOutcome::Applied {
            health_loss,
            armor_loss,
            died,
        } = outcome
        {
            let loss = health_loss + armor_loss;
            if loss > 0.0 {
                let strength = clamp01(
                    loss / self.signals.config().full_feedback_damage
                        * event.damage_type.shake_multiplier(),
                );
                self.signals.trigger_shake(strength);
                self.signals.trigger_vignette(strength);
                self.signals.trigger_chromatic_aberration(strength);
            }
            // A killing blow hands off to ragdoll; no knockback
            if !died && event.knockback > 0.0 {
                self.signals
                    .trigger_knockback(event.hit_direction, event.knockback);
            }
        }

        outcome
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        self.vitals.heal(amount, &mut self.outbox)
    }

    pub fn add_armor(&mut self, amount: f32) -> f32 {
        self.vitals.add_armor(amount)
    }

    /// Respawn at `position`; feedback signals start from zero.
    pub fn respawn(&mut self, position: Vec3, movement: &mut impl MovementCollaborator) -> bool {
        if !self.vitals.respawn(position, movement, &mut self.outbox) {
            return false;
        }
        self.signals.reset();
        true
    }

    pub fn trigger_shake(&mut self, strength: f32) {
        self.signals.trigger_shake(strength);
    }

    pub fn trigger_vignette(&mut self, strength: f32) {
        self.signals.trigger_vignette(strength);
    }

    pub fn trigger_chromatic_aberration(&mut self, strength: f32) {
        self.signals.trigger_chromatic_aberration(strength);
    }

    pub fn trigger_knockback(&mut self, direction: Vec3, magnitude: f32) -> bool {
        self.signals.trigger_knockback(direction, magnitude)
    }

    /// Advance one frame. Knockback displacement goes to `movement`.
    pub fn tick(&mut self, dt: f32, movement: &mut impl MovementCollaborator) {
        self.vitals.tick(dt, &mut self.outbox);
        let displacement =
            self.signals
                .tick(dt, self.vitals.health_percent(), self.vitals.now());
        if displacement != Vec3::ZERO {
            movement.apply_displacement(displacement);
        }
    }

    pub fn present(&self, presentation: &mut impl PresentationCollaborator) {
        self.signals.present(self.vitals.now(), presentation);
    }

    pub fn sample(&self) -> FeedbackFrame {
        self.signals.sample(self.vitals.now())
    }

    pub fn health_percent(&self) -> f32 {
        self.vitals.health_percent()
    }

    pub fn armor_percent(&self) -> f32 {
        self.vitals.armor_percent()
    }

    pub fn is_dead(&self) -> bool {
        self.vitals.is_dead()
    }

    /// Notifications raised since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<VitalsEvent> {
        std::mem::take(&mut self.outbox)
    }
}

/// Tick many players in parallel. Each player is touched by exactly one
/// worker; the returned movement requests are in input order.
pub fn tick_batch(players: &mut [PlayerFeedback], dt: f32) -> Vec<FrameMovement> {
    players
        .par_iter_mut()
        .map(|player| {
            let mut movement = FrameMovement::default();
            player.tick(dt, &mut movement);
            movement
        })
        .collect()
}
