//! Bevy wiring for `PlayerFeedback`.
//!
//! Player entities carry `PlayerFeedback` + `Transform` (movement
//! collaborator) and optionally `FeedbackUniforms` (presentation
//! collaborator). Without uniforms the signals still run, nobody samples them.

use bevy::prelude::*;

use super::PlayerFeedback;
use crate::collaborators::PresentationCollaborator;
use crate::config::FeedbackCoreConfig;
use crate::vitals::{DamageEvent, VitalsEvent};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeedbackSettings>()
            .add_event::<IncomingDamage>()
            .add_event::<HealRequest>()
            .add_event::<ArmorPickup>()
            .add_event::<RespawnRequest>()
            .add_event::<VitalsNotification>()
            .add_systems(
                Update,
                (
                    apply_settings_changes,
                    process_respawns,
                    process_heals,
                    process_armor_pickups,
                    process_incoming_damage,
                    tick_players,
                    publish_feedback,
                )
                    .chain(),
            );
    }
}

/// Session-wide tuning; changing it retunes every player
#[derive(Resource, Debug, Clone, Default)]
pub struct FeedbackSettings(pub FeedbackCoreConfig);

/// A resolved hit from the combat resolver
#[derive(Event, Debug, Clone)]
pub struct IncomingDamage {
    pub target: Entity,
    pub damage: DamageEvent,
}

#[derive(Event, Debug, Clone)]
pub struct HealRequest {
    pub target: Entity,
    pub amount: f32,
}

#[derive(Event, Debug, Clone)]
pub struct ArmorPickup {
    pub target: Entity,
    pub amount: f32,
}

#[derive(Event, Debug, Clone)]
pub struct RespawnRequest {
    pub target: Entity,
    pub position: Vec3,
}

/// Vitals notification re-broadcast for UI, audio and analytics
#[derive(Event, Debug, Clone)]
pub struct VitalsNotification {
    pub entity: Entity,
    pub event: VitalsEvent,
}

/// Post-process parameters, refreshed once per frame
#[derive(Component, Debug, Clone, Copy)]
pub struct FeedbackUniforms {
    pub shake_offset: Vec3,
    pub vignette_intensity: f32,
    pub vignette_color: LinearRgba,
    pub chromatic_aberration: f32,
}

impl Default for FeedbackUniforms {
    fn default() -> Self {
        Self {
            shake_offset: Vec3::ZERO,
            vignette_intensity: 0.0,
            vignette_color: LinearRgba::BLACK,
            chromatic_aberration: 0.0,
        }
    }
}

impl PresentationCollaborator for FeedbackUniforms {
    fn set_shake_offset(&mut self, offset: Vec3) {
        self.shake_offset = offset;
    }

    fn set_vignette(&mut self, intensity: f32, color: LinearRgba) {
        self.vignette_intensity = intensity;
        self.vignette_color = color;
    }

    fn set_chromatic_aberration(&mut self, intensity: f32) {
        self.chromatic_aberration = intensity;
    }
}

fn apply_settings_changes(settings: Res<FeedbackSettings>, mut players: Query<&mut PlayerFeedback>) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    for mut player in &mut players {
        player.set_config(settings.0.clone());
    }
    info!("Feedback settings applied to players");
}

fn process_respawns(
    mut requests: EventReader<RespawnRequest>,
    mut players: Query<(&mut PlayerFeedback, &mut Transform)>,
) {
    for request in requests.read() {
        let Ok((mut player, mut transform)) = players.get_mut(request.target) else {
            warn!("Respawn requested for unknown player {:?}", request.target);
            continue;
        };
        if !player.respawn(request.position, &mut *transform) {
            debug!("Respawn ignored for living player {:?}", request.target);
        }
    }
}

fn process_heals(mut requests: EventReader<HealRequest>, mut players: Query<&mut PlayerFeedback>) {
    for request in requests.read() {
        if let Ok(mut player) = players.get_mut(request.target) {
            player.heal(request.amount);
        }
    }
}

fn process_armor_pickups(
    mut pickups: EventReader<ArmorPickup>,
    mut players: Query<&mut PlayerFeedback>,
) {
    for pickup in pickups.read() {
        if let Ok(mut player) = players.get_mut(pickup.target) {
            player.add_armor(pickup.amount);
        }
    }
}

fn process_incoming_damage(
    mut hits: EventReader<IncomingDamage>,
    mut players: Query<&mut PlayerFeedback>,
) {
    for hit in hits.read() {
        let Ok(mut player) = players.get_mut(hit.target) else {
            continue;
        };
        let outcome = player.apply_damage(&hit.damage);
        if outcome.died() {
            info!("Player {:?} died", hit.target);
        }
    }
}

fn tick_players(time: Res<Time>, mut players: Query<(&mut PlayerFeedback, &mut Transform)>) {
    let dt = time.delta_secs();
    for (mut player, mut transform) in &mut players {
        player.tick(dt, &mut *transform);
    }
}

fn publish_feedback(
    mut players: Query<(Entity, &mut PlayerFeedback, Option<&mut FeedbackUniforms>)>,
    mut notifications: EventWriter<VitalsNotification>,
) {
    for (entity, mut player, uniforms) in &mut players {
        for event in player.drain_events() {
            notifications.send(VitalsNotification { entity, event });
        }
        if let Some(mut uniforms) = uniforms {
            player.present(&mut *uniforms);
        }
    }
}
