use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::*;

use feedback_core::hotreload::HotReloadPlugin;
use feedback_core::logging::LoggingPlugin;
use feedback_core::player::{
    FeedbackSettings, FeedbackUniforms, IncomingDamage, PlayerFeedback, PlayerPlugin, RespawnRequest,
    VitalsNotification,
};
use feedback_core::vitals::{DamageEvent, DamageType, VitalsEvent};

const DEMO_SECONDS: f32 = 12.0;
const HIT_INTERVAL_SECS: f32 = 0.6;

/// Scripted attacker cycling through damage types
#[derive(Resource)]
struct DemoScript {
    timer: Timer,
    hits: u32,
}

fn main() {
    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(
            Duration::from_secs_f64(1.0 / 60.0),
        )))
        .add_plugins(LoggingPlugin)
        .add_plugins(PlayerPlugin)
        .add_plugins(HotReloadPlugin::default())
        .insert_resource(DemoScript {
            timer: Timer::from_seconds(HIT_INTERVAL_SECS, TimerMode::Repeating),
            hits: 0,
        })
        .add_systems(PostStartup, spawn_player)
        .add_systems(
            Update,
            (scripted_damage, log_notifications, exit_when_done),
        )
        .run();
}

// Runs after the hot-reload watcher has loaded the tuning file
fn spawn_player(mut commands: Commands, settings: Res<FeedbackSettings>) {
    commands.spawn((
        PlayerFeedback::new(settings.0.clone()),
        Transform::from_xyz(0.0, 1.0, 0.0),
        FeedbackUniforms::default(),
    ));
    info!("Demo player spawned");
}

fn scripted_damage(
    time: Res<Time>,
    mut script: ResMut<DemoScript>,
    players: Query<Entity, With<PlayerFeedback>>,
    mut hits: EventWriter<IncomingDamage>,
) {
    if !script.timer.tick(time.delta()).just_finished() {
        return;
    }
    script.hits += 1;

    let (amount, damage_type, knockback) = match script.hits % 4 {
        0 => (35.0, DamageType::Explosive, 12.0),
        1 => (12.0, DamageType::Ballistic, 0.0),
        2 => (20.0, DamageType::Melee, 6.0),
        _ => (8.0, DamageType::Fall, 0.0),
    };
    for target in &players {
        hits.send(IncomingDamage {
            target,
            damage: DamageEvent::new(amount, damage_type)
                .with_hit(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.5))
                .with_knockback(knockback),
        });
    }
}

fn log_notifications(
    mut notifications: EventReader<VitalsNotification>,
    mut respawns: EventWriter<RespawnRequest>,
    players: Query<(&PlayerFeedback, &FeedbackUniforms)>,
) {
    for note in notifications.read() {
        let Ok((player, uniforms)) = players.get(note.entity) else {
            continue;
        };
        match note.event {
            VitalsEvent::Damaged(amount) => info!(
                "damaged {:.1} -> hp {:.0}% armor {:.0}% vignette {:.2} chroma {:.2}",
                amount,
                player.health_percent() * 100.0,
                player.armor_percent() * 100.0,
                uniforms.vignette_intensity,
                uniforms.chromatic_aberration,
            ),
            VitalsEvent::Healed(amount) => debug!("healed {:.2}", amount),
            VitalsEvent::Died => {
                info!("player died, respawning");
                respawns.send(RespawnRequest {
                    target: note.entity,
                    position: Vec3::new(0.0, 1.0, 0.0),
                });
            }
            VitalsEvent::Respawned => info!("player respawned"),
        }
    }
}

fn exit_when_done(
    time: Res<Time>,
    players: Query<(&PlayerFeedback, &Transform)>,
    mut exit: EventWriter<AppExit>,
) {
    if time.elapsed_secs() < DEMO_SECONDS {
        return;
    }
    for (player, transform) in &players {
        info!(
            "final: hp {:.0}% dead {} position {:?}",
            player.health_percent() * 100.0,
            player.is_dead(),
            transform.translation
        );
    }
    exit.send(AppExit::Success);
}
