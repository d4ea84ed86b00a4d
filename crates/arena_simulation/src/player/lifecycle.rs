//! Player spawn / death / respawn
//!
//! Смерть: визуал скрыт, таймер `PlayerRespawn` на игрока.
//! Респавн: полное HP, позиция из конфига, velocity = 0, dash сброшен.

use bevy::prelude::*;

use crate::combat::{EntityDied, EntityRespawned, WeaponManager};
use crate::components::{Actor, EntityKind, EntityLifecycle, Health, Player, Visual, VisualAsset};
use crate::core::{FixedClock, ScheduledEvents, TimerElapsed, TimerKind};
use crate::physics::{BodyDesc, BodyKind, CollisionGroups, PhysicsWorld, ShapeKind};
use crate::player::{DashAbility, MotionController};
use crate::SimulationConfig;

/// System: создать игрока (SimulationStartup, StartupSet::Player)
pub fn spawn_player(mut lifecycle: EntityLifecycle, config: Res<SimulationConfig>) {
    let position = config.player.spawn_position();

    let result = lifecycle.spawn(
        Transform::from_translation(position),
        Some(BodyDesc::new(BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE).with_groups(CollisionGroups::PLAYER)),
        Some(VisualAsset::Player),
        (
            Actor::new(EntityKind::Player, "player"),
            Player,
            Health::new(config.player.max_health),
            MotionController::default(),
            DashAbility::default(),
            WeaponManager::player_loadout(),
        ),
    );

    match result {
        Ok(entity) => crate::log_info(&format!("🧍 Player spawned {:?} at {:?}", entity, position)),
        Err(err) => crate::log_error(&format!("Failed to spawn player: {}", err)),
    }
}

/// System: смерть игрока → скрыть + запланировать респавн (FrameSet::Lifecycle)
pub fn schedule_player_respawn(
    mut deaths: EventReader<EntityDied>,
    mut players: Query<(&mut Visual, &mut MotionController), With<Player>>,
    mut timers: ResMut<ScheduledEvents>,
    clock: Res<FixedClock>,
    config: Res<SimulationConfig>,
) {
    for death in deaths.read() {
        let Ok((mut visual, mut controller)) = players.get_mut(death.entity) else {
            continue;
        };

        visual.visible = false;
        controller.velocity = Vec3::ZERO;
        controller.pending_offset = Vec3::ZERO;

        let due = clock.elapsed_secs() + config.player.respawn_delay as f64;
        timers.schedule(death.entity, TimerKind::PlayerRespawn, due);

        crate::log(&format!(
            "☠️ Player {:?} died, respawn in {:.1}s",
            death.entity, config.player.respawn_delay
        ));
    }
}

/// System: PlayerRespawn timer → респавн (FixedTick, после fire_due_timers)
pub fn respawn_player(
    mut timers: EventReader<TimerElapsed>,
    mut players: Query<
        (
            &mut Health,
            &mut MotionController,
            &mut DashAbility,
            &mut Visual,
            &mut Transform,
        ),
        With<Player>,
    >,
    mut physics: ResMut<PhysicsWorld>,
    mut respawned: EventWriter<EntityRespawned>,
    config: Res<SimulationConfig>,
) {
    for timer in timers.read() {
        if timer.kind != TimerKind::PlayerRespawn {
            continue;
        }
        let Ok((mut health, mut controller, mut dash, mut visual, mut transform)) =
            players.get_mut(timer.entity)
        else {
            continue;
        };

        let position = config.player.spawn_position();
        if let Err(err) = physics.set_position(timer.entity, position) {
            crate::log_error(&format!("respawn_player: {}", err));
            continue;
        }

        health.respawn();
        controller.velocity = Vec3::ZERO;
        controller.pending_offset = Vec3::ZERO;
        controller.grounded = false;
        dash.reset();
        visual.visible = true;
        transform.translation = position;

        respawned.write(EntityRespawned {
            entity: timer.entity,
            position,
        });
        crate::log_info(&format!("🔁 Player {:?} respawned at {:?}", timer.entity, position));
    }
}
