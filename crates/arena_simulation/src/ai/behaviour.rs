//! Bot AI systems: perception + FSM (bot_decide), поведение по состоянию (bot_behaviour)
//!
//! Цель — единственный живой игрок. Мёртвый игрок не виден и не является целью.
//! Ошибки одного бота логируются, остальные боты обрабатываются дальше.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{
    apply_transition, decide_state, perceive, AIConfig, AIState, BotBrain, BotNavigator, BotSteering,
};
use crate::combat::{FireOutcome, ReloadOutcome, WeaponControl, WeaponManager};
use crate::components::{Bot, Health, Player};
use crate::core::{FixedClock, TimerElapsed, TimerKind};
use crate::physics::PhysicsWorld;
use crate::world::ArenaMap;
use crate::DeterministicRng;

/// Позиция живого игрока (если есть)
fn live_target(players: &Query<(Entity, &Transform, &Health), With<Player>>) -> Option<(Entity, Vec3)> {
    players
        .iter()
        .find(|(_, _, health)| health.is_alive())
        .map(|(entity, transform, _)| (entity, transform.translation))
}

/// System: perception + FSM transition (FrameSet::Decide)
///
/// Perception обновляется каждый кадр (дистанция нужна поведению),
/// переоценка состояния — только после debounce окна.
pub fn bot_decide(
    mut bots: Query<(Entity, &Transform, &Health, &AIConfig, &mut AIState, &mut BotBrain), With<Bot>>,
    players: Query<(Entity, &Transform, &Health), With<Player>>,
    physics: Res<PhysicsWorld>,
    clock: Res<FixedClock>,
) {
    let now = clock.elapsed_secs();
    let target = live_target(&players);

    for (entity, transform, health, config, mut state, mut brain) in bots.iter_mut() {
        if health.is_dead() {
            continue;
        }

        let position = transform.translation;
        match target {
            Some((target_entity, target_position)) => {
                let seen = perceive(
                    &physics,
                    entity,
                    position,
                    target_position,
                    config.eye_height,
                    config.los_tolerance,
                );
                brain.target = Some(target_entity);
                brain.target_visible = seen.visible;
                brain.target_distance = seen.distance;
            }
            None => {
                brain.target = None;
                brain.target_visible = false;
                brain.target_distance = f32::INFINITY;
            }
        }

        if !brain.can_reevaluate(now, config.state_change_delay) {
            continue;
        }

        let next = decide_state(health.percentage(), brain.target_visible, brain.target_distance, config);
        let current = *state;
        if current.can_transition_to(next) {
            // DerefMut только при реальной смене (change detection)
            apply_transition(entity, &mut state, &mut brain, next, now);
        }
    }
}

/// System: поведение текущего состояния → BotSteering + стрельба (FrameSet::Decide)
pub fn bot_behaviour(
    mut bots: Query<
        (
            Entity,
            &Transform,
            &Health,
            &AIConfig,
            &AIState,
            &mut BotBrain,
            &mut BotNavigator,
            &mut BotSteering,
            &mut WeaponManager,
        ),
        With<Bot>,
    >,
    players: Query<(Entity, &Transform, &Health), With<Player>>,
    map: Res<ArenaMap>,
    mut rng: ResMut<DeterministicRng>,
    mut control: WeaponControl,
) {
    let target = live_target(&players).map(|(_, position)| position);
    let now = control.now();

    for (entity, transform, health, config, state, mut brain, mut navigator, mut steering, mut manager) in
        bots.iter_mut()
    {
        if health.is_dead() {
            continue;
        }

        let position = transform.translation;
        match (*state, target) {
            (AIState::Patrol, _) | (AIState::Retreat, None) => {
                steering.facing = None;
                steering.target = navigator.patrol(position, &map, &mut rng.rng);
            }
            (AIState::Chase, Some(player)) => {
                steering.move_to_target(Vec3::new(player.x, position.y, player.z));
                steering.look_at(player);
            }
            (AIState::Attack, Some(player)) => {
                steering.look_at(player);
                steering.target = None;

                if brain.can_fire(now, config) {
                    fire_at(entity, position, player, config, &mut brain, &mut manager, &mut control, &mut rng.rng);
                }

                if brain.burst_exhausted(config) {
                    control.timers().schedule_if_absent(
                        entity,
                        TimerKind::BurstReset,
                        now + config.burst_cooldown as f64,
                    );
                }

                if brain.target_distance < config.standoff_distance {
                    let away = (position - player).normalize_or_zero();
                    steering.move_to_target(position + away * config.backpedal_distance);
                }
            }
            (AIState::Retreat, Some(player)) => {
                let mut away = position - player;
                away.y = 0.0;
                let away = away.normalize_or_zero();
                steering.move_to_target(position + away * config.retreat_distance);
                steering.look_at(player);
            }
            (AIState::Chase | AIState::Attack, None) => {
                steering.stop();
            }
        }
    }
}

/// Один выстрел бота с разбросом прицела
///
/// Пустой магазин → автоматическая перезарядка.
fn fire_at(
    entity: Entity,
    position: Vec3,
    target: Vec3,
    config: &AIConfig,
    brain: &mut BotBrain,
    manager: &mut WeaponManager,
    control: &mut WeaponControl,
    rng: &mut impl Rng,
) {
    let spread = (1.0 - config.accuracy) * 2.0;
    let jitter = Vec3::new(
        (rng.gen::<f32>() - 0.5) * spread,
        (rng.gen::<f32>() - 0.5) * spread,
        (rng.gen::<f32>() - 0.5) * spread,
    );
    let aim = target + Vec3::Y * config.aim_height + jitter;
    let origin = position + Vec3::Y * config.eye_height;

    match control.pull_trigger(entity, manager, origin, aim - origin, rng) {
        FireOutcome::Fired(_) => brain.register_shot(control.now()),
        FireOutcome::Empty => {
            if let ReloadOutcome::NoReserve = control.reload(entity, manager) {
                crate::log(&format!("🤖 Bot {:?} is out of ammo", entity));
            }
        }
        FireOutcome::Reloading | FireOutcome::CoolingDown => {}
    }
}

/// System: BurstReset timer → счётчик очереди = 0 (FixedTick, после fire_due_timers)
pub fn reset_bursts(mut timers: EventReader<TimerElapsed>, mut brains: Query<&mut BotBrain>) {
    for timer in timers.read() {
        if timer.kind != TimerKind::BurstReset {
            continue;
        }
        if let Ok(mut brain) = brains.get_mut(timer.entity) {
            brain.burst_count = 0;
        }
    }
}
