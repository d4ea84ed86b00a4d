//! BotSpawner — популяция ботов: спавн, смерть, отложенная замена
//!
//! Жизненный цикл бота:
//! 1. spawn на самой дальней от игрока пригодной точке (точка занята на grace window)
//! 2. смерть → визуал скрыт, тело остаётся, таймер `BotRespawn`
//! 3. таймер → despawn + спавн замены
//!
//! Нет свободной точки → `pending += 1`, повтор каждый fixed tick.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::ai::{AIState, BotBrain, BotNavigator, BotSteering};
use crate::combat::{EntityDied, MatchStats, WeaponKind, WeaponManager};
use crate::components::{Actor, Bot, EntityKind, EntityLifecycle, Health, Player, Visual, VisualAsset};
use crate::core::{FixedClock, ScheduledEvents, TimerElapsed, TimerKind};
use crate::error::SpawnError;
use crate::physics::{BodyDesc, BodyKind, CollisionGroups, ShapeKind};
use crate::world::{available_spawn_point, occupy_spawn_point, SpawnPoint, SpawnQuery};
use crate::{DeterministicRng, SimulationConfig};

/// Реестр ботов
#[derive(Resource, Debug, Default)]
pub struct BotSpawner {
    /// Все боты популяции, включая мёртвых в ожидании замены
    bots: Vec<Entity>,
    next_serial: u32,
    /// Сколько спавнов отложено (не было свободной точки)
    pending: usize,
}

impl BotSpawner {
    pub fn bots(&self) -> &[Entity] {
        &self.bots
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.bots.contains(&entity)
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Живые боты (по Health в мире)
    pub fn alive_bot_count(&self, world: &World) -> usize {
        self.bots
            .iter()
            .filter(|entity| world.get::<Health>(**entity).is_some_and(Health::is_alive))
            .count()
    }
}

/// Всё, что нужно для создания/удаления бота
#[derive(SystemParam)]
pub struct BotFactory<'w, 's> {
    lifecycle: EntityLifecycle<'w, 's>,
    spawner: ResMut<'w, BotSpawner>,
    spawn_points: Query<'w, 's, (Entity, &'static mut SpawnPoint)>,
    players: Query<'w, 's, &'static Transform, With<Player>>,
    clock: Res<'w, FixedClock>,
    rng: ResMut<'w, DeterministicRng>,
    config: Res<'w, SimulationConfig>,
    stats: ResMut<'w, MatchStats>,
}

impl<'w, 's> BotFactory<'w, 's> {
    /// Один бот на лучшей доступной точке
    pub fn spawn_bot(&mut self) -> Result<Entity, SpawnError> {
        let now = self.clock.elapsed_secs();
        let bots = &self.config.bots;

        let query = SpawnQuery {
            exclude: self.players.iter().next().map(|transform| transform.translation),
            min_distance: bots.min_spawn_distance,
            now,
            cooldown: bots.spawn_cooldown,
        };
        let point_entity = available_spawn_point(
            self.spawn_points.iter(),
            query,
            &mut self.rng.rng,
        )
        .ok_or(SpawnError::NoSpawnPoint)?;

        let Ok((_, mut point)) = self.spawn_points.get_mut(point_entity) else {
            return Err(SpawnError::NoSpawnPoint);
        };

        let serial = self.spawner.next_serial;
        let transform = Transform::from_translation(point.position).with_rotation(point.rotation());
        let steering = BotSteering {
            speed: bots.move_speed,
            stop_distance: bots.stop_distance,
            min_altitude: bots.min_altitude,
            ..default()
        };

        let entity = self.lifecycle.spawn(
            transform,
            Some(BodyDesc::new(BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE).with_groups(CollisionGroups::BOT)),
            Some(VisualAsset::Bot),
            (
                Actor::new(EntityKind::Bot, format!("bot-{}", serial)),
                Bot { serial },
                Health::new(bots.max_health),
                AIState::default(),
                self.config.ai.clone(),
                BotBrain::default(),
                BotNavigator::new(bots.arrival_radius),
                steering,
                WeaponManager::single(WeaponKind::Rifle),
            ),
        )?;

        occupy_spawn_point(point_entity, &mut point, self.lifecycle.timers(), now, bots.spawn_grace);

        self.spawner.next_serial += 1;
        self.spawner.bots.push(entity);
        self.stats.bots_spawned += 1;

        crate::log(&format!("🤖 Spawned bot-{} {:?} at {:?}", serial, entity, transform.translation));
        Ok(entity)
    }

    /// Спавн или отложенный retry
    pub fn spawn_or_defer(&mut self) -> Option<Entity> {
        match self.spawn_bot() {
            Ok(entity) => Some(entity),
            Err(err) => {
                self.spawner.pending += 1;
                crate::log_warning(&format!(
                    "No bot spawned ({}), {} spawn(s) deferred",
                    err, self.spawner.pending
                ));
                None
            }
        }
    }

    /// Убрать бота из популяции и из мира
    pub fn remove_bot(&mut self, entity: Entity) -> bool {
        let Some(index) = self.spawner.bots.iter().position(|bot| *bot == entity) else {
            return false;
        };
        self.spawner.bots.remove(index);
        self.lifecycle.despawn(entity);
        true
    }

    /// Despawn всех ботов, сброс отложенных спавнов
    pub fn dispose(&mut self) {
        let bots = std::mem::take(&mut self.spawner.bots);
        for entity in &bots {
            self.lifecycle.despawn(*entity);
        }
        self.spawner.pending = 0;
        crate::log(&format!("🧹 Disposed {} bots", bots.len()));
    }

    pub fn max_bots(&self) -> usize {
        self.config.bots.max_bots
    }

    pub fn population(&self) -> usize {
        self.spawner.bots.len()
    }
}

/// System: начальная популяция (SimulationStartup, StartupSet::Population)
pub fn spawn_initial_bots(mut factory: BotFactory) {
    let target = factory.max_bots();
    let mut spawned = 0;
    for _ in 0..target {
        if factory.spawn_or_defer().is_some() {
            spawned += 1;
        }
    }
    crate::log_info(&format!("🤖 Spawned {}/{} bots", spawned, target));
}

/// System: смерть бота → скрыть + запланировать замену (FrameSet::Lifecycle)
///
/// Мёртвый бот остаётся в мире до замены (death visuals на стороне хоста).
pub fn handle_bot_deaths(
    mut deaths: EventReader<EntityDied>,
    mut bots: Query<(&mut Visual, &mut BotSteering), With<Bot>>,
    spawner: Res<BotSpawner>,
    mut timers: ResMut<ScheduledEvents>,
    clock: Res<FixedClock>,
    config: Res<SimulationConfig>,
) {
    for death in deaths.read() {
        if !spawner.contains(death.entity) {
            continue;
        }
        let Ok((mut visual, mut steering)) = bots.get_mut(death.entity) else {
            continue;
        };

        visual.visible = false;
        steering.stop();
        timers.cancel(death.entity, TimerKind::BurstReset);

        let due = clock.elapsed_secs() + config.bots.respawn_delay as f64;
        timers.schedule(death.entity, TimerKind::BotRespawn, due);

        crate::log(&format!(
            "💀 Bot {:?} killed, replacement in {:.1}s",
            death.entity, config.bots.respawn_delay
        ));
    }
}

/// System: BotRespawn timer → despawn + новый бот (FixedTick, после fire_due_timers)
pub fn replace_dead_bots(mut timers: EventReader<TimerElapsed>, mut factory: BotFactory) {
    for timer in timers.read() {
        if timer.kind != TimerKind::BotRespawn {
            continue;
        }
        if factory.remove_bot(timer.entity) {
            factory.spawn_or_defer();
        }
    }
}

/// System: повтор отложенных спавнов (FixedTick, после replace_dead_bots)
pub fn retry_pending_spawns(mut factory: BotFactory) {
    let room = factory.max_bots().saturating_sub(factory.population());
    if factory.spawner.pending > room {
        factory.spawner.pending = room;
    }

    while factory.spawner.pending > 0 {
        match factory.spawn_bot() {
            Ok(_) => factory.spawner.pending -= 1,
            Err(_) => break,
        }
    }
}

/// System: despawn всей популяции (хост запускает через `World::run_system_once`)
pub fn dispose_bots(mut factory: BotFactory) {
    factory.dispose();
}
