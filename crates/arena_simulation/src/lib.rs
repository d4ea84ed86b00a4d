//! ARENA Simulation Core
//!
//! Симуляция first-person arena shooter на Bevy 0.16 ECS:
//! игрок, боты с FSM, hitscan оружие, health, spawn/respawn.
//!
//! Рендер, HUD и опрос устройств ввода — на стороне хоста:
//! - ввод: хост пишет в `InputState` resource
//! - рендер: хост дренирует `Events<VisualCommand>` после `GameLoop::frame`
//!
//! Physics — rapier напрямую (через re-export `bevy_rapier3d::rapier`),
//! шаг вызывается из нашего FixedTick.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

// Публичные модули
pub mod ai;
pub mod bots;
pub mod combat;
pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod logger;
pub mod physics;
pub mod player;
pub mod world;

// Re-export основных типов
pub use ai::{AIConfig, AIPlugin, AIState};
pub use bots::{BotSpawner, BotsPlugin};
pub use combat::{
    CombatPlugin, DamageDealt, EntityDied, FireOutcome, HitEvent, KillIntent, MatchStats,
    ReloadOutcome, Weapon, WeaponKind, WeaponManager,
};
pub use components::{Actor, Bot, EntityKind, Health, Player, Visual, VisualAsset, VisualCommand, VisualPlugin};
pub use config::{BotConfig, LoopConfig, PlayerConfig, SimulationConfig};
pub use crate::core::{CorePlugin, FixedClock, FrameReport, GameLoop, GameState, ScheduledEvents, TimerKind};
pub use error::{PhysicsError, SimulationError, SpawnError};
pub use logger::{init_logger, log, log_error, log_info, log_warning, set_log_level, set_logger, LogLevel, LogPrinter};
pub use physics::{PhysicsPlugin, PhysicsWorld};
pub use player::{Control, InputState, PlayerPlugin};
pub use world::{ArenaMap, SpawnPoint, WorldPlugin};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// Config вставляется ДО подсистем: CorePlugin читает из него fixed step.
#[derive(Default)]
pub struct SimulationPlugin {
    pub config: SimulationConfig,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.config.clone())
            // Детерминистичный RNG (seed из конфига)
            .insert_resource(DeterministicRng::new(self.config.seed))
            .add_plugins((
                CorePlugin,
                PhysicsPlugin,
                VisualPlugin,
                CombatPlugin,
                PlayerPlugin,
                AIPlugin,
                WorldPlugin,
                BotsPlugin,
            ));
    }
}

/// Детерминистичный RNG resource (seeded)
///
/// Единственный источник случайности: spread, waypoints, выбор spawn point, aim jitter.
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт Bevy App для headless симуляции (без Main schedule и рендера)
pub fn create_headless_app(config: &SimulationConfig) -> App {
    init_logger();

    let mut app = App::new();
    app.add_plugins(SimulationPlugin {
        config: config.clone(),
    });
    app
}

/// Валидация конфига → App → GameLoop (startup выполнен, состояние Menu)
pub fn build_simulation(config: &SimulationConfig) -> Result<GameLoop, SimulationError> {
    config.validate()?;
    GameLoop::new(create_headless_app(config))
}

/// Состояние одного актора для сравнения детерминизма / вывода в runner
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorSnapshot {
    pub callsign: String,
    pub kind: String,
    pub position: [f32; 3],
    pub health: f32,
    pub dead: bool,
    pub ai_state: Option<String>,
    pub ammo: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub player_kills: u32,
    pub player_deaths: u32,
    pub bots_spawned: u32,
    pub actors: Vec<ActorSnapshot>,
}

/// Snapshot мира (акторы отсортированы по callsign)
pub fn world_snapshot(world: &mut World) -> WorldSnapshot {
    let mut query = world.query::<(
        &Actor,
        &Transform,
        Option<&Health>,
        Option<&AIState>,
        Option<&WeaponManager>,
    )>();

    let mut actors: Vec<ActorSnapshot> = query
        .iter(world)
        .map(|(actor, transform, health, state, weapons)| ActorSnapshot {
            callsign: actor.callsign.clone(),
            kind: format!("{:?}", actor.kind),
            position: transform.translation.to_array(),
            health: health.map_or(0.0, |health| health.current),
            dead: health.is_some_and(Health::is_dead),
            ai_state: state.map(|state| format!("{:?}", state)),
            ammo: weapons.map(|manager| manager.active_weapon().current_ammo),
        })
        .collect();
    actors.sort_by(|a, b| a.callsign.cmp(&b.callsign));

    let tick = world.get_resource::<FixedClock>().map_or(0, |clock| clock.tick);
    let stats = world.get_resource::<MatchStats>().cloned().unwrap_or_default();

    WorldSnapshot {
        tick,
        player_kills: stats.player_kills,
        player_deaths: stats.player_deaths,
        bots_spawned: stats.bots_spawned,
        actors,
    }
}
