//! Bots: популяция, смерть, отложенная замена

use bevy::prelude::*;

pub mod spawner;

pub use spawner::{
    dispose_bots, handle_bot_deaths, replace_dead_bots, retry_pending_spawns, spawn_initial_bots,
    BotFactory, BotSpawner,
};

use crate::core::{fire_due_timers, FixedSet, FixedTick, FrameSet, FrameUpdate, SimulationStartup, StartupSet};

/// Bots Plugin
///
/// Порядок выполнения:
/// 1. spawn_initial_bots — SimulationStartup (после арены и игрока)
/// 2. replace_dead_bots → retry_pending_spawns — FixedTick, по таймерам
/// 3. handle_bot_deaths — FrameUpdate, Lifecycle
pub struct BotsPlugin;

impl Plugin for BotsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BotSpawner>();

        app.add_systems(SimulationStartup, spawn_initial_bots.in_set(StartupSet::Population));

        app.add_systems(
            FixedTick,
            (replace_dead_bots, retry_pending_spawns)
                .chain()
                .in_set(FixedSet::Timers)
                .after(fire_due_timers),
        )
        .add_systems(FrameUpdate, handle_bot_deaths.in_set(FrameSet::Lifecycle));
    }
}
