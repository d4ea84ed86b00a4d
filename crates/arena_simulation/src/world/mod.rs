//! World: карта арены, spawn points, построение геометрии

use bevy::prelude::*;

pub mod arena;
pub mod map;
pub mod spawn_point;

pub use arena::{arena_layout, build_simple_arena, ArenaGeometry, ARENA_SIZE};
pub use map::ArenaMap;
pub use spawn_point::{
    available_spawn_point, occupy_spawn_point, release_spawn_points, SpawnPoint, SpawnQuery,
};

use crate::core::{fire_due_timers, FixedSet, FixedTick, SimulationStartup, StartupSet};

pub struct WorldPlugin;

impl Plugin for WorldPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArenaMap>();

        app.add_systems(SimulationStartup, build_simple_arena.in_set(StartupSet::Arena))
            .add_systems(
                FixedTick,
                release_spawn_points
                    .in_set(FixedSet::Timers)
                    .after(fire_due_timers),
            );
    }
}
