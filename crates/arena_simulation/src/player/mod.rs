//! Player: input state, first-person контроллер, dash, spawn/respawn
//!
//! Акторы С компонентом `Player` управляются input системами,
//! боты — AI системами (`Without<Player>` не нужен: у ботов нет MotionController).

use bevy::prelude::*;

pub mod actions;
pub mod controller;
pub mod dash;
pub mod input;
pub mod lifecycle;

pub use actions::player_actions;
pub use controller::{detect_ground, player_look, player_motion, MotionController, MotionIntent};
pub use dash::DashAbility;
pub use input::{reset_frame_input, Control, InputState};
pub use lifecycle::{respawn_player, schedule_player_respawn, spawn_player};

use crate::core::{
    fire_due_timers, FixedSet, FixedTick, FrameEnd, FrameSet, FrameUpdate, SimulationStartup,
    StartupSet,
};

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputState>();

        app.add_systems(SimulationStartup, spawn_player.in_set(StartupSet::Player));

        app.add_systems(
            FixedTick,
            respawn_player.in_set(FixedSet::Timers).after(fire_due_timers),
        )
        .add_systems(FixedTick, player_motion.in_set(FixedSet::Motion));

        app.add_systems(
            FrameUpdate,
            (player_look, player_actions).chain().in_set(FrameSet::Input),
        )
        .add_systems(FrameUpdate, schedule_player_respawn.in_set(FrameSet::Lifecycle));

        // FrameEnd идёт и вне Playing: ввод за паузу не копится
        app.add_systems(FrameEnd, reset_frame_input);
    }
}
