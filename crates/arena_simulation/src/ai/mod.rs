//! Bot AI: FSM (Patrol/Chase/Attack/Retreat), perception, waypoint навигация
//!
//! Решения и поведение — FrameUpdate (переменный шаг), движение тела —
//! FixedTick через `BotSteering`.

use bevy::prelude::*;

pub mod behaviour;
pub mod fsm;
pub mod navigator;
pub mod perception;


// Re-export основных типов
pub use behaviour::{bot_behaviour, bot_decide, reset_bursts};
pub use fsm::{apply_transition, decide_state, AIConfig, AIState, BotBrain};
pub use navigator::{bot_motion, horizontal_distance, yaw_towards, BotNavigator, BotSteering};
pub use perception::{has_line_of_sight, perceive, Perception};

use crate::core::{fire_due_timers, FixedSet, FixedTick, FrameSet, FrameUpdate};

/// AI Plugin
///
/// Порядок выполнения:
/// 1. reset_bursts — BurstReset таймеры (FixedTick, Timers)
/// 2. bot_motion — BotSteering → kinematic body (FixedTick, Motion)
/// 3. bot_decide — perception + FSM transitions (FrameUpdate, Decide)
/// 4. bot_behaviour — state → steering + стрельба (FrameUpdate, Decide)
pub struct AIPlugin;

impl Plugin for AIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedTick,
            reset_bursts.in_set(FixedSet::Timers).after(fire_due_timers),
        )
        .add_systems(FixedTick, bot_motion.in_set(FixedSet::Motion));

        app.add_systems(
            FrameUpdate,
            (bot_decide, bot_behaviour)
                .chain() // решение до поведения в том же кадре
                .in_set(FrameSet::Decide),
        );
    }
}
