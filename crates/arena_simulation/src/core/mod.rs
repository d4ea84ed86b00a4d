//! Core: clock, fixed-step loop, schedules, scheduled events

use bevy::ecs::schedule::{ExecutorKind, ScheduleLabel};
use bevy::prelude::*;

pub mod clock;
pub mod game_loop;
pub mod schedules;
pub mod timers;

pub use clock::{Accumulator, Clock};
pub use game_loop::{FrameReport, GameLoop, GameState, GameStateChanged};
pub use schedules::{
    flush_events, increment_tick_counter, FixedClock, FixedSet, FixedTick, FrameEnd,
    FrameEventsExt, FrameSet, FrameUpdate, RenderSync, SimulationStartup, StartupSet,
};
pub use timers::{fire_due_timers, ScheduledEvents, TimerElapsed, TimerKind};

use crate::SimulationConfig;

/// Core Plugin
///
/// Создаёт schedules (single-threaded executor, порядок систем фиксирован),
/// clocks и таблицу scheduled events.
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let loop_config = app
            .world()
            .get_resource::<SimulationConfig>()
            .map(|config| config.loop_config.clone())
            .unwrap_or_default();

        app.insert_resource(Clock::new(loop_config.max_delta()))
            .insert_resource(FixedClock::new(loop_config.fixed_step()))
            .init_resource::<ScheduledEvents>()
            .init_resource::<GameState>();

        for label in [
            FixedTick.intern(),
            FrameUpdate.intern(),
            RenderSync.intern(),
            FrameEnd.intern(),
            SimulationStartup.intern(),
        ] {
            app.init_schedule(label);
            app.edit_schedule(label, |schedule| {
                schedule.set_executor_kind(ExecutorKind::SingleThreaded);
            });
        }

        app.configure_sets(
            FixedTick,
            (
                FixedSet::Clock,
                FixedSet::Timers,
                FixedSet::Motion,
                FixedSet::Physics,
                FixedSet::Readback,
            )
                .chain(),
        )
        .configure_sets(
            SimulationStartup,
            (StartupSet::Arena, StartupSet::Player, StartupSet::Population).chain(),
        )
        .configure_sets(
            FrameUpdate,
            (
                FrameSet::Weapons,
                FrameSet::Input,
                FrameSet::Decide,
                FrameSet::Resolve,
                FrameSet::Apply,
                FrameSet::Lifecycle,
            )
                .chain(),
        );

        app.add_frame_event::<TimerElapsed>()
            .add_frame_event::<GameStateChanged>();

        app.add_systems(FixedTick, increment_tick_counter.in_set(FixedSet::Clock))
            .add_systems(FixedTick, fire_due_timers.in_set(FixedSet::Timers));
    }
}
