//! GameLoop — fixed-timestep driver
//!
//! Владеет `App` (никаких глобальных singletons): clock, input, physics —
//! ресурсы этого мира. Хост вызывает `frame(now)` раз в display refresh.

use std::time::Duration;

use bevy::prelude::*;

use crate::core::clock::{Accumulator, Clock};
use crate::core::schedules::{FixedClock, FixedTick, FrameEnd, FrameUpdate, RenderSync, SimulationStartup};
use crate::core::timers::ScheduledEvents;
use crate::error::SimulationError;
use crate::physics::PhysicsWorld;
use crate::player::InputState;
use crate::SimulationConfig;

/// Состояние игры (Loading → Menu → Playing ⇄ Paused → GameOver)
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum GameState {
    #[default]
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Event: смена GameState
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateChanged {
    pub from: GameState,
    pub to: GameState,
}

/// Итог одного кадра
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Clamped frame delta
    pub delta: Duration,
    /// Сколько FixedTick выполнено в этом кадре
    pub fixed_steps: u32,
    /// Был ли запущен FrameUpdate
    pub variable_update: bool,
}

pub struct GameLoop {
    app: App,
    accumulator: Accumulator,
    running: bool,
}

impl GameLoop {
    /// Проверить обязательные ресурсы и выполнить `SimulationStartup`
    pub fn new(mut app: App) -> Result<Self, SimulationError> {
        require_resource::<Clock>(&app, "Clock")?;
        require_resource::<FixedClock>(&app, "FixedClock")?;
        require_resource::<PhysicsWorld>(&app, "PhysicsWorld")?;
        require_resource::<ScheduledEvents>(&app, "ScheduledEvents")?;
        require_resource::<InputState>(&app, "InputState")?;
        require_resource::<GameState>(&app, "GameState")?;
        require_resource::<SimulationConfig>(&app, "SimulationConfig")?;

        let schedules = app
            .world()
            .get_resource::<Schedules>()
            .ok_or(SimulationError::MissingResource("Schedules"))?;
        for (label, present) in [
            ("FixedTick schedule", schedules.contains(FixedTick)),
            ("FrameUpdate schedule", schedules.contains(FrameUpdate)),
            ("RenderSync schedule", schedules.contains(RenderSync)),
            ("FrameEnd schedule", schedules.contains(FrameEnd)),
            ("SimulationStartup schedule", schedules.contains(SimulationStartup)),
        ] {
            if !present {
                return Err(SimulationError::MissingResource(label));
            }
        }

        let step = app.world().resource::<FixedClock>().step;
        if step.is_zero() {
            return Err(SimulationError::InvalidConfig("fixed step is zero".to_string()));
        }

        app.world_mut()
            .try_run_schedule(SimulationStartup)
            .map_err(|err| {
                crate::logger::log_error(&format!("❌ SimulationStartup failed: {}", err));
                SimulationError::MissingResource("SimulationStartup schedule")
            })?;

        let mut game_loop = Self {
            app,
            accumulator: Accumulator::new(step),
            running: true,
        };
        game_loop.set_state(GameState::Menu);

        crate::logger::log_info(&format!(
            "🎮 GameLoop ready (fixed step {:.4}s)",
            step.as_secs_f64()
        ));

        Ok(game_loop)
    }

    /// Перейти в Playing
    pub fn start(&mut self) {
        self.set_state(GameState::Playing);
    }

    /// Один кадр хоста
    ///
    /// 1. Clock → clamped delta
    /// 2. Playing: accumulator += delta, FixedTick пока есть целый шаг, затем FrameUpdate
    /// 3. RenderSync + FrameEnd (всегда)
    pub fn frame(&mut self, now: Duration) -> FrameReport {
        if !self.running {
            return FrameReport::default();
        }

        let world = self.app.world_mut();
        let delta = world.resource_mut::<Clock>().update(now);
        let playing = *world.resource::<GameState>() == GameState::Playing;

        let mut report = FrameReport {
            delta,
            fixed_steps: 0,
            variable_update: false,
        };

        if playing {
            self.accumulator.accumulate(delta);
            while self.accumulator.consume_step() {
                world.run_schedule(FixedTick);
                report.fixed_steps += 1;
            }

            world.run_schedule(FrameUpdate);
            report.variable_update = true;
        }

        world.run_schedule(RenderSync);
        world.run_schedule(FrameEnd);

        report
    }

    /// Остановить loop. Повторный запуск не предусмотрен.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            crate::logger::log_info("⏹️ GameLoop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn state(&self) -> GameState {
        *self.app.world().resource::<GameState>()
    }

    pub fn set_state(&mut self, state: GameState) {
        let world = self.app.world_mut();
        let previous = *world.resource::<GameState>();
        if previous == state {
            return;
        }

        *world.resource_mut::<GameState>() = state;
        world.send_event(GameStateChanged {
            from: previous,
            to: state,
        });
        crate::logger::log_info(&format!("Game state changed: {:?} -> {:?}", previous, state));
    }

    /// Остаток accumulator (для интерполяции рендера)
    pub fn interpolation_alpha(&self) -> f32 {
        self.accumulator.alpha()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}

fn require_resource<R: Resource>(app: &App, name: &'static str) -> Result<(), SimulationError> {
    if app.world().contains_resource::<R>() {
        Ok(())
    } else {
        crate::logger::log_error(&format!("Startup failed: missing resource {}", name));
        Err(SimulationError::MissingResource(name))
    }
}
