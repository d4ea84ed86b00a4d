//! Custom schedules и fixed tick counter
//!
//! # Архитектура кадра
//!
//! `GameLoop::frame(now)`:
//!   ├─ FixedTick × N  (N = сколько целых шагов накопилось в accumulator)
//!   │    Clock → Timers → Motion → Physics → Readback
//!   ├─ FrameUpdate × 1 (clamped frame delta)
//!   │    Weapons → Input → Decide → Resolve → Apply → Lifecycle
//!   ├─ RenderSync     (VisualCommand для хоста)
//!   └─ FrameEnd       (flush event queues, сброс per-frame input; в любом состоянии)
//!
//! `SimulationStartup` запускается один раз из `GameLoop::new`.

use std::time::Duration;

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;

/// Fixed-step schedule (1/60s по умолчанию)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedTick;

/// Variable-rate schedule, ровно один раз за кадр после fixed ticks
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameUpdate;

/// Render handoff: синхронизация визуала, запускается даже на паузе
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderSync;

/// Конец кадра: переключение буферов event queues
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameEnd;

/// Одноразовый setup (арена, игрок, начальная популяция ботов)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SimulationStartup;

/// Фазы FixedTick
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedSet {
    /// Tick counter
    Clock,
    /// Scheduled events (reload, burst reset, respawn)
    Timers,
    /// Kinematic writes (player controller, bot steering)
    Motion,
    /// Ровно один physics step
    Physics,
    /// Transform ← physics body
    Readback,
}

/// Фазы FrameUpdate
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Weapon cooldown timers
    Weapons,
    /// Player input → look / fire / reload / switch
    Input,
    /// Bot AI: perception + FSM + per-state behaviour
    Decide,
    /// Fire records → raycast → HitEvent
    Resolve,
    /// HitEvent → Health
    Apply,
    /// Death reactions, spawner bookkeeping
    Lifecycle,
}

/// Фазы SimulationStartup
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartupSet {
    /// Геометрия, spawn points, waypoints
    Arena,
    /// Игрок
    Player,
    /// Начальная популяция ботов
    Population,
}

/// Детерминистичный счётчик fixed ticks
///
/// Время симуляции = `tick * step`, без накопления float ошибки.
/// Все scheduled events сверяются с этим временем.
#[derive(Resource, Debug, Clone)]
pub struct FixedClock {
    pub step: Duration,
    pub tick: u64,
}

impl FixedClock {
    pub fn new(step: Duration) -> Self {
        Self { step, tick: 0 }
    }

    pub fn step_secs(&self) -> f32 {
        self.step.as_secs_f32()
    }

    /// Симулированное время (секунды) на конец текущего тика
    pub fn elapsed_secs(&self) -> f64 {
        self.tick as f64 * self.step.as_secs_f64()
    }
}

/// System: Increment tick counter (FixedTick, запускается ПЕРВЫМ)
pub fn increment_tick_counter(mut clock: ResMut<FixedClock>) {
    clock.tick = clock.tick.wrapping_add(1);
}

/// System: переключает буферы `Events<E>` в конце кадра
///
/// Bevy делает это в `First`, но мы не запускаем Main schedule.
pub fn flush_events<E: Event>(mut events: ResMut<Events<E>>) {
    events.update();
}

/// Регистрация event queue, которая живёт один кадр симуляции
pub trait FrameEventsExt {
    fn add_frame_event<E: Event>(&mut self) -> &mut Self;
}

impl FrameEventsExt for App {
    fn add_frame_event<E: Event>(&mut self) -> &mut Self {
        self.add_event::<E>()
            .add_systems(FrameEnd, flush_events::<E>)
    }
}
