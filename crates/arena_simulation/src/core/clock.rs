//! Frame clock + fixed-step accumulator
//!
//! Время хоста — монотонный `Duration` от произвольного origin
//! (аналог `performance.now()`). Внутри всё в целых наносекундах:
//! разбиение одной и той же суммы delta на кадры не влияет на число fixed шагов.

use std::time::Duration;

use bevy::prelude::*;

/// Frame clock (variable rate)
///
/// Первый `update` даёт delta = 0. Delta clamp'ится до `max_delta`.
#[derive(Resource, Debug, Clone)]
pub struct Clock {
    last: Option<Duration>,
    delta: Duration,
    elapsed: Duration,
    max_delta: Duration,
    frame: u64,
}

impl Clock {
    pub fn new(max_delta: Duration) -> Self {
        Self {
            last: None,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            max_delta,
            frame: 0,
        }
    }

    /// Обновить clock текущим временем хоста, вернуть clamped delta
    pub fn update(&mut self, now: Duration) -> Duration {
        // Время хоста "назад" (смена origin) → нулевой кадр
        let raw = match self.last {
            Some(last) => now.saturating_sub(last),
            None => Duration::ZERO,
        };

        self.last = Some(now);
        self.delta = raw.min(self.max_delta);
        self.elapsed += self.delta;
        self.frame += 1;
        self.delta
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Сумма clamped delta с начала (секунды)
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    pub fn max_delta(&self) -> Duration {
        self.max_delta
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}

/// Fixed-step accumulator
///
/// Инвариант: `pending < step` после полного `drain`.
#[derive(Debug, Clone)]
pub struct Accumulator {
    step: Duration,
    pending: Duration,
}

impl Accumulator {
    pub fn new(step: Duration) -> Self {
        Self {
            step,
            pending: Duration::ZERO,
        }
    }

    pub fn accumulate(&mut self, delta: Duration) {
        self.pending += delta;
    }

    /// Забрать один fixed шаг, если он накопился
    pub fn consume_step(&mut self) -> bool {
        if self.step.is_zero() || self.pending < self.step {
            return false;
        }
        self.pending -= self.step;
        true
    }

    pub fn pending(&self) -> Duration {
        self.pending
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Доля следующего шага (0..1) — для интерполяции на стороне рендера
    pub fn alpha(&self) -> f32 {
        if self.step.is_zero() {
            return 0.0;
        }
        (self.pending.as_secs_f64() / self.step.as_secs_f64()) as f32
    }
}
