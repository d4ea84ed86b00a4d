//! Bot FSM: состояния, параметры, решение о переходе
//!
//! Patrol → Chase → Attack → Retreat (любой переход между разными состояниями).
//! Debounce: после смены состояния минимум `state_change_delay` секунд
//! без переоценки. Первая оценка всегда разрешена.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// AI FSM состояния
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
#[reflect(Component)]
pub enum AIState {
    /// Блуждание по waypoints
    #[default]
    Patrol,
    /// Цель видна, но дальше attack range
    Chase,
    /// Стрельба очередями
    Attack,
    /// Низкое HP — уходим от цели
    Retreat,
}

impl AIState {
    /// Допустимые переходы: любое состояние в любое другое
    pub fn can_transition_to(self, next: AIState) -> bool {
        self != next
    }
}

/// Параметры AI (per-bot component + секция `ai` в SimulationConfig)
#[derive(Component, Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[reflect(Component)]
#[serde(default)]
pub struct AIConfig {
    /// Радиус обнаружения цели (метры)
    pub detection_range: f32,
    /// Радиус стрельбы (метры)
    pub attack_range: f32,
    /// Health порог для отступления (percent, 0..100)
    pub retreat_threshold: f32,
    /// Минимальное время между сменами состояния (секунды)
    pub state_change_delay: f32,
    /// Пауза между выстрелами бота (секунды)
    pub fire_delay: f32,
    /// Выстрелов в очереди
    pub max_burst: u32,
    /// Через сколько секунд после полной очереди счётчик сбрасывается
    pub burst_cooldown: f32,
    /// 0..1, разброс прицела = (1 − accuracy) × 2 по каждой оси
    pub accuracy: f32,
    /// Ближе этого Attack пятится назад
    pub standoff_distance: f32,
    /// Насколько отходить за один шаг отступления при Attack
    pub backpedal_distance: f32,
    /// Дальность точки отступления при Retreat
    pub retreat_distance: f32,
    /// Высота глаз над центром тела (LOS + origin выстрела)
    pub eye_height: f32,
    /// Смещение точки прицеливания над центром цели
    pub aim_height: f32,
    /// LOS блокируется, только если препятствие ближе (distance − tolerance)
    pub los_tolerance: f32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            detection_range: 30.0,
            attack_range: 20.0,
            retreat_threshold: 30.0,
            state_change_delay: 0.5,
            fire_delay: 0.2,
            max_burst: 5,
            burst_cooldown: 1.0,
            accuracy: 0.7,
            standoff_distance: 10.0,
            backpedal_distance: 5.0,
            retreat_distance: 10.0,
            eye_height: 1.5,
            aim_height: 0.3,
            los_tolerance: 1.0,
        }
    }
}

/// Память бота между кадрами
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BotBrain {
    /// Время последней смены состояния (None — ещё не было)
    pub last_state_change: Option<f64>,
    pub last_fire: Option<f64>,
    pub burst_count: u32,
    /// Последние увиденные цель/дистанция (debug / HUD)
    pub target: Option<Entity>,
    pub target_visible: bool,
    pub target_distance: f32,
}

impl BotBrain {
    /// Прошёл ли debounce
    pub fn can_reevaluate(&self, now: f64, delay: f32) -> bool {
        self.last_state_change
            .map_or(true, |changed| now - changed >= delay as f64)
    }

    /// Можно ли стрелять (fire delay + лимит очереди)
    pub fn can_fire(&self, now: f64, config: &AIConfig) -> bool {
        let delay_passed = self
            .last_fire
            .map_or(true, |fired| now - fired > config.fire_delay as f64);
        delay_passed && self.burst_count < config.max_burst
    }

    pub fn register_shot(&mut self, now: f64) {
        self.last_fire = Some(now);
        self.burst_count += 1;
    }

    pub fn burst_exhausted(&self, config: &AIConfig) -> bool {
        self.burst_count >= config.max_burst
    }
}

/// Решение FSM (чистая функция, порядок приоритетов)
///
/// 1. HP < retreat_threshold → Retreat (независимо от видимости)
/// 2. Видим и ≤ attack_range → Attack
/// 3. Видим и ≤ detection_range → Chase
/// 4. Иначе → Patrol
pub fn decide_state(health_percentage: f32, target_visible: bool, distance: f32, config: &AIConfig) -> AIState {
    if health_percentage < config.retreat_threshold {
        AIState::Retreat
    } else if target_visible && distance <= config.attack_range {
        AIState::Attack
    } else if target_visible && distance <= config.detection_range {
        AIState::Chase
    } else {
        AIState::Patrol
    }
}

/// Применить переход (с debounce). `true` если состояние сменилось.
pub fn apply_transition(
    entity: Entity,
    state: &mut AIState,
    brain: &mut BotBrain,
    next: AIState,
    now: f64,
) -> bool {
    if !state.can_transition_to(next) {
        return false;
    }

    crate::log(&format!("🤖 Bot {:?} state: {:?} → {:?}", entity, *state, next));
    *state = next;
    brain.last_state_change = Some(now);
    true
}
