//! Конфигурация симуляции (serde, JSON)
//!
//! Все секции `#[serde(default)]` — в JSON достаточно указать только
//! переопределяемые поля. Вектора хранятся как `[f32; 3]`: bevy собран без
//! feature `serialize`.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ai::AIConfig;
use crate::error::SimulationError;

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed для `DeterministicRng`
    pub seed: u64,
    pub loop_config: LoopConfig,
    pub player: PlayerConfig,
    pub bots: BotConfig,
    pub ai: AIConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            loop_config: LoopConfig::default(),
            player: PlayerConfig::default(),
            bots: BotConfig::default(),
            ai: AIConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.loop_config.fixed_hz > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "loop_config.fixed_hz must be positive, got {}",
                self.loop_config.fixed_hz
            )));
        }
        if !(self.loop_config.max_delta_secs > 0.0) {
            return Err(SimulationError::InvalidConfig(format!(
                "loop_config.max_delta_secs must be positive, got {}",
                self.loop_config.max_delta_secs
            )));
        }
        if self.player.max_health <= 0.0 || self.bots.max_health <= 0.0 {
            return Err(SimulationError::InvalidConfig(
                "max_health must be positive".to_string(),
            ));
        }
        if self.bots.arrival_radius <= 0.0 {
            return Err(SimulationError::InvalidConfig(
                "bots.arrival_radius must be positive".to_string(),
            ));
        }
        if self.ai.retreat_threshold < 0.0 || self.ai.retreat_threshold > 100.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "ai.retreat_threshold must be a percentage, got {}",
                self.ai.retreat_threshold
            )));
        }
        Ok(())
    }
}

/// Параметры GameLoop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Частота fixed update (Hz)
    pub fixed_hz: f64,
    /// Верхний предел frame delta (секунды)
    pub max_delta_secs: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_hz: 60.0,
            max_delta_secs: 0.1,
        }
    }
}

impl LoopConfig {
    pub fn fixed_step(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fixed_hz)
    }

    pub fn max_delta(&self) -> Duration {
        Duration::from_secs_f64(self.max_delta_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: f32,
    pub move_speed: f32,
    pub sprint_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub mouse_sensitivity: f32,
    /// Высота камеры над центром капсулы (origin выстрела)
    pub camera_height: f32,
    pub min_altitude: f32,
    pub ground_ray_length: f32,
    pub ground_threshold: f32,
    /// Респавн игрока после смерти (секунды)
    pub respawn_delay: f32,
    pub spawn_position: [f32; 3],
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 5.0,
            sprint_speed: 7.5,
            jump_force: 5.0,
            gravity: -9.81,
            mouse_sensitivity: 0.002,
            camera_height: 1.7,
            min_altitude: 0.5,
            ground_ray_length: 1.5,
            ground_threshold: 1.2,
            respawn_delay: 3.0,
            spawn_position: [0.0, 2.0, 0.0],
        }
    }
}

impl PlayerConfig {
    pub fn spawn_position(&self) -> Vec3 {
        Vec3::from_array(self.spawn_position)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Целевая популяция ботов
    pub max_bots: usize,
    pub max_health: f32,
    /// Задержка между смертью бота и заменой (секунды)
    pub respawn_delay: f32,
    /// Сколько spawn point остаётся occupied после использования
    pub spawn_grace: f32,
    /// Минимальный интервал между спавнами на одной точке
    pub spawn_cooldown: f32,
    /// Минимальная дистанция spawn point от игрока
    pub min_spawn_distance: f32,
    pub move_speed: f32,
    /// Radius прибытия к waypoint
    pub arrival_radius: f32,
    /// Бот не двигается, если до цели ближе этого
    pub stop_distance: f32,
    pub min_altitude: f32,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            max_bots: 5,
            max_health: 100.0,
            respawn_delay: 5.0,
            spawn_grace: 2.0,
            spawn_cooldown: 2.0,
            min_spawn_distance: 15.0,
            move_speed: 4.0,
            arrival_radius: 2.0,
            stop_distance: 0.5,
            min_altitude: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bots.max_bots, 5);
        assert_eq!(config.loop_config.fixed_hz, 60.0);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json_str(r#"{ "seed": 7, "bots": { "max_bots": 2 } }"#)
            .expect("valid config");

        assert_eq!(config.seed, 7);
        assert_eq!(config.bots.max_bots, 2);
        assert_eq!(config.bots.respawn_delay, 5.0);
        assert_eq!(config.player.spawn_position, [0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_invalid_rate_rejected() {
        let result = SimulationConfig::from_json_str(r#"{ "loop_config": { "fixed_hz": 0.0 } }"#);
        assert!(matches!(result, Err(SimulationError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = SimulationConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(SimulationError::ConfigParse(_))));
    }

    #[test]
    fn test_fixed_step_60hz() {
        let step = LoopConfig::default().fixed_step();
        assert!((step.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }
}
