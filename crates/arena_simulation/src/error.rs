//! Ошибки симуляции
//!
//! Фатальные только `SimulationError` (старт). Всё остальное — логируется и
//! пропускается: отказ одного бота не должен ронять тик для остальных.

use bevy::prelude::Entity;
use thiserror::Error;

/// Ошибки инициализации (категория "startup failure")
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("required resource `{0}` is missing from the world")]
    MissingResource(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

/// Ошибки physics binding (логическая ошибка — лог + skip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhysicsError {
    #[error("entity {0:?} has no physics body")]
    MissingBody(Entity),

    #[error("entity {0:?} already owns a physics body")]
    DuplicateBody(Entity),
}

/// Бот не заспавнился (resource exhaustion — отложенный retry, не фатально)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("no eligible spawn point")]
    NoSpawnPoint,

    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
