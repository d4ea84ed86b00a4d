//! Базовые компоненты акторов: Actor, Player, Bot

use bevy::prelude::*;

/// Тип entity (закрытый набор вариантов)
///
/// Оружие hitscan — снарядов-entity нет.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum EntityKind {
    Player,
    Bot,
}

/// Актор — любой entity с геймплейной идентичностью
///
/// Identity = сам `Entity` (generational id, не переиспользуется пока жив).
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Actor {
    pub kind: EntityKind,
    /// Человекочитаемое имя для логов ("player-1", "bot-3")
    pub callsign: String,
}

impl Actor {
    pub fn new(kind: EntityKind, callsign: impl Into<String>) -> Self {
        Self {
            kind,
            callsign: callsign.into(),
        }
    }
}

/// Marker: игрок
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Player;

/// Marker: бот (serial — порядковый номер спавна)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Bot {
    pub serial: u32,
}
