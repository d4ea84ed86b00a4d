//! ArenaMap — waypoints и метаданные уровня
//!
//! Spawn points живут отдельными entity (`SpawnPoint`), чтобы grace таймер
//! шёл через общую таблицу scheduled events.

use bevy::prelude::*;
use rand::Rng;

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct ArenaMap {
    pub name: String,
    /// Сторона квадратной арены (метры)
    pub size: f32,
    pub waypoints: Vec<Vec3>,
}

impl ArenaMap {
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        Self {
            name: name.into(),
            size,
            waypoints: Vec::new(),
        }
    }

    pub fn add_waypoint(&mut self, position: Vec3) {
        self.waypoints.push(position);
    }

    /// Случайный waypoint (None если список пуст)
    pub fn random_waypoint(&self, rng: &mut impl Rng) -> Option<Vec3> {
        if self.waypoints.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.waypoints.len());
        Some(self.waypoints[index])
    }

    /// Ближайший waypoint к позиции
    pub fn closest_waypoint(&self, position: Vec3) -> Option<Vec3> {
        self.waypoints
            .iter()
            .copied()
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)))
    }

    pub fn clear(&mut self) {
        self.waypoints.clear();
    }
}
