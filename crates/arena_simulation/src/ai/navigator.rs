//! Bot navigation: waypoint patrol + прямое движение к цели
//!
//! AI (FrameUpdate) только пишет `BotSteering`, реальное перемещение
//! kinematic тела — `bot_motion` в FixedTick (Motion фаза, до physics step).

use bevy::prelude::*;
use rand::Rng;

use crate::components::{Bot, Health};
use crate::core::FixedClock;
use crate::physics::PhysicsWorld;
use crate::world::ArenaMap;

/// Waypoint patrol state
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BotNavigator {
    pub waypoint: Option<Vec3>,
    /// Радиус прибытия (по горизонтали: waypoints лежат на полу)
    pub arrival_radius: f32,
}

impl Default for BotNavigator {
    fn default() -> Self {
        Self {
            waypoint: None,
            arrival_radius: 2.0,
        }
    }
}

impl BotNavigator {
    pub fn new(arrival_radius: f32) -> Self {
        Self {
            waypoint: None,
            arrival_radius,
        }
    }

    pub fn has_reached(&self, position: Vec3) -> bool {
        match self.waypoint {
            Some(waypoint) => horizontal_distance(position, waypoint) < self.arrival_radius,
            None => true,
        }
    }

    pub fn pick_new_waypoint(&mut self, map: &ArenaMap, rng: &mut impl Rng) {
        self.waypoint = map.random_waypoint(rng);
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.waypoint = Some(target);
    }

    /// Один patrol тик: куда идти сейчас
    ///
    /// Нет waypoint → случайный из карты. Достигнут → сброс, новый
    /// выбирается на следующем тике (в этом тике стоим).
    pub fn patrol(&mut self, position: Vec3, map: &ArenaMap, rng: &mut impl Rng) -> Option<Vec3> {
        if self.waypoint.is_none() {
            self.pick_new_waypoint(map, rng);
        }

        let waypoint = self.waypoint?;
        if horizontal_distance(position, waypoint) < self.arrival_radius {
            self.waypoint = None;
            return None;
        }
        Some(waypoint)
    }
}

/// Намерение движения на следующий fixed tick
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct BotSteering {
    /// Куда идти (None — стоять)
    pub target: Option<Vec3>,
    /// Куда смотреть (None — по направлению движения)
    pub facing: Option<Vec3>,
    pub speed: f32,
    /// Ближе этого к target не двигаемся
    pub stop_distance: f32,
    pub min_altitude: f32,
}

impl Default for BotSteering {
    fn default() -> Self {
        Self {
            target: None,
            facing: None,
            speed: 4.0,
            stop_distance: 0.5,
            min_altitude: 0.5,
        }
    }
}

impl BotSteering {
    /// Прямое движение к цели (без waypoint bookkeeping)
    pub fn move_to_target(&mut self, target: Vec3) {
        self.target = Some(target);
    }

    pub fn look_at(&mut self, point: Vec3) {
        self.facing = Some(point);
    }

    pub fn stop(&mut self) {
        self.target = None;
        self.facing = None;
    }

    /// Новая позиция после `dt` (чистая функция)
    pub fn advance(&self, position: Vec3, dt: f32) -> Vec3 {
        let Some(target) = self.target else {
            return position;
        };

        let mut offset = target - position;
        offset.y = 0.0;
        let distance = offset.length();
        if distance <= self.stop_distance {
            return position;
        }

        let step = (self.speed * dt).min(distance);
        let mut next = position + offset / distance * step;
        next.y = next.y.max(self.min_altitude);
        next
    }

    /// Поворот вокруг Y: lookAt цели, иначе по направлению движения
    pub fn heading(&self, position: Vec3) -> Option<Quat> {
        let point = self.facing.or(self.target)?;
        yaw_towards(position, point)
    }
}

/// Yaw поворот, при котором -Z смотрит на `point` (по горизонтали)
pub fn yaw_towards(position: Vec3, point: Vec3) -> Option<Quat> {
    let mut direction = point - position;
    direction.y = 0.0;
    if direction.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(Quat::from_rotation_y(f32::atan2(-direction.x, -direction.z)))
}

pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    Vec2::new(a.x - b.x, a.z - b.z).length()
}

/// System: BotSteering → kinematic body (FixedTick, FixedSet::Motion)
///
/// Мёртвые боты не двигаются. Нет body → warning, бот пропускается.
pub fn bot_motion(
    mut bots: Query<(Entity, &BotSteering, &Health, &mut Transform), With<Bot>>,
    mut physics: ResMut<PhysicsWorld>,
    clock: Res<FixedClock>,
) {
    let dt = clock.step_secs();

    for (entity, steering, health, mut transform) in bots.iter_mut() {
        if health.is_dead() {
            continue;
        }

        let position = match physics.position(entity) {
            Ok(position) => position,
            Err(err) => {
                crate::log_warning(&format!("bot_motion: {}", err));
                continue;
            }
        };

        let next = steering.advance(position, dt);
        if next != position {
            if let Err(err) = physics.move_kinematic(entity, next) {
                crate::log_warning(&format!("bot_motion: {}", err));
                continue;
            }
        }

        if let Some(rotation) = steering.heading(next) {
            if transform.rotation != rotation {
                transform.rotation = rotation;
            }
        }
    }
}
