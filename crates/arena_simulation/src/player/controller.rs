//! MotionController — first-person kinematic контроллер
//!
//! Архитектура:
//! - Kinematic body в PhysicsWorld (position-based)
//! - Custom velocity integration (никаких rapier forces)
//! - Ground check — raycast вниз без собственного коллайдера
//!
//! FixedTick (FixedSet::Motion): intent → velocity → position → body.
//! После step_physics позиция читается обратно в Transform.

use bevy::prelude::*;

use crate::config::PlayerConfig;
use crate::core::FixedClock;
use crate::physics::{PhysicsWorld, RayFilter};
use crate::player::InputState;
use crate::components::{Health, Player};
use crate::SimulationConfig;

/// Kinematic контроллер компонент
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct MotionController {
    /// Поворот вокруг Y (радианы)
    pub yaw: f32,
    /// Наклон камеры, ±(π/2 − 0.1)
    pub pitch: f32,
    pub velocity: Vec3,
    pub grounded: bool,
    /// Мгновенное смещение (dash), применяется в следующем fixed tick
    pub pending_offset: Vec3,
}

impl Default for MotionController {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            velocity: Vec3::ZERO,
            grounded: false,
            pending_offset: Vec3::ZERO,
        }
    }
}

/// Входные данные одного fixed шага
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionIntent {
    /// x — вправо, y — вперёд (нормализовано)
    pub axes: Vec2,
    pub sprint: bool,
    pub jump: bool,
}

impl MotionIntent {
    pub fn from_input(input: &InputState) -> Self {
        Self {
            axes: input.movement_axes(),
            sprint: input.is_held(crate::player::Control::Sprint),
            jump: input.is_held(crate::player::Control::Jump),
        }
    }
}

impl MotionController {
    pub const MAX_PITCH: f32 = std::f32::consts::FRAC_PI_2 - 0.1;

    /// Mouse look: yaw/pitch накапливаются, pitch ограничен
    pub fn apply_look(&mut self, mouse_delta: Vec2, sensitivity: f32) {
        self.yaw -= mouse_delta.x * sensitivity;
        self.pitch -= mouse_delta.y * sensitivity;
        self.pitch = self.pitch.clamp(-Self::MAX_PITCH, Self::MAX_PITCH);
    }

    /// Горизонтальный поворот (для движения)
    pub fn yaw_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Поворот камеры (YXZ, без roll)
    pub fn view_rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Направление взгляда (-Z камеры)
    pub fn forward(&self) -> Vec3 {
        self.view_rotation() * Vec3::NEG_Z
    }

    /// Intent в мировых координатах (горизонталь, нормализовано)
    pub fn wish_direction(&self, axes: Vec2) -> Vec3 {
        if axes == Vec2::ZERO {
            return Vec3::ZERO;
        }
        (self.yaw_rotation() * Vec3::new(axes.x, 0.0, -axes.y)).normalize_or_zero()
    }

    /// Один fixed шаг интеграции, возвращает новую позицию
    ///
    /// `grounded` должен быть посчитан до вызова (ground raycast).
    pub fn integrate(&mut self, position: Vec3, intent: MotionIntent, dt: f32, config: &PlayerConfig) -> Vec3 {
        let wish = self.wish_direction(intent.axes);
        let speed = if intent.sprint {
            config.sprint_speed
        } else {
            config.move_speed
        };
        self.velocity.x = wish.x * speed;
        self.velocity.z = wish.z * speed;

        if intent.jump && self.grounded {
            self.velocity.y = config.jump_force;
        }

        if !self.grounded {
            self.velocity.y += config.gravity * dt;
        } else if self.velocity.y < 0.0 {
            self.velocity.y = 0.0;
        }

        let mut next = position + self.velocity * dt + std::mem::take(&mut self.pending_offset);
        if next.y < config.min_altitude {
            next.y = config.min_altitude;
            self.velocity.y = self.velocity.y.max(0.0);
        }
        next
    }
}

/// Ground check: raycast вниз от центра, без собственного коллайдера
pub fn detect_ground(physics: &PhysicsWorld, entity: Entity, position: Vec3, config: &PlayerConfig) -> bool {
    physics
        .raycast_filtered(
            position,
            Vec3::NEG_Y,
            config.ground_ray_length,
            true,
            RayFilter::excluding(entity),
        )
        .is_some_and(|hit| hit.distance < config.ground_threshold)
}

/// System: движение игрока (FixedTick, FixedSet::Motion)
pub fn player_motion(
    mut players: Query<(Entity, &mut MotionController, &Health), With<Player>>,
    input: Res<InputState>,
    mut physics: ResMut<PhysicsWorld>,
    clock: Res<FixedClock>,
    config: Res<SimulationConfig>,
) {
    let dt = clock.step_secs();
    let intent = MotionIntent::from_input(&input);

    for (entity, mut controller, health) in players.iter_mut() {
        if health.is_dead() {
            continue;
        }

        let position = match physics.position(entity) {
            Ok(position) => position,
            Err(err) => {
                crate::log_error(&format!("player_motion: {}", err));
                continue;
            }
        };

        controller.grounded = detect_ground(&physics, entity, position, &config.player);
        let next = controller.integrate(position, intent, dt, &config.player);

        if let Err(err) = physics.move_kinematic(entity, next) {
            crate::log_error(&format!("player_motion: {}", err));
        }
    }
}

/// System: mouse look → yaw/pitch + Transform.rotation (FrameSet::Input)
pub fn player_look(
    mut players: Query<(&mut MotionController, &mut Transform, &Health), With<Player>>,
    input: Res<InputState>,
    config: Res<SimulationConfig>,
) {
    let delta = input.mouse_delta();

    for (mut controller, mut transform, health) in players.iter_mut() {
        if health.is_dead() || delta == Vec2::ZERO {
            continue;
        }
        controller.apply_look(delta, config.player.mouse_sensitivity);
        transform.rotation = controller.yaw_rotation();
    }
}
