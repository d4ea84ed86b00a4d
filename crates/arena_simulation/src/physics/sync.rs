//! Синхронизация ECS ↔ PhysicsWorld (FixedTick)
//!
//! Порядок внутри fixed update:
//! 1. Motion-системы задают цель kinematic body (`move_kinematic`)
//! 2. `step_physics` — ровно один шаг
//! 3. `read_back_positions` — Transform ← body (physics = source of truth)

use bevy::prelude::*;

use crate::core::FixedClock;
use crate::physics::{BodyKind, PhysicsWorld};

/// Marker: у entity есть body в PhysicsWorld (ключ — сам Entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicsBody {
    pub kind: BodyKind,
}

/// System: один physics step на fixed tick
pub fn step_physics(mut physics: ResMut<PhysicsWorld>, clock: Res<FixedClock>) {
    physics.step(clock.step_secs());
}

/// System: Transform.translation ← позиция body
///
/// Fixed тела не двигаются — пропускаем.
pub fn read_back_positions(
    physics: Res<PhysicsWorld>,
    mut bodies: Query<(Entity, &PhysicsBody, &mut Transform)>,
) {
    for (entity, body, mut transform) in bodies.iter_mut() {
        if body.kind == BodyKind::Fixed {
            continue;
        }

        match physics.position(entity) {
            Ok(position) => {
                if transform.translation != position {
                    transform.translation = position;
                }
            }
            Err(err) => {
                crate::logger::log_error(&format!("read_back_positions: {}", err));
            }
        }
    }
}
