//! Perception: дистанция + line of sight до цели
//!
//! LOS считается от глаз наблюдателя (`eye_height` над центром) к центру цели.
//! Препятствие блокирует видимость, только если оно ближе `distance − tolerance`:
//! коллайдер самой цели и стены прямо за ней не считаются.

use bevy::prelude::*;

use crate::physics::{PhysicsWorld, RayFilter};

/// Результат восприятия одной цели за кадр
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    pub distance: f32,
    pub visible: bool,
}

/// Есть ли прямая видимость `observer → target`
///
/// Наблюдатель исключён из raycast (луч стартует внутри его капсулы).
pub fn has_line_of_sight(
    physics: &PhysicsWorld,
    observer: Entity,
    eye: Vec3,
    target: Vec3,
    tolerance: f32,
) -> bool {
    let to_target = target - eye;
    let distance = to_target.length();
    if distance <= f32::EPSILON {
        return true;
    }

    match physics.raycast_filtered(eye, to_target, distance, true, RayFilter::excluding(observer)) {
        Some(hit) => hit.distance >= distance - tolerance,
        None => true,
    }
}

/// Дистанция (от центра к центру) + LOS (от глаз)
pub fn perceive(
    physics: &PhysicsWorld,
    observer: Entity,
    observer_position: Vec3,
    target_position: Vec3,
    eye_height: f32,
    tolerance: f32,
) -> Perception {
    let distance = observer_position.distance(target_position);
    let eye = observer_position + Vec3::Y * eye_height;
    Perception {
        distance,
        visible: has_line_of_sight(physics, observer, eye, target_position, tolerance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{BodyKind, CollisionGroups, ShapeKind};

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_clear_line_of_sight() {
        let ids = entities(2);
        let mut physics = PhysicsWorld::default();
        physics
            .add_body(ids[0], Vec3::new(0.0, 1.0, 0.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::BOT))
            .expect("observer body");
        physics
            .add_body(ids[1], Vec3::new(0.0, 1.0, -20.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::PLAYER))
            .expect("target body");
        physics.step(1.0 / 60.0);

        let seen = perceive(&physics, ids[0], Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.0, 1.0, -20.0), 1.5, 1.0);
        assert!(seen.visible, "target capsule itself must not block LOS");
        assert!((seen.distance - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_wall_blocks_line_of_sight() {
        let ids = entities(3);
        let mut physics = PhysicsWorld::default();
        physics
            .add_body(ids[0], Vec3::new(0.0, 1.0, 0.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::BOT))
            .expect("observer body");
        physics
            .add_body(
                ids[1],
                Vec3::new(0.0, 2.0, -10.0),
                BodyKind::Fixed,
                ShapeKind::Box { half_extents: Vec3::new(5.0, 3.0, 0.5) },
                Some(CollisionGroups::WORLD),
            )
            .expect("wall body");
        physics.step(1.0 / 60.0);

        let eye = Vec3::new(0.0, 2.5, 0.0);
        assert!(!has_line_of_sight(&physics, ids[0], eye, Vec3::new(0.0, 1.0, -20.0), 1.0));
        // Цель перед стеной видна
        assert!(has_line_of_sight(&physics, ids[0], eye, Vec3::new(0.0, 1.0, -5.0), 1.0));
    }
}
