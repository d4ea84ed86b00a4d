//! Simple arena: пол, стены по периметру, укрытия, spawn points, waypoints
//!
//! Геометрия — Fixed тела в группе WORLD. Размеры — полная сторона / высота,
//! half extents считаются здесь.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;

use crate::components::{EntityLifecycle, VisualAsset};
use crate::physics::{BodyDesc, BodyKind, CollisionGroups, ShapeKind};
use crate::world::{ArenaMap, SpawnPoint};

pub const ARENA_SIZE: f32 = 50.0;
pub const WALL_HEIGHT: f32 = 5.0;
pub const WALL_THICKNESS: f32 = 1.0;
pub const COVER_HEIGHT: f32 = 2.5;
pub const SPAWN_POINT_COUNT: usize = 8;
pub const WAYPOINT_RING_COUNT: usize = 12;

/// Marker: статическая геометрия арены
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct ArenaGeometry;

/// System: построить арену (SimulationStartup, StartupSet::Arena)
pub fn build_simple_arena(mut lifecycle: EntityLifecycle, mut map: ResMut<ArenaMap>) {
    *map = ArenaMap::new("Simple Arena", ARENA_SIZE);

    let mut failures = 0;
    for (name, position, shape, asset) in arena_layout() {
        let result = lifecycle.spawn(
            Transform::from_translation(position),
            Some(BodyDesc::new(BodyKind::Fixed, shape).with_groups(CollisionGroups::WORLD)),
            Some(asset),
            (ArenaGeometry, Name::new(name.clone())),
        );
        if let Err(err) = result {
            crate::log_error(&format!("Arena geometry {}: {}", name, err));
            failures += 1;
        }
    }

    let spawn_radius = ARENA_SIZE / 2.0 - 5.0;
    for i in 0..SPAWN_POINT_COUNT {
        let angle = i as f32 / SPAWN_POINT_COUNT as f32 * TAU;
        let position = Vec3::new(angle.cos() * spawn_radius, 1.0, angle.sin() * spawn_radius);
        let point = SpawnPoint::new(position, angle + PI);
        lifecycle.commands().spawn((
            Transform::from_translation(position).with_rotation(point.rotation()),
            point,
            Name::new(format!("spawn-{}", i)),
        ));
    }

    let waypoint_radius = ARENA_SIZE / 3.0;
    for i in 0..WAYPOINT_RING_COUNT {
        let angle = i as f32 / WAYPOINT_RING_COUNT as f32 * TAU;
        map.add_waypoint(Vec3::new(angle.cos() * waypoint_radius, 0.0, angle.sin() * waypoint_radius));
    }
    map.add_waypoint(Vec3::ZERO);

    crate::log_info(&format!(
        "🗺️ Map \"{}\" built: {} spawn points, {} waypoints ({} geometry failures)",
        map.name,
        SPAWN_POINT_COUNT,
        map.waypoints.len(),
        failures
    ));
}

/// Полный список статической геометрии: (имя, центр, форма, визуал)
pub fn arena_layout() -> Vec<(String, Vec3, ShapeKind, VisualAsset)> {
    let half = ARENA_SIZE / 2.0;
    let mut layout = vec![(
        "ground".to_string(),
        // Верх плоскости на y = 0
        Vec3::new(0.0, -0.1, 0.0),
        ShapeKind::Plane,
        VisualAsset::Ground,
    )];

    let along_x = Vec3::new(half, WALL_HEIGHT / 2.0, WALL_THICKNESS / 2.0);
    let along_z = Vec3::new(WALL_THICKNESS / 2.0, WALL_HEIGHT / 2.0, half);
    let walls = [
        (Vec3::new(0.0, WALL_HEIGHT / 2.0, -half), along_x),
        (Vec3::new(0.0, WALL_HEIGHT / 2.0, half), along_x),
        (Vec3::new(-half, WALL_HEIGHT / 2.0, 0.0), along_z),
        (Vec3::new(half, WALL_HEIGHT / 2.0, 0.0), along_z),
    ];
    for (index, (position, half_extents)) in walls.into_iter().enumerate() {
        layout.push((
            format!("wall-{}", index),
            position,
            ShapeKind::Box { half_extents },
            VisualAsset::Wall,
        ));
    }

    let y = COVER_HEIGHT / 2.0;
    let covers = [
        Vec3::new(10.0, y, 10.0),
        Vec3::new(-10.0, y, 10.0),
        Vec3::new(10.0, y, -10.0),
        Vec3::new(-10.0, y, -10.0),
        Vec3::new(0.0, y, 15.0),
        Vec3::new(0.0, y, -15.0),
        Vec3::new(15.0, y, 0.0),
        Vec3::new(-15.0, y, 0.0),
    ];
    for (index, position) in covers.into_iter().enumerate() {
        let (shape, asset) = if index % 2 == 0 {
            (
                ShapeKind::Box {
                    half_extents: Vec3::new(1.0, COVER_HEIGHT / 2.0, 1.0),
                },
                VisualAsset::CoverBox,
            )
        } else {
            (
                ShapeKind::Cylinder {
                    half_height: COVER_HEIGHT / 2.0,
                    radius: 1.0,
                },
                VisualAsset::CoverCylinder,
            )
        };
        layout.push((format!("cover-{}", index), position, shape, asset));
    }

    layout
}
