//! Physics capability (rapier через bevy_rapier3d re-export)
//!
//! Используем rapier напрямую, без RapierPhysicsPlugin: шаг физики
//! вызывается из нашего FixedTick, а не из bevy `FixedUpdate`.

use bevy::prelude::*;

pub mod collision;
pub mod sync;
pub mod world;

pub use collision::{
    group_name, CollisionGroups, GROUP_BOT, GROUP_BULLET, GROUP_PLAYER, GROUP_WORLD, MASK_BOT,
    MASK_BULLET, MASK_PLAYER, MASK_RAYCAST_ALL, MASK_WORLD,
};
pub use sync::{read_back_positions, step_physics, PhysicsBody};
pub use world::{BodyDesc, BodyHandle, BodyKind, PhysicsWorld, RayFilter, RayHit, ShapeKind};

use crate::core::{FixedSet, FixedTick};

pub struct PhysicsPlugin;

impl Plugin for PhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PhysicsWorld>();

        app.add_systems(FixedTick, step_physics.in_set(FixedSet::Physics))
            .add_systems(FixedTick, read_back_positions.in_set(FixedSet::Readback));
    }
}
