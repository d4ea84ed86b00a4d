//! PhysicsWorld — владелец rigid bodies / colliders (rapier)
//!
//! Entity хранит только id; body + collider живут здесь, в таблице
//! `Entity → BodyHandle`. Обратная таблица `ColliderHandle → Entity`
//! нужна raycast'у, чтобы вернуть, во что попали.

use std::collections::HashMap;

use bevy::prelude::{Entity, Resource, Vec3};
use bevy_rapier3d::rapier::na;
use bevy_rapier3d::rapier::parry::query::Ray;
use bevy_rapier3d::rapier::prelude::{
    BroadPhase, BroadPhaseBvh, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, Group,
    ImpulseJointSet, IntegrationParameters, InteractionGroups, IslandManager, MultibodyJointSet,
    NarrowPhase, PhysicsPipeline, QueryFilter, RigidBodyBuilder, RigidBodyHandle, RigidBodySet,
};

use crate::error::PhysicsError;
use crate::physics::collision::{CollisionGroups, MASK_RAYCAST_ALL};

/// Тип тела
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// Position-based kinematic (игрок, боты)
    Kinematic,
    /// Статическая геометрия арены
    Fixed,
}

/// Форма коллайдера (все размеры — half extents)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Box { half_extents: Vec3 },
    Sphere { radius: f32 },
    Capsule { half_height: f32, radius: f32 },
    Cylinder { half_height: f32, radius: f32 },
    /// Пол: тонкий cuboid 200×0.2×200
    Plane,
}

impl ShapeKind {
    /// Капсула актёра (игрок и боты)
    pub const ACTOR_CAPSULE: ShapeKind = ShapeKind::Capsule {
        half_height: 0.5,
        radius: 0.3,
    };

    fn collider_builder(&self) -> ColliderBuilder {
        match *self {
            ShapeKind::Box { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ShapeKind::Sphere { radius } => ColliderBuilder::ball(radius),
            ShapeKind::Capsule { half_height, radius } => ColliderBuilder::capsule_y(half_height, radius),
            ShapeKind::Cylinder { half_height, radius } => ColliderBuilder::cylinder(half_height, radius),
            ShapeKind::Plane => ColliderBuilder::cuboid(100.0, 0.1, 100.0),
        }
    }
}

/// Описание тела для создания вместе с entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub shape: ShapeKind,
    pub groups: Option<CollisionGroups>,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, shape: ShapeKind) -> Self {
        Self {
            kind,
            shape,
            groups: None,
        }
    }

    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = Some(groups);
        self
    }
}

/// Пара body + collider одного entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHandle {
    pub body: RigidBodyHandle,
    pub collider: ColliderHandle,
}

/// Фильтр raycast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RayFilter {
    /// Не проверять коллайдер этого entity (стрелок, наблюдатель)
    pub exclude: Option<Entity>,
    /// Проверять только коллайдеры, чья membership пересекается с маской
    pub mask: u32,
}

impl Default for RayFilter {
    fn default() -> Self {
        Self {
            exclude: None,
            mask: MASK_RAYCAST_ALL,
        }
    }
}

impl RayFilter {
    pub fn excluding(entity: Entity) -> Self {
        Self {
            exclude: Some(entity),
            ..Self::default()
        }
    }
}

/// Результат raycast (только при попадании)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
    /// Entity, которому принадлежит коллайдер (None — неотслеживаемый коллайдер)
    pub struck: Option<Entity>,
}

#[derive(Resource)]
pub struct PhysicsWorld {
    gravity: na::Vector3<f32>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    bindings: HashMap<Entity, BodyHandle>,
    collider_owners: HashMap<ColliderHandle, Entity>,
    steps: u64,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0))
    }
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: na::Vector3::new(gravity.x, gravity.y, gravity.z),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            bindings: HashMap::new(),
            collider_owners: HashMap::new(),
            steps: 0,
        }
    }

    /// Создать body + collider для entity (атомарно)
    pub fn add_body(
        &mut self,
        entity: Entity,
        position: Vec3,
        kind: BodyKind,
        shape: ShapeKind,
        groups: Option<CollisionGroups>,
    ) -> Result<BodyHandle, PhysicsError> {
        if self.bindings.contains_key(&entity) {
            return Err(PhysicsError::DuplicateBody(entity));
        }

        let translation = to_na(position);
        let body = match kind {
            BodyKind::Kinematic => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
        }
        .translation(translation)
        .build();
        let body_handle = self.bodies.insert(body);

        let mut collider = shape.collider_builder();
        if let Some(groups) = groups {
            collider = collider.collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(groups.membership),
                Group::from_bits_truncate(groups.filter),
            ));
        }
        let collider_handle =
            self.colliders
                .insert_with_parent(collider.build(), body_handle, &mut self.bodies);

        let handle = BodyHandle {
            body: body_handle,
            collider: collider_handle,
        };
        self.bindings.insert(entity, handle);
        self.collider_owners.insert(collider_handle, entity);
        self.refresh_broad_phase(&[collider_handle], &[]);

        Ok(handle)
    }

    /// Удалить body + collider entity
    pub fn remove_body(&mut self, entity: Entity) -> Result<(), PhysicsError> {
        let handle = self
            .bindings
            .remove(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;

        self.collider_owners.remove(&handle.collider);
        self.bodies.remove(
            handle.body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        self.refresh_broad_phase(&[], &[handle.collider]);

        Ok(())
    }

    /// Телепорт body (и его коллайдера — raycast видит новую позицию сразу)
    ///
    /// Для движения каждый tick — `move_kinematic`.
    pub fn set_position(&mut self, entity: Entity, position: Vec3) -> Result<(), PhysicsError> {
        let handle = *self
            .bindings
            .get(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        let body = self
            .bodies
            .get_mut(handle.body)
            .ok_or(PhysicsError::MissingBody(entity))?;

        let translation = to_na(position);
        body.set_translation(translation, true);

        if let Some(collider) = self.colliders.get_mut(handle.collider) {
            collider.set_translation(translation);
        }
        self.refresh_broad_phase(&[handle.collider], &[]);

        Ok(())
    }

    /// Цель kinematic body на следующий `step`
    ///
    /// rapier выводит из смещения скорость тела (контакты видят движение).
    /// Позиция меняется только после `step`. Fixed тела — как `set_position`.
    pub fn move_kinematic(&mut self, entity: Entity, position: Vec3) -> Result<(), PhysicsError> {
        let handle = *self
            .bindings
            .get(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        let body = self
            .bodies
            .get_mut(handle.body)
            .ok_or(PhysicsError::MissingBody(entity))?;

        if !body.is_kinematic() {
            return self.set_position(entity, position);
        }

        body.set_next_kinematic_translation(to_na(position));
        Ok(())
    }

    /// Авторитетная позиция body
    pub fn position(&self, entity: Entity) -> Result<Vec3, PhysicsError> {
        let handle = self
            .bindings
            .get(&entity)
            .ok_or(PhysicsError::MissingBody(entity))?;
        let body = self
            .bodies
            .get(handle.body)
            .ok_or(PhysicsError::MissingBody(entity))?;

        Ok(from_na(body.translation()))
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.bindings.contains_key(&entity)
    }

    pub fn body_handle(&self, entity: Entity) -> Option<BodyHandle> {
        self.bindings.get(&entity).copied()
    }

    pub fn entity_for_collider(&self, collider: ColliderHandle) -> Option<Entity> {
        self.collider_owners.get(&collider).copied()
    }

    pub fn body_count(&self) -> usize {
        self.bindings.len()
    }

    /// Сколько раз был вызван `step`
    pub fn step_count(&self) -> u64 {
        self.steps
    }

    /// Raycast без фильтра
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_distance: f32, solid: bool) -> Option<RayHit> {
        self.raycast_filtered(origin, direction, max_distance, solid, RayFilter::default())
    }

    /// Ближайшее попадание вдоль луча в пределах `max_distance`
    ///
    /// `direction` нормализуется; нулевое направление — промах.
    /// `solid = true`: луч, стартующий внутри коллайдера, попадает в него на дистанции 0.
    pub fn raycast_filtered(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        solid: bool,
        filter: RayFilter,
    ) -> Option<RayHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO || max_distance <= 0.0 {
            return None;
        }

        let ray = Ray::new(
            na::Point3::new(origin.x, origin.y, origin.z),
            to_na(direction),
        );

        let mut query_filter = QueryFilter::default().groups(InteractionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(filter.mask),
        ));
        if let Some(handle) = filter.exclude.and_then(|entity| self.bindings.get(&entity)) {
            query_filter = query_filter.exclude_collider(handle.collider);
        }

        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            query_filter,
        );
        let (collider_handle, intersection) = query.cast_ray_and_get_normal(&ray, max_distance, solid)?;
        let distance = intersection.time_of_impact;

        Some(RayHit {
            point: origin + direction * distance,
            normal: from_na(&intersection.normal),
            distance,
            struck: self.entity_for_collider(collider_handle),
        })
    }

    /// Один шаг симуляции
    pub fn step(&mut self, fixed_delta: f32) {
        self.integration_parameters.dt = fixed_delta;

        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );

        self.steps += 1;
    }

    /// Удалить всё (teardown)
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = self.bindings.keys().copied().collect();
        for entity in entities {
            if let Err(err) = self.remove_body(entity) {
                crate::logger::log_error(&format!("PhysicsWorld::clear: {}", err));
            }
        }
    }

    /// BVH broad phase обновляется только внутри `step` — подтягиваем
    /// изменённые/удалённые коллайдеры сразу, чтобы raycast их видел.
    ///
    /// Пары, найденные здесь, narrow phase не получает: тела только
    /// kinematic/fixed, контактов между ними rapier не считает.
    fn refresh_broad_phase(&mut self, modified: &[ColliderHandle], removed: &[ColliderHandle]) {
        let mut pair_events = Vec::new();
        self.broad_phase.update(
            &self.integration_parameters,
            &self.colliders,
            &self.bodies,
            modified,
            removed,
            &mut pair_events,
        );
    }
}

fn to_na(v: Vec3) -> na::Vector3<f32> {
    na::Vector3::new(v.x, v.y, v.z)
}

fn from_na(v: &na::Vector3<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bevy::prelude::World;

    fn entities(count: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..count).map(|_| world.spawn_empty().id()).collect()
    }

    #[test]
    fn test_add_body_twice_is_rejected() {
        let ids = entities(1);
        let mut physics = PhysicsWorld::default();

        physics
            .add_body(ids[0], Vec3::ZERO, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, None)
            .expect("first body");
        let second = physics.add_body(ids[0], Vec3::ONE, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, None);

        assert_eq!(second, Err(PhysicsError::DuplicateBody(ids[0])));
        assert_eq!(physics.body_count(), 1);
    }

    #[test]
    fn test_set_position_then_read_back() {
        let ids = entities(1);
        let mut physics = PhysicsWorld::default();
        physics
            .add_body(ids[0], Vec3::ZERO, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, None)
            .expect("body");

        physics.set_position(ids[0], Vec3::new(3.0, 1.0, -2.0)).expect("set");
        physics.step(1.0 / 60.0);

        let position = physics.position(ids[0]).expect("position");
        assert_relative_eq!(position.x, 3.0, epsilon = 1e-4);
        assert_relative_eq!(position.y, 1.0, epsilon = 1e-4);
        assert_relative_eq!(position.z, -2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_missing_binding_is_error() {
        let ids = entities(1);
        let mut physics = PhysicsWorld::default();

        assert_eq!(physics.position(ids[0]), Err(PhysicsError::MissingBody(ids[0])));
        assert_eq!(
            physics.set_position(ids[0], Vec3::ZERO),
            Err(PhysicsError::MissingBody(ids[0]))
        );
        assert_eq!(physics.remove_body(ids[0]), Err(PhysicsError::MissingBody(ids[0])));
    }

    #[test]
    fn test_raycast_reports_struck_entity_and_distance() {
        let ids = entities(2);
        let mut physics = PhysicsWorld::default();

        // Стена: лицевая грань на z = -9.5
        physics
            .add_body(
                ids[0],
                Vec3::new(0.0, 1.0, -10.0),
                BodyKind::Fixed,
                ShapeKind::Box {
                    half_extents: Vec3::new(2.0, 2.0, 0.5),
                },
                Some(CollisionGroups::WORLD),
            )
            .expect("wall");
        physics.step(1.0 / 60.0);

        let hit = physics
            .raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 50.0, true)
            .expect("hit");

        assert_eq!(hit.struck, Some(ids[0]));
        assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-3);
        assert_relative_eq!(hit.normal.z, 1.0, epsilon = 1e-3);

        // За пределами дальности — промах
        assert!(physics.raycast(Vec3::new(0.0, 1.0, 0.0), Vec3::NEG_Z, 5.0, true).is_none());
        // Нулевое направление — промах
        assert!(physics.raycast(Vec3::ZERO, Vec3::ZERO, 50.0, true).is_none());
    }

    #[test]
    fn test_raycast_excludes_own_collider() {
        let ids = entities(2);
        let mut physics = PhysicsWorld::default();

        physics
            .add_body(ids[0], Vec3::ZERO, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::PLAYER))
            .expect("shooter");
        physics
            .add_body(ids[1], Vec3::new(0.0, 0.0, -5.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::BOT))
            .expect("target");
        physics.step(1.0 / 60.0);

        // Луч из центра стрелка: без фильтра попадает в себя на 0
        let self_hit = physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, true).expect("self hit");
        assert_eq!(self_hit.struck, Some(ids[0]));

        let hit = physics
            .raycast_filtered(Vec3::ZERO, Vec3::NEG_Z, 20.0, true, RayFilter::excluding(ids[0]))
            .expect("target hit");
        assert_eq!(hit.struck, Some(ids[1]));
        assert_relative_eq!(hit.distance, 4.7, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_sees_bodies_before_first_step() {
        let ids = entities(2);
        let mut physics = PhysicsWorld::default();

        physics
            .add_body(ids[0], Vec3::ZERO, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::PLAYER))
            .expect("shooter");
        physics
            .add_body(ids[1], Vec3::new(0.0, 0.0, -8.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::BOT))
            .expect("target");
        assert_eq!(physics.step_count(), 0);

        let hit = physics
            .raycast_filtered(Vec3::ZERO, Vec3::NEG_Z, 20.0, true, RayFilter::excluding(ids[0]))
            .expect("target hit");
        assert_eq!(hit.struck, Some(ids[1]));
        assert_relative_eq!(hit.distance, 7.7, epsilon = 1e-3);

        // Телепорт виден raycast'у без step
        physics.set_position(ids[1], Vec3::new(0.0, 0.0, -15.0)).expect("teleport");
        let moved = physics
            .raycast_filtered(Vec3::ZERO, Vec3::NEG_Z, 20.0, true, RayFilter::excluding(ids[0]))
            .expect("moved target hit");
        assert_relative_eq!(moved.distance, 14.7, epsilon = 1e-3);
    }

    #[test]
    fn test_raycast_mask_skips_other_groups() {
        let ids = entities(2);
        let mut physics = PhysicsWorld::default();

        physics
            .add_body(ids[0], Vec3::new(0.0, 0.0, -3.0), BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, Some(CollisionGroups::BOT))
            .expect("bot");
        physics
            .add_body(
                ids[1],
                Vec3::new(0.0, 0.0, -10.0),
                BodyKind::Fixed,
                ShapeKind::Box {
                    half_extents: Vec3::new(2.0, 2.0, 0.5),
                },
                Some(CollisionGroups::WORLD),
            )
            .expect("wall");

        let world_only = RayFilter {
            exclude: None,
            mask: crate::physics::collision::GROUP_WORLD,
        };
        let hit = physics
            .raycast_filtered(Vec3::ZERO, Vec3::NEG_Z, 50.0, true, world_only)
            .expect("wall hit");
        assert_eq!(hit.struck, Some(ids[1]));
        assert_relative_eq!(hit.distance, 9.5, epsilon = 1e-3);
    }

    #[test]
    fn test_move_kinematic_applies_on_step() {
        let ids = entities(1);
        let mut physics = PhysicsWorld::default();
        physics
            .add_body(ids[0], Vec3::ZERO, BodyKind::Kinematic, ShapeKind::ACTOR_CAPSULE, None)
            .expect("body");

        physics.move_kinematic(ids[0], Vec3::new(0.5, 0.0, 0.0)).expect("move");
        assert_relative_eq!(physics.position(ids[0]).expect("before step").x, 0.0);

        physics.step(1.0 / 60.0);
        assert_relative_eq!(physics.position(ids[0]).expect("after step").x, 0.5, epsilon = 1e-4);
    }

    #[test]
    fn test_clear_removes_every_body() {
        let ids = entities(3);
        let mut physics = PhysicsWorld::default();
        for (index, entity) in ids.iter().enumerate() {
            physics
                .add_body(*entity, Vec3::new(index as f32 * 3.0, 0.0, -5.0), BodyKind::Fixed, ShapeKind::Sphere { radius: 1.0 }, None)
                .expect("sphere");
        }

        physics.clear();

        assert_eq!(physics.body_count(), 0);
        assert!(physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, true).is_none());
    }

    #[test]
    fn test_removed_body_no_longer_hit() {
        let ids = entities(1);
        let mut physics = PhysicsWorld::default();
        physics
            .add_body(ids[0], Vec3::new(0.0, 0.0, -5.0), BodyKind::Fixed, ShapeKind::Sphere { radius: 1.0 }, None)
            .expect("sphere");
        physics.step(1.0 / 60.0);

        assert!(physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, true).is_some());

        physics.remove_body(ids[0]).expect("remove");
        assert!(!physics.contains(ids[0]));
        assert!(physics.raycast(Vec3::ZERO, Vec3::NEG_Z, 20.0, true).is_none());
    }
}
