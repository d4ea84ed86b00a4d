//! Render handoff: Visual component + VisualCommand events
//!
//! Симуляция не знает про сцену хоста. Она только пишет `VisualCommand`,
//! хост дренирует `Events<VisualCommand>` после каждого `frame()`.
//!
//! - Add / Remove — из `EntityLifecycle` (атомарно со spawn/despawn)
//! - Transform — RenderSync, по `Changed<Transform>`
//! - Visibility — RenderSync, по изменению `Visual::visible`

use bevy::prelude::*;

/// Какой визуал создать на стороне хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum VisualAsset {
    Player,
    Bot,
    Ground,
    Wall,
    CoverBox,
    CoverCylinder,
}

/// Визуальное представление entity (handle живёт у хоста, ключ — Entity)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform)]
pub struct Visual {
    pub asset: VisualAsset,
    pub visible: bool,
}

impl Visual {
    pub fn new(asset: VisualAsset) -> Self {
        Self {
            asset,
            visible: true,
        }
    }
}

/// Команда для renderer'а (ECS → host)
#[derive(Event, Debug, Clone, PartialEq)]
pub enum VisualCommand {
    Add {
        entity: Entity,
        asset: VisualAsset,
        transform: Transform,
    },
    Remove {
        entity: Entity,
    },
    Transform {
        entity: Entity,
        translation: Vec3,
        rotation: Quat,
    },
    Visibility {
        entity: Entity,
        visible: bool,
    },
}

impl VisualCommand {
    pub fn entity(&self) -> Entity {
        match self {
            VisualCommand::Add { entity, .. }
            | VisualCommand::Remove { entity }
            | VisualCommand::Transform { entity, .. }
            | VisualCommand::Visibility { entity, .. } => *entity,
        }
    }
}

/// System: Transform changed → VisualCommand::Transform (RenderSync)
///
/// Только что добавленные пропускаем: их позиция уже в `Add`.
pub fn sync_visual_transforms(
    query: Query<(Entity, Ref<Transform>), With<Visual>>,
    mut commands: EventWriter<VisualCommand>,
) {
    for (entity, transform) in query.iter() {
        if !transform.is_changed() || transform.is_added() {
            continue;
        }

        commands.write(VisualCommand::Transform {
            entity,
            translation: transform.translation,
            rotation: transform.rotation,
        });
    }
}

/// System: Visual::visible changed → VisualCommand::Visibility (RenderSync)
pub fn sync_visual_visibility(
    query: Query<(Entity, Ref<Visual>)>,
    mut commands: EventWriter<VisualCommand>,
) {
    for (entity, visual) in query.iter() {
        if !visual.is_changed() || visual.is_added() {
            continue;
        }

        commands.write(VisualCommand::Visibility {
            entity,
            visible: visual.visible,
        });
    }
}
