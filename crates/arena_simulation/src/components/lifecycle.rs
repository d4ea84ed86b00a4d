//! EntityLifecycle — единственная точка создания/удаления entity с телом
//!
//! Гарантирует, что entity, его body/collider в PhysicsWorld, таймеры
//! и визуал рождаются и умирают вместе.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::visual::{Visual, VisualAsset, VisualCommand};
use crate::core::ScheduledEvents;
use crate::error::PhysicsError;
use crate::physics::{BodyDesc, PhysicsBody, PhysicsWorld};

#[derive(SystemParam)]
pub struct EntityLifecycle<'w, 's> {
    commands: Commands<'w, 's>,
    physics: ResMut<'w, PhysicsWorld>,
    timers: ResMut<'w, ScheduledEvents>,
    visual_commands: EventWriter<'w, VisualCommand>,
    with_visual: Query<'w, 's, (), With<Visual>>,
}

impl<'w, 's> EntityLifecycle<'w, 's> {
    /// Spawn entity + body + visual
    ///
    /// Ошибка физики откатывает spawn (entity не остаётся без тела).
    pub fn spawn<B: Bundle>(
        &mut self,
        transform: Transform,
        body: Option<BodyDesc>,
        visual: Option<VisualAsset>,
        bundle: B,
    ) -> Result<Entity, PhysicsError> {
        let entity = self.commands.spawn((transform, bundle)).id();

        if let Some(desc) = body {
            if let Err(err) = self.physics.add_body(
                entity,
                transform.translation,
                desc.kind,
                desc.shape,
                desc.groups,
            ) {
                self.commands.entity(entity).despawn();
                return Err(err);
            }
            self.commands.entity(entity).insert(PhysicsBody { kind: desc.kind });
        }

        if let Some(asset) = visual {
            self.commands.entity(entity).insert(Visual::new(asset));
            self.visual_commands.write(VisualCommand::Add {
                entity,
                asset,
                transform,
            });
        }

        Ok(entity)
    }

    /// Despawn entity + body + все pending таймеры + визуал
    pub fn despawn(&mut self, entity: Entity) {
        let cancelled = self.timers.cancel_all(entity);
        if cancelled > 0 {
            crate::log(&format!("⏱️ Cancelled {} timers of {:?}", cancelled, entity));
        }

        if self.physics.contains(entity) {
            if let Err(err) = self.physics.remove_body(entity) {
                crate::log_error(&format!("despawn {:?}: {}", entity, err));
            }
        }

        if self.with_visual.contains(entity) {
            self.visual_commands.write(VisualCommand::Remove { entity });
        }

        if let Ok(mut entity_commands) = self.commands.get_entity(entity) {
            entity_commands.despawn();
        }
    }

    /// Телепорт тела (Transform подтянется в Readback)
    pub fn teleport(&mut self, entity: Entity, position: Vec3) -> Result<(), PhysicsError> {
        self.physics.set_position(entity, position)
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn timers(&mut self) -> &mut ScheduledEvents {
        &mut self.timers
    }

    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }
}
