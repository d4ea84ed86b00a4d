//! ECS Components для игровых entity
//!
//! Организация по доменам:
//! - actor: идентичность (EntityKind, Actor, Player, Bot)
//! - health: damage / heal / death / respawn
//! - visual: render handoff (Visual, VisualCommand)
//! - lifecycle: атомарный spawn/despawn (entity + body + timers + visual)

use bevy::prelude::*;

pub mod actor;
pub mod health;
pub mod lifecycle;
pub mod visual;

// Re-exports для удобного импорта
pub use actor::*;
pub use health::*;
pub use lifecycle::*;
pub use visual::*;

use crate::core::{FrameEventsExt, RenderSync};

/// Visual handoff plugin (RenderSync)
pub struct VisualPlugin;

impl Plugin for VisualPlugin {
    fn build(&self, app: &mut App) {
        app.add_frame_event::<VisualCommand>();

        app.add_systems(
            RenderSync,
            (sync_visual_transforms, sync_visual_visibility).chain(),
        );
    }
}
