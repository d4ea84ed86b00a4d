//! Player combat input: fire / reload / weapon switch / dash (FrameSet::Input)

use bevy::prelude::*;

use crate::combat::{FireOutcome, WeaponControl, WeaponManager};
use crate::components::{Health, Player};
use crate::player::{Control, DashAbility, InputState, MotionController};
use crate::{DeterministicRng, SimulationConfig};

/// System: input → действия игрока
///
/// Порядок: смена оружия → reload → выстрел → dash.
/// Fire — удержание (автоматический огонь ограничен fire rate оружия).
pub fn player_actions(
    mut players: Query<
        (
            Entity,
            &mut WeaponManager,
            &mut MotionController,
            &mut DashAbility,
            &Transform,
            &Health,
        ),
        With<Player>,
    >,
    input: Res<InputState>,
    mut control: WeaponControl,
    mut rng: ResMut<DeterministicRng>,
    config: Res<SimulationConfig>,
) {
    for (entity, mut manager, mut controller, mut dash, transform, health) in players.iter_mut() {
        if health.is_dead() {
            continue;
        }

        if let Some(slot) = input.pressed_weapon_slot() {
            control.switch(entity, &mut manager, slot);
        } else if input.just_pressed(Control::WeaponNext) {
            control.cycle(entity, &mut manager, true);
        } else if input.just_pressed(Control::WeaponPrevious) {
            control.cycle(entity, &mut manager, false);
        }

        if input.just_pressed(Control::Reload) {
            control.reload(entity, &mut manager);
        }

        if input.is_held(Control::Fire) {
            let origin = transform.translation + Vec3::Y * config.player.camera_height;
            let direction = controller.forward();
            if let FireOutcome::Fired(records) =
                control.pull_trigger(entity, &mut manager, origin, direction, &mut rng.rng)
            {
                crate::log(&format!(
                    "🔫 Player fired {} ({} rays)",
                    manager.active_weapon().spec().name,
                    records.len()
                ));
            }
        }

        if input.just_pressed(Control::Dash) {
            let now = control.now();
            let wish = controller.wish_direction(input.movement_axes());
            let forward = controller.forward();
            if let Some(offset) = dash.try_use(now, controller.grounded, wish, forward) {
                controller.pending_offset += offset;
                crate::log(&format!("💨 Player dash {:?}", offset));
            }
        }
    }
}
