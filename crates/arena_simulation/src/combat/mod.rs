//! Combat system module (hitscan)
//!
//! - weapon: статы, ammo, cooldown, reload, spread
//! - weapon_manager: roster + fire records → raycast → HitEvent
//! - damage: HitEvent → Health, события смерти/лечения, MatchStats

use bevy::prelude::*;

pub mod damage;
pub mod weapon;
pub mod weapon_manager;


pub use damage::{
    apply_heals, apply_hit_damage, apply_kills, deal_damage, is_friendly_fire, update_match_stats,
    BotKilled, DamageDealt, EntityDied, EntityHealed, EntityRespawned, HealIntent, KillIntent,
    MatchStats,
};
pub use weapon::{
    apply_spread, FireOutcome, FireRecord, ReloadOutcome, Weapon, WeaponKind, WeaponSpec,
};
pub use weapon_manager::{
    complete_reloads, resolve_fire_records, tick_weapons, FireRecordEvent, HitEvent,
    ReloadCompleted, ReloadStarted, WeaponControl, WeaponEmpty, WeaponFired, WeaponManager,
    WeaponSwitched,
};

use crate::core::{fire_due_timers, FixedSet, FixedTick, FrameEventsExt, FrameSet, FrameUpdate};

/// Combat Plugin
///
/// Порядок выполнения:
/// 1. tick_weapons — cooldown таймеры (FrameSet::Weapons)
/// 2. resolve_fire_records — hit test (FrameSet::Resolve)
/// 3. apply_hit_damage / apply_heals / apply_kills — Health (FrameSet::Apply)
/// 4. update_match_stats — счёт (FrameSet::Lifecycle)
///
/// Reload завершается в FixedTick по таймеру.
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MatchStats>();

        // Регистрация событий
        app.add_frame_event::<FireRecordEvent>()
            .add_frame_event::<HitEvent>()
            .add_frame_event::<WeaponFired>()
            .add_frame_event::<WeaponEmpty>()
            .add_frame_event::<WeaponSwitched>()
            .add_frame_event::<ReloadStarted>()
            .add_frame_event::<ReloadCompleted>()
            .add_frame_event::<DamageDealt>()
            .add_frame_event::<EntityDied>()
            .add_frame_event::<EntityHealed>()
            .add_frame_event::<EntityRespawned>()
            .add_frame_event::<BotKilled>()
            .add_frame_event::<HealIntent>()
            .add_frame_event::<KillIntent>();

        app.add_systems(
            FixedTick,
            complete_reloads
                .in_set(FixedSet::Timers)
                .after(fire_due_timers),
        );

        app.add_systems(FrameUpdate, tick_weapons.in_set(FrameSet::Weapons))
            .add_systems(FrameUpdate, resolve_fire_records.in_set(FrameSet::Resolve))
            .add_systems(
                FrameUpdate,
                (apply_hit_damage, apply_heals, apply_kills).chain().in_set(FrameSet::Apply),
            )
            .add_systems(FrameUpdate, update_match_stats.in_set(FrameSet::Lifecycle));
    }
}
