//! Damage / heal применение + наблюдаемые переходы Health
//!
//! HitEvent → Health::take_damage → DamageDealt (+ EntityDied).
//! KillIntent → Health::die → EntityDied (без DamageDealt).
//! Friendly fire между ботами отключён: пуля бота попадает в бота
//! (HitEvent есть), но урона нет.

use bevy::prelude::*;

use crate::combat::weapon_manager::HitEvent;
use crate::components::{Actor, DamageOutcome, EntityKind, Health};

/// Событие: урон нанесён
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct DamageDealt {
    pub attacker: Option<Entity>,
    pub target: Entity,
    /// Фактически снятое HP (overkill обрезан)
    pub amount: f32,
    pub remaining: f32,
    pub target_died: bool,
}

/// Событие: entity умер (ровно один раз на смерть)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityHealed {
    pub entity: Entity,
    pub amount: f32,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct EntityRespawned {
    pub entity: Entity,
    pub position: Vec3,
}

/// Игрок убил бота (для HUD / счёта)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct BotKilled {
    pub bot: Entity,
    pub killer: Option<Entity>,
}

/// Intent: вылечить entity (pickups, debug)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealIntent {
    pub target: Entity,
    pub amount: f32,
}

/// Intent: убить entity в обход урона (kill-зона, debug, хост)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct KillIntent {
    pub target: Entity,
    pub killer: Option<Entity>,
}

/// Счёт матча
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub player_kills: u32,
    pub player_deaths: u32,
    pub bots_spawned: u32,
}

/// Урон по target с событиями. Общая точка для всех источников урона.
pub fn deal_damage(
    target: Entity,
    health: &mut Health,
    amount: f32,
    attacker: Option<Entity>,
    dealt: &mut EventWriter<DamageDealt>,
    died: &mut EventWriter<EntityDied>,
) -> DamageOutcome {
    let outcome = health.take_damage(amount);

    let (applied, target_died) = match outcome {
        DamageOutcome::Ignored => return outcome,
        DamageOutcome::Wounded { applied } => (applied, false),
        DamageOutcome::Killed { applied } => (applied, true),
    };

    dealt.write(DamageDealt {
        attacker,
        target,
        amount: applied,
        remaining: health.current,
        target_died,
    });

    if target_died {
        died.write(EntityDied {
            entity: target,
            killer: attacker,
        });
        crate::log(&format!("💀 {:?} killed by {:?}", target, attacker));
    }

    outcome
}

/// Урон разрешён? (бот → бот запрещён)
pub fn is_friendly_fire(attacker: Option<&Actor>, target: Option<&Actor>) -> bool {
    matches!(
        (attacker.map(|a| a.kind), target.map(|t| t.kind)),
        (Some(EntityKind::Bot), Some(EntityKind::Bot))
    )
}

/// System: HitEvent → Health (FrameSet::Apply)
pub fn apply_hit_damage(
    mut hits: EventReader<HitEvent>,
    mut targets: Query<&mut Health>,
    actors: Query<&Actor>,
    mut dealt: EventWriter<DamageDealt>,
    mut died: EventWriter<EntityDied>,
) {
    for hit in hits.read() {
        let Some(target) = hit.target else {
            continue;
        };
        if target == hit.attacker {
            crate::log_warning(&format!("⚠️ Self-hit ignored for {:?}", target));
            continue;
        }
        if is_friendly_fire(actors.get(hit.attacker).ok(), actors.get(target).ok()) {
            continue;
        }

        // Стены и укрытия без Health — просто пропускаем
        let Ok(mut health) = targets.get_mut(target) else {
            continue;
        };

        deal_damage(
            target,
            &mut health,
            hit.damage,
            Some(hit.attacker),
            &mut dealt,
            &mut died,
        );
    }
}

/// System: HealIntent → Health (FrameSet::Apply)
pub fn apply_heals(
    mut intents: EventReader<HealIntent>,
    mut targets: Query<&mut Health>,
    mut healed: EventWriter<EntityHealed>,
) {
    for intent in intents.read() {
        let Ok(mut health) = targets.get_mut(intent.target) else {
            continue;
        };

        match health.heal(intent.amount) {
            Some(amount) if amount > 0.0 => {
                healed.write(EntityHealed {
                    entity: intent.target,
                    amount,
                });
            }
            Some(_) => {}
            None => {
                crate::log(&format!("Heal ignored: {:?} is dead", intent.target));
            }
        }
    }
}

/// System: KillIntent → Health::die (FrameSet::Apply)
///
/// Уже мёртвый target — no-op, EntityDied не дублируется.
pub fn apply_kills(
    mut intents: EventReader<KillIntent>,
    mut targets: Query<&mut Health>,
    mut died: EventWriter<EntityDied>,
) {
    for intent in intents.read() {
        let Ok(mut health) = targets.get_mut(intent.target) else {
            crate::log_warning(&format!("⚠️ KillIntent: {:?} has no Health", intent.target));
            continue;
        };

        if health.die() {
            died.write(EntityDied {
                entity: intent.target,
                killer: intent.killer,
            });
            crate::log(&format!("💀 {:?} killed (explicit) by {:?}", intent.target, intent.killer));
        }
    }
}

/// System: EntityDied → MatchStats + BotKilled (FrameSet::Lifecycle)
pub fn update_match_stats(
    mut deaths: EventReader<EntityDied>,
    actors: Query<&Actor>,
    mut stats: ResMut<MatchStats>,
    mut bot_killed: EventWriter<BotKilled>,
) {
    for death in deaths.read() {
        let Ok(actor) = actors.get(death.entity) else {
            continue;
        };

        match actor.kind {
            EntityKind::Bot => {
                let by_player = death
                    .killer
                    .and_then(|killer| actors.get(killer).ok())
                    .is_some_and(|killer| killer.kind == EntityKind::Player);
                if by_player {
                    stats.player_kills += 1;
                }
                bot_killed.write(BotKilled {
                    bot: death.entity,
                    killer: death.killer,
                });
            }
            EntityKind::Player => {
                stats.player_deaths += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_events() -> World {
        let mut world = World::new();
        world.init_resource::<Events<HitEvent>>();
        world.init_resource::<Events<DamageDealt>>();
        world.init_resource::<Events<EntityDied>>();
        world
    }

    fn hit(attacker: Entity, target: Entity, damage: f32) -> HitEvent {
        HitEvent {
            attacker,
            target: Some(target),
            weapon: crate::combat::WeaponKind::Rifle,
            damage,
            point: Vec3::ZERO,
            normal: Vec3::Y,
            distance: 1.0,
        }
    }

    #[test]
    fn test_hit_kills_exactly_once() {
        let mut world = world_with_events();
        let player = world.spawn(Actor::new(EntityKind::Player, "player")).id();
        let bot = world
            .spawn((Actor::new(EntityKind::Bot, "bot-1"), Health::new(50.0)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_hit_damage);

        world.send_event(hit(player, bot, 30.0));
        world.send_event(hit(player, bot, 30.0));
        world.send_event(hit(player, bot, 30.0));
        schedule.run(&mut world);

        let health = world.get::<Health>(bot).expect("health");
        assert_eq!(health.current, 0.0);
        assert!(health.dead);

        let dealt: Vec<DamageDealt> = world.resource_mut::<Events<DamageDealt>>().drain().collect();
        assert_eq!(dealt.len(), 2);
        assert_eq!(dealt[1].amount, 20.0);
        assert!(dealt[1].target_died);

        let died: Vec<EntityDied> = world.resource_mut::<Events<EntityDied>>().drain().collect();
        assert_eq!(died, vec![EntityDied { entity: bot, killer: Some(player) }]);
    }

    #[test]
    fn test_bot_on_bot_hit_deals_no_damage() {
        let mut world = world_with_events();
        let shooter = world
            .spawn((Actor::new(EntityKind::Bot, "bot-1"), Health::new(100.0)))
            .id();
        let victim = world
            .spawn((Actor::new(EntityKind::Bot, "bot-2"), Health::new(100.0)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_hit_damage);

        world.send_event(hit(shooter, victim, 30.0));
        schedule.run(&mut world);

        assert_eq!(world.get::<Health>(victim).map(|h| h.current), Some(100.0));
        assert!(world.resource::<Events<DamageDealt>>().is_empty());
    }

    #[test]
    fn test_heal_emits_only_when_hp_restored() {
        let mut world = World::new();
        world.init_resource::<Events<HealIntent>>();
        world.init_resource::<Events<EntityHealed>>();

        let mut wounded = Health::new(100.0);
        wounded.take_damage(40.0);
        let target = world.spawn(wounded).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_heals);

        world.send_event(HealIntent { target, amount: 25.0 });
        schedule.run(&mut world);

        let healed: Vec<EntityHealed> = world.resource_mut::<Events<EntityHealed>>().drain().collect();
        assert_eq!(healed, vec![EntityHealed { entity: target, amount: 25.0 }]);
        assert_eq!(world.get::<Health>(target).map(|h| h.current), Some(85.0));
    }

    #[test]
    fn test_kill_intent_emits_died_once() {
        let mut world = World::new();
        world.init_resource::<Events<KillIntent>>();
        world.init_resource::<Events<EntityDied>>();
        let target = world.spawn(Health::new(100.0)).id();

        let mut schedule = Schedule::default();
        schedule.add_systems(apply_kills);

        world.send_event(KillIntent { target, killer: None });
        world.send_event(KillIntent { target, killer: None });
        schedule.run(&mut world);

        let died: Vec<EntityDied> = world.resource_mut::<Events<EntityDied>>().drain().collect();
        assert_eq!(died, vec![EntityDied { entity: target, killer: None }]);

        let health = world.get::<Health>(target).expect("health");
        assert!(health.dead);
        assert_eq!(health.current, 0.0);
    }

    #[test]
    fn test_friendly_fire_rule() {
        let player = Actor::new(EntityKind::Player, "p");
        let bot = Actor::new(EntityKind::Bot, "b");

        assert!(is_friendly_fire(Some(&bot), Some(&bot)));
        assert!(!is_friendly_fire(Some(&bot), Some(&player)));
        assert!(!is_friendly_fire(Some(&player), Some(&bot)));
        assert!(!is_friendly_fire(None, Some(&bot)));
    }
}
