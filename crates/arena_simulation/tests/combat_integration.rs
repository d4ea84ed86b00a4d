//! Combat через полный GameLoop: input → выстрел → raycast → урон → смерть → замена бота
//!
//! Все сценарии детерминированы (seed из конфига, синтетическое время).

mod common;

use arena_simulation::combat::{FireRecord, FireRecordEvent, WeaponEmpty};
use arena_simulation::*;
use bevy::prelude::*;

use common::{passive_config, Arena};

/// Игрок приземлился, единственный бот стоит в 6 м перед ним
fn duel() -> (Arena, Entity, Entity) {
    let mut arena = Arena::start(passive_config(1));
    arena.run_for(2.0);

    let player = arena.player();
    let bot = arena.bots()[0];
    let player_position = arena.position(player);
    let bot_position = Vec3::new(player_position.x, 1.0, player_position.z - 6.0);

    arena.place(bot, bot_position);
    arena.freeze_bot(bot);
    arena.aim_player_at(bot_position);
    arena.frames(1);
    arena.drain_events::<DamageDealt>();

    (arena, player, bot)
}

#[test]
fn test_player_pistol_hit_damages_bot() {
    let (mut arena, player, bot) = duel();

    arena.press(Control::Fire);
    arena.frames(1);
    arena.release(Control::Fire);

    let health = arena.world().get::<Health>(bot).expect("bot has Health");
    assert_eq!(health.current, 75.0);

    let dealt = arena.drain_events::<DamageDealt>();
    assert_eq!(dealt.len(), 1);
    assert_eq!(dealt[0].attacker, Some(player));
    assert_eq!(dealt[0].target, bot);
    assert_eq!(dealt[0].amount, 25.0);
    assert!(!dealt[0].target_died);

    let pistol = arena
        .world()
        .get::<WeaponManager>(player)
        .expect("player has weapons")
        .active_weapon()
        .clone();
    assert_eq!(pistol.kind, WeaponKind::Pistol);
    assert_eq!(pistol.current_ammo, 11);
}

#[test]
fn test_killed_bot_is_hidden_then_replaced() {
    let (mut arena, _player, bot) = duel();

    // 300 RPM → 5 выстрелов за секунду, хватает 4
    arena.press(Control::Fire);
    arena.run_for(1.0);
    arena.release(Control::Fire);

    let health = arena.world().get::<Health>(bot).expect("dead bot stays until replaced");
    assert!(health.is_dead());
    assert!(!arena.world().get::<Visual>(bot).expect("bot has Visual").visible);
    assert_eq!(arena.world().resource::<MatchStats>().player_kills, 1);
    assert!(arena
        .world()
        .resource::<ScheduledEvents>()
        .is_pending(bot, TimerKind::BotRespawn));

    arena.run_for(5.1);

    let bots = arena.bots();
    assert_eq!(bots.len(), 1);
    assert_ne!(bots[0], bot);
    assert!(arena.world().get_entity(bot).is_err());
    assert_eq!(arena.world().resource::<MatchStats>().bots_spawned, 2);
    assert_eq!(
        arena.world().resource::<BotSpawner>().alive_bot_count(arena.world()),
        1
    );
}

#[test]
fn test_explicit_kill_hides_bot_and_schedules_respawn() {
    let mut arena = Arena::start(passive_config(1));
    arena.run_for(1.0);
    let bot = arena.bots()[0];

    arena.world_mut().send_event(KillIntent { target: bot, killer: None });
    arena.frames(1);

    assert!(arena.world().get::<Health>(bot).expect("bot has Health").is_dead());
    assert!(!arena.world().get::<Visual>(bot).expect("bot has Visual").visible);
    assert!(arena
        .world()
        .resource::<ScheduledEvents>()
        .is_pending(bot, TimerKind::BotRespawn));

    // Смерть без игрока-убийцы не идёт в счёт
    assert_eq!(arena.world().resource::<MatchStats>().player_kills, 0);
}

#[test]
fn test_pistol_runs_dry_then_reloads() {
    let mut arena = Arena::start(passive_config(1));
    arena.run_for(2.0);

    // В небо: ни во что не попадаем
    let player = arena.player();
    let sky = arena.position(player) + Vec3::new(0.0, 50.0, -1.0);
    arena.aim_player_at(sky);

    arena.press(Control::Fire);
    arena.run_for(3.0);
    arena.frames(1);
    arena.release(Control::Fire);

    assert!(!arena.drain_events::<WeaponEmpty>().is_empty());
    let pistol = arena.world().get::<WeaponManager>(player).expect("player has weapons").active_weapon().clone();
    assert_eq!(pistol.current_ammo, 0);
    assert_eq!(pistol.reserve_ammo, 60);

    arena.press(Control::Reload);
    arena.frames(1);
    arena.release(Control::Reload);
    assert!(arena
        .world()
        .get::<WeaponManager>(player)
        .expect("player has weapons")
        .active_weapon()
        .is_reloading());

    arena.run_for(1.6);

    let pistol = arena.world().get::<WeaponManager>(player).expect("player has weapons").active_weapon().clone();
    assert!(!pistol.is_reloading());
    assert_eq!(pistol.current_ammo, 12);
    assert_eq!(pistol.reserve_ammo, 48);
}

#[test]
fn test_bot_bullets_do_not_hurt_bots() {
    let mut arena = Arena::start(passive_config(2));
    arena.run_for(0.5);

    let bots = arena.bots();
    let (shooter, victim) = (bots[0], bots[1]);
    let shooter_position = Vec3::new(-5.0, 1.0, 5.0);
    arena.place(shooter, shooter_position);
    arena.place(victim, Vec3::new(-5.0, 1.0, 8.0));
    arena.freeze_bot(shooter);
    arena.freeze_bot(victim);
    arena.frames(1);
    arena.drain_events::<HitEvent>();

    arena.world_mut().send_event(FireRecordEvent {
        shooter,
        record: FireRecord {
            weapon: WeaponKind::Rifle,
            origin: shooter_position,
            direction: Vec3::Z,
            damage: 30.0,
            range: 100.0,
        },
    });
    arena.frames(1);

    let hits = arena.drain_events::<HitEvent>();
    assert!(hits.iter().any(|hit| hit.attacker == shooter && hit.target == Some(victim)));
    assert_eq!(arena.world().get::<Health>(victim).expect("bot has Health").current, 100.0);
}

#[test]
fn test_attacking_bot_spends_ammo() {
    let mut config = SimulationConfig::default();
    config.bots.max_bots = 1;
    config.player.max_health = 1000.0;
    let mut arena = Arena::start(config);
    arena.run_for(2.0);

    let player = arena.player();
    let bot = arena.bots()[0];
    let player_position = arena.position(player);
    arena.place(bot, Vec3::new(player_position.x, 1.0, player_position.z + 12.0));
    arena.run_for(1.0);

    assert_eq!(*arena.world().get::<AIState>(bot).expect("bot has AIState"), AIState::Attack);
    let rifle = arena.world().get::<WeaponManager>(bot).expect("bot has weapons").active_weapon().clone();
    assert_eq!(rifle.kind, WeaponKind::Rifle);
    assert!(rifle.current_ammo < 30);
}
