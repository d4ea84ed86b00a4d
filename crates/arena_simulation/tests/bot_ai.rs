//! Bot AI в живом мире: perception, FSM переходы, debounce, spawn points

mod common;

use arena_simulation::ai::{horizontal_distance, BotBrain};
use arena_simulation::*;
use bevy::prelude::*;

use common::Arena;

/// Один бот, живучий игрок (бот не может убить его за время теста)
fn arena_with_one_bot() -> (Arena, Entity, Entity) {
    let mut config = SimulationConfig::default();
    config.bots.max_bots = 1;
    config.player.max_health = 1000.0;

    let mut arena = Arena::start(config);
    arena.run_for(2.0);
    let player = arena.player();
    let bot = arena.bots()[0];
    (arena, player, bot)
}

fn state_of(arena: &Arena, bot: Entity) -> AIState {
    *arena.world().get::<AIState>(bot).expect("bot has AIState")
}

#[test]
fn test_visible_player_at_mid_range_is_chased() {
    let (mut arena, player, bot) = arena_with_one_bot();
    let player_position = arena.position(player);

    // 25 м по диагонали мимо укрытий
    arena.place(bot, Vec3::new(player_position.x - 20.0, 1.0, player_position.z + 15.0));
    arena.frames(1);

    assert_eq!(state_of(&arena, bot), AIState::Chase);

    let before = horizontal_distance(arena.position(bot), player_position);
    arena.run_for(0.4);
    let after = horizontal_distance(arena.position(bot), arena.position(player));
    assert!(after < before, "chasing bot must close in: {} → {}", before, after);
}

#[test]
fn test_wounded_bot_retreats() {
    let (mut arena, player, bot) = arena_with_one_bot();
    let player_position = arena.position(player);

    arena.place(bot, Vec3::new(player_position.x, 1.0, player_position.z + 12.0));
    arena
        .world_mut()
        .get_mut::<Health>(bot)
        .expect("bot has Health")
        .take_damage(80.0);
    arena.frames(1);

    assert_eq!(state_of(&arena, bot), AIState::Retreat);

    arena.run_for(1.0);
    let distance = horizontal_distance(arena.position(bot), arena.position(player));
    assert!(distance > 12.5, "retreating bot must back off, distance {}", distance);
}

#[test]
fn test_state_change_is_debounced() {
    let (mut arena, player, bot) = arena_with_one_bot();
    let player_position = arena.position(player);

    arena.place(bot, Vec3::new(player_position.x, 1.0, player_position.z + 12.0));
    arena.frames(1);
    assert_eq!(state_of(&arena, bot), AIState::Attack);

    // Телепорт без сброса памяти: окно debounce ещё открыто
    let far = Vec3::new(player_position.x - 20.0, 1.0, player_position.z + 15.0);
    arena
        .world_mut()
        .resource_mut::<PhysicsWorld>()
        .set_position(bot, far)
        .expect("bot has a body");
    arena.frames(2);
    assert_eq!(state_of(&arena, bot), AIState::Attack);

    arena.run_for(0.6);
    assert_eq!(state_of(&arena, bot), AIState::Chase);
}

#[test]
fn test_dead_player_is_not_a_target() {
    let (mut arena, player, bot) = arena_with_one_bot();
    let player_position = arena.position(player);

    arena.place(bot, Vec3::new(player_position.x, 1.0, player_position.z + 12.0));
    arena.frames(1);
    assert_eq!(state_of(&arena, bot), AIState::Attack);

    arena
        .world_mut()
        .get_mut::<Health>(player)
        .expect("player has Health")
        .take_damage(10_000.0);
    arena.run_for(0.6);

    assert_eq!(state_of(&arena, bot), AIState::Patrol);
    let brain = arena.world().get::<BotBrain>(bot).expect("bot has BotBrain");
    assert_eq!(brain.target, None);
}

#[test]
fn test_used_spawn_point_waits_for_grace_and_cooldown() {
    let mut arena = Arena::start(common::passive_config(1));

    let mut query = arena.world_mut().query::<(Entity, &SpawnPoint)>();
    let used = query
        .iter(arena.world())
        .find(|(_, point)| point.occupied)
        .map(|(entity, _)| entity)
        .expect("initial bot occupied a spawn point");
    let cooldown = arena.world().resource::<SimulationConfig>().bots.spawn_cooldown;

    arena.run_until(1.0);
    let point = arena.world().get::<SpawnPoint>(used).expect("spawn point exists");
    assert!(point.occupied);
    assert!(!point.is_eligible(arena.elapsed(), cooldown));

    arena.run_until(2.1);
    let point = arena.world().get::<SpawnPoint>(used).expect("spawn point exists");
    assert!(!point.occupied);
    assert!(point.is_eligible(arena.elapsed(), cooldown));
}
