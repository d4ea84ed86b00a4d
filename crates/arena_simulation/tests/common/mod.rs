//! Общий harness для интеграционных тестов: GameLoop + синтетическое время

#![allow(dead_code)]

use std::time::Duration;

use arena_simulation::ai::{BotBrain, BotSteering};
use arena_simulation::player::MotionController;
use arena_simulation::*;
use bevy::prelude::*;

/// Конфиг, в котором боты никогда не видят игрока (вечный Patrol)
pub fn passive_config(max_bots: usize) -> SimulationConfig {
    let mut config = SimulationConfig::default();
    config.bots.max_bots = max_bots;
    config.ai.detection_range = 0.0;
    config.ai.attack_range = 0.0;
    config
}

/// Запущенная симуляция, время двигается ровно по одному fixed step за кадр
pub struct Arena {
    pub game_loop: GameLoop,
    now: Duration,
    step: Duration,
}

impl Arena {
    pub fn start(config: SimulationConfig) -> Self {
        let mut game_loop = build_simulation(&config).expect("config builds");
        game_loop.start();
        game_loop.frame(Duration::ZERO);
        let step = game_loop.world().resource::<FixedClock>().step;

        Self {
            game_loop,
            now: Duration::ZERO,
            step,
        }
    }

    pub fn world(&self) -> &World {
        self.game_loop.world()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.game_loop.world_mut()
    }

    pub fn frames(&mut self, count: u32) {
        for _ in 0..count {
            self.now += self.step;
            self.game_loop.frame(self.now);
        }
    }

    /// Время симуляции (FixedClock)
    pub fn elapsed(&self) -> f64 {
        self.world().resource::<FixedClock>().elapsed_secs()
    }

    pub fn run_until(&mut self, secs: f64) {
        while self.elapsed() < secs {
            self.frames(1);
        }
    }

    pub fn run_for(&mut self, secs: f64) {
        let until = self.elapsed() + secs;
        self.run_until(until);
    }

    pub fn player(&mut self) -> Entity {
        let mut query = self.world_mut().query_filtered::<Entity, With<Player>>();
        query.single(self.world()).expect("exactly one player")
    }

    pub fn bots(&self) -> Vec<Entity> {
        self.world().resource::<BotSpawner>().bots().to_vec()
    }

    pub fn position(&self, entity: Entity) -> Vec3 {
        self.world()
            .get::<Transform>(entity)
            .expect("entity has Transform")
            .translation
    }

    /// Телепорт тела + Transform; у бота сбрасывается память FSM
    pub fn place(&mut self, entity: Entity, position: Vec3) {
        let world = self.world_mut();
        world
            .resource_mut::<PhysicsWorld>()
            .set_position(entity, position)
            .expect("entity has a body");
        if let Some(mut transform) = world.get_mut::<Transform>(entity) {
            transform.translation = position;
        }
        if let Some(mut brain) = world.get_mut::<BotBrain>(entity) {
            *brain = BotBrain::default();
        }
    }

    /// Бот стоит на месте в любом состоянии
    pub fn freeze_bot(&mut self, bot: Entity) {
        if let Some(mut steering) = self.world_mut().get_mut::<BotSteering>(bot) {
            steering.speed = 0.0;
        }
    }

    /// Направить камеру игрока на точку
    pub fn aim_player_at(&mut self, point: Vec3) {
        let player = self.player();
        let camera_height = self.world().resource::<SimulationConfig>().player.camera_height;
        let eye = self.position(player) + Vec3::Y * camera_height;
        let to_point = point - eye;
        let horizontal = Vec2::new(to_point.x, to_point.z).length();

        let mut controller = self
            .world_mut()
            .get_mut::<MotionController>(player)
            .expect("player has MotionController");
        controller.yaw = f32::atan2(-to_point.x, -to_point.z);
        controller.pitch = f32::atan2(to_point.y, horizontal);
    }

    pub fn press(&mut self, control: Control) {
        self.world_mut().resource_mut::<InputState>().press(control);
    }

    pub fn release(&mut self, control: Control) {
        self.world_mut().resource_mut::<InputState>().release(control);
    }

    /// Забрать все события типа E (оба буфера)
    pub fn drain_events<E: Event>(&mut self) -> Vec<E> {
        self.world_mut().resource_mut::<Events<E>>().drain().collect()
    }
}
