//! Headless симуляция ARENA
//!
//! Собирает симуляцию из JSON конфига (опциональный первый аргумент),
//! гоняет 1000 кадров с синтетическим временем и печатает прогресс.

use std::time::Duration;

use arena_simulation::{
    build_simulation, log_error, log_info, world_snapshot, Control, InputState, SimulationConfig,
    SimulationError,
};

const FRAMES: u32 = 1000;
const FRAME_TIME: Duration = Duration::from_micros(16_667);

fn main() {
    if let Err(err) = run() {
        log_error(&format!("Simulation failed to start: {}", err));
        eprintln!("Simulation failed to start: {}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), SimulationError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    println!("Starting ARENA headless simulation (seed: {})", config.seed);

    let mut game_loop = build_simulation(&config)?;
    game_loop.start();

    let mut now = Duration::ZERO;
    for frame in 0..FRAMES {
        // Синтетический ввод: игрок медленно вращается и стреляет очередями
        if let Some(mut input) = game_loop.world_mut().get_resource_mut::<InputState>() {
            input.add_mouse_delta(bevy::math::Vec2::new(4.0, 0.0));
            if frame % 120 < 40 {
                input.press(Control::Fire);
            } else {
                input.release(Control::Fire);
            }
            if frame % 300 == 150 {
                input.press(Control::Reload);
            } else {
                input.release(Control::Reload);
            }
        }

        now += FRAME_TIME;
        let report = game_loop.frame(now);

        if frame % 100 == 0 {
            let snapshot = world_snapshot(game_loop.world_mut());
            let alive_bots = snapshot
                .actors
                .iter()
                .filter(|actor| actor.kind == "Bot" && !actor.dead)
                .count();
            println!(
                "Frame {}: tick {}, {} fixed steps, {} bots alive, kills {}, deaths {}",
                frame,
                snapshot.tick,
                report.fixed_steps,
                alive_bots,
                snapshot.player_kills,
                snapshot.player_deaths
            );
        }
    }

    let snapshot = world_snapshot(game_loop.world_mut());
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(err) => log_error(&format!("Snapshot serialization failed: {}", err)),
    }

    game_loop.stop();
    log_info("Simulation complete!");
    println!("Simulation complete!");
    Ok(())
}
