//! Headless unit movement server.
//!
//! Runs the movement simulation with a few randomly steered bots and logs
//! every packet the units broadcast as JSON.
//!
//! # Main Loop
//!
//! 1. Load `config.ini` (defaults when missing)
//! 2. Build the ECS world, spawn the transport thread and the bots
//! 3. Advance the clock by one tick and run the tick schedule, `--ticks` times
//! 4. Join the transport thread on exit
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run --release -- --bots 8 --ticks 400
//! ```

use std::path::PathBuf;
use std::time::Duration;

use bevy_ecs::prelude::*;
use clap::Parser;

use unitmotion::game::{self, drive_bots};
use unitmotion::resources::broadcast::{setup_transport, shutdown_transport};
use unitmotion::resources::gameconfig::GameConfig;
use unitmotion::resources::worldtime::WorldTime;
use unitmotion::systems::input::movement_input;
use unitmotion::systems::time::update_world_time;
use unitmotion::systems::transport::LogSink;

/// Headless unit movement server
#[derive(Parser)]
#[command(version, about = "Runs the unit movement simulation with demo bots.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "config.ini")]
    config: PathBuf,

    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 200)]
    ticks: u32,

    /// Number of demo bots.
    #[arg(long, default_value_t = 4)]
    bots: u32,

    /// Seed for the bots' decisions.
    #[arg(long)]
    seed: Option<u64>,

    /// Sleep between ticks so the simulation runs at wall-clock speed.
    #[arg(long)]
    realtime: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = GameConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        log::warn!("{}; using defaults", e);
    }
    let tick_ms = config.tick_ms.max(1);

    let mut world = World::new();
    game::setup_world(&mut world, config);
    setup_transport(&mut world, LogSink);
    game::spawn_bots(&mut world, cli.bots, cli.seed.unwrap_or_else(|| fastrand::u64(..)));

    let mut update = game::tick_schedule();
    update.add_systems(drive_bots.before(movement_input));
    if let Err(e) = update.initialize(&mut world) {
        log::error!("cannot build tick schedule: {}", e);
        shutdown_transport(&mut world);
        std::process::exit(1);
    }

    log::info!(
        "running {} ticks of {} ms with {} bots",
        cli.ticks,
        tick_ms,
        cli.bots
    );
    for _ in 0..cli.ticks {
        update_world_time(&mut world, tick_ms);
        update.run(&mut world);
        world.clear_trackers();

        if cli.realtime {
            std::thread::sleep(Duration::from_millis(tick_ms as u64));
        }
    }

    let time = world.resource::<WorldTime>();
    log::info!("stopped after {} ticks at {} ms", time.tick_count, time.now_ms);
    shutdown_transport(&mut world);
}
