#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Swarm TD session.
//!
//! The binary loads the balance set and room catalog, then drives the world
//! with a simple autopilot for a fixed number of ticks and prints a summary.

mod autopilot;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use swarm_td_core::{Balance, Command, Event, GameMode};
use swarm_td_system_dungeon::TemplateCatalog;
use swarm_td_world::{self as world, query, World, WorldConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use autopilot::Autopilot;

/// Headless Swarm TD runner.
#[derive(Debug, Parser)]
#[command(name = "swarm-td", version, about)]
struct Args {
    /// Seed of the run's random generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 3_600)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long = "dt-ms", default_value_t = 16)]
    dt_ms: u64,
    /// Balance TOML file; the built-in defaults are used when omitted.
    #[arg(long)]
    balance: Option<PathBuf>,
    /// Room catalog TOML file; the built-in catalog is used when omitted.
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

/// Entry point for the Swarm TD command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let config = WorldConfig {
        balance: load_balance(args.balance.as_ref())?,
        catalog: load_catalog(args.catalog.as_ref())?,
        seed: args.seed,
    };
    let mut events = Vec::new();
    let mut world = World::new(config, &mut events).context("failed to build the world")?;
    println!("{}", query::welcome_banner(&world));

    let mut autopilot = Autopilot::default();
    let mut commands = Vec::new();
    let dt = Duration::from_millis(args.dt_ms);
    for _ in 0..args.ticks {
        autopilot.plan(&world, &mut commands);
        commands.push(Command::Tick { dt });
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
        log_milestones(&events);
        events.clear();
        if !query::mode(&world).is_playable() {
            break;
        }
    }

    print_summary(&world);
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    let _ = subscriber.try_init();
}

fn load_balance(path: Option<&PathBuf>) -> Result<Balance> {
    let Some(path) = path else {
        return Ok(Balance::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read balance file {}", path.display()))?;
    Balance::from_toml_str(&contents)
        .with_context(|| format!("failed to load balance file {}", path.display()))
}

fn load_catalog(path: Option<&PathBuf>) -> Result<TemplateCatalog> {
    let Some(path) = path else {
        return Ok(TemplateCatalog::builtin());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read room catalog {}", path.display()))?;
    TemplateCatalog::from_toml_str(&contents)
        .with_context(|| format!("failed to load room catalog {}", path.display()))
}

fn log_milestones(events: &[Event]) {
    for event in events {
        match event {
            Event::RoomCleared { room } => info!(x = room.x(), y = room.y(), "room cleared"),
            Event::UpgradeCollected { upgrade } => info!(?upgrade, "upgrade collected"),
            Event::BossRoomEntered => info!("boss arena reached"),
            Event::PlacementRejected { kind, reason, .. } => {
                debug!(?kind, ?reason, "autopilot placement refused");
            }
            _ => {}
        }
    }
}

fn print_summary(world: &World) {
    let player = query::player(world);
    let rooms = query::rooms(world);
    let cleared = rooms.iter().filter(|room| room.cleared).count();
    let outcome = match query::mode(world) {
        GameMode::Dungeon => "still exploring",
        GameMode::BossRoom => "fighting the boss",
        GameMode::Victory => "victory",
        GameMode::GameOver => "defeated",
    };

    println!("outcome: {outcome}");
    println!("time: {:.1}s", query::clock(world).as_secs_f32());
    println!("health: {}/{}", player.health, player.max_health);
    println!("rooms cleared: {cleared}/{}", rooms.len());
    println!("kills: {}", query::kills(world));
    println!("money: {}", query::money(world));
    if let Some(boss) = query::boss(world) {
        println!(
            "boss: phase {} at {:.0}% health",
            boss.phase.number(),
            boss.health_ratio * 100.0
        );
    }
}
