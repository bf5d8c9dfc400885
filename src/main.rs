//! # Airogue Main Entry Point
//!
//! Loads a generated content bundle, materializes it into an ECS world, and
//! prints a summary. The terminal render/input loop attaches to the same
//! `World` API; this binary exercises the path up to its first tick.

use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

use airogue::{build_world, RogueResult, Signal, SignalPayload, WorldModel};

/// Command line arguments for airogue.
#[derive(Parser, Debug)]
#[command(name = "airogue")]
#[command(about = "A roguelike whose theme, mechanics, and items are generated by an LLM")]
#[command(version)]
struct Args {
    /// Path to the generated world model bundle
    #[arg(long, default_value = "world_model.json")]
    world_model: PathBuf,

    /// Random seed for item placement
    #[arg(short, long)]
    seed: Option<u64>,
}

fn main() -> RogueResult<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Starting airogue v{}", airogue::VERSION);

    let json = std::fs::read_to_string(&args.world_model)?;
    let bundle = WorldModel::from_json_str(&json)?;
    bundle.validate()?;
    print!("{bundle}");

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut world = build_world(&bundle, &mut rng)?;

    let report = world.fire(Signal::Tick, SignalPayload::Turn { turn: 1 })?;
    println!(
        "World ready: {} entities, seed {seed}, first tick ran {} slots ({} failed)",
        world.entity_count(),
        report.invoked,
        report.failures.len()
    );
    Ok(())
}
