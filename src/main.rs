//! qdice CLI Entry Point
//!
//! Rolls, simulates and inspects quantum dice from the command line. Output
//! is JSON on stdout; logs go to stderr and are filtered with `RUST_LOG`.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qdice::{DiceConfig, Method, QuantumDice, RenderChain, Simulator};

/// Quantum dice by simulated measurement
#[derive(Parser)]
#[command(name = "qdice", version, about)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the configured seed)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll the die once
    Roll(DiceArgs),

    /// Roll many times and report raw and mapped counts
    Simulate {
        #[command(flatten)]
        dice: DiceArgs,

        /// Number of shots
        #[arg(short, long)]
        shots: Option<usize>,
    },

    /// Show the program, its theoretical distribution and a diagram
    Build {
        #[command(flatten)]
        dice: DiceArgs,

        /// Print only the diagram
        #[arg(long)]
        diagram: bool,
    },

    /// State vector after every gate
    Steps(DiceArgs),
}

#[derive(Args)]
struct DiceArgs {
    /// Number of outcomes
    #[arg(short, long, default_value_t = 6)]
    n: usize,

    /// Sampling method: rejection or exact
    #[arg(short, long, default_value_t = Method::Exact)]
    method: Method,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = DiceConfig::load(cli.config.clone()).context("Failed to load configuration")?;

    let dice = QuantumDice::new(Simulator::with_max_qubits(config.engine.max_qubits))
        .with_renderer(RenderChain::standard(config.render.max_columns));

    let seed = cli.seed.or(config.engine.seed).unwrap_or_else(rand::random::<u64>);
    info!(seed, "rng seeded");
    let mut rng = StdRng::seed_from_u64(seed);

    match cli.command {
        Commands::Roll(args) => {
            let n = clamp_outcomes(&config, args.n);
            let roll = dice.roll(n, args.method, &mut rng).context("Roll failed")?;
            print_json(&roll)?;
        }
        Commands::Simulate { dice: args, shots } => {
            let n = clamp_outcomes(&config, args.n);
            let shots = config.limits.clamp_shots(shots);
            let result = dice
                .roll_many(n, args.method, shots, &mut rng)
                .context("Simulation failed")?;
            print_json(&result)?;
        }
        Commands::Build { dice: args, diagram } => {
            let n = clamp_outcomes(&config, args.n);
            let inspection = dice.inspect(n, args.method).context("Build failed")?;
            if diagram {
                println!("{}", inspection.diagram);
            } else {
                print_json(&inspection)?;
            }
        }
        Commands::Steps(args) => {
            let n = clamp_outcomes(&config, args.n);
            let steps = dice.step_states(n, args.method).context("Step inspection failed")?;
            print_json(&steps)?;
        }
    }

    Ok(())
}

fn clamp_outcomes(config: &DiceConfig, n: usize) -> usize {
    let clamped = config.limits.clamp_outcomes(n);
    if clamped != n {
        warn!(requested = n, used = clamped, "outcome count clamped");
    }
    clamped
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}
