//! StakeAllocator - Main Entry Point
//!
//! Reads one session (teams and stake declarations) as JSON and prints the
//! resulting stake plan as JSON on stdout. Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use stake_allocator::config::loader;
use stake_allocator::{SessionInput, StakeCalculator, StakePlan, Strategy};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file; STAKES_* environment variables are used when it is missing
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Session JSON file: {"team_a": [...], "team_b": [...], "stakes": [...]}
    #[arg(short, long)]
    session: PathBuf,

    /// Planner to run first (tiered, optimized); overrides the config file
    #[arg(long, env = "STAKES_STRATEGY")]
    strategy: Option<Strategy>,

    /// Log level or filter directive (e.g. debug, stake_allocator=trace); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    generated_at: DateTime<Utc>,
    plan: &'a StakePlan,
}

/// RUST_LOG wins over the configured level when set
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    if format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(
            builder.with_file(true).with_line_number(true).finish(),
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config_found = std::path::Path::new(&args.config).exists();
    let mut config = loader::load(&args.config)?;
    if let Some(strategy) = args.strategy {
        config.engine.strategy = strategy;
    }

    let log_level = args.log_level.as_deref().unwrap_or(&config.settings.log_level);
    init_logging(log_level, &config.settings.log_format)?;

    info!("Starting StakeAllocator");
    if config_found {
        info!("Configuration file: {}", args.config);
    } else {
        info!("Configuration file {} not found, using STAKES_* environment", args.config);
    }

    let raw = std::fs::read_to_string(&args.session)
        .with_context(|| format!("reading session file {}", args.session.display()))?;
    let session: SessionInput = serde_json::from_str(&raw)
        .with_context(|| format!("parsing session file {}", args.session.display()))?;

    let calculator = StakeCalculator::new(config.engine);
    let plan = calculator.compute_session(&session)?;

    info!(
        strategy = %plan.strategy,
        pairs = plan.pairs.len(),
        team_a_total = plan.team_total(stake_allocator::TeamSide::A),
        "Stake plan computed"
    );
    if let Some(reason) = &plan.fallback {
        warn!(%reason, "Tiered allocation was not used");
    }
    for shortfall in plan.shortfalls() {
        warn!(
            player = %shortfall.player_id,
            target = shortfall.target,
            paired = shortfall.paired,
            "Player underallocated"
        );
    }

    let output = Output {
        generated_at: Utc::now(),
        plan: &plan,
    };
    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");

    Ok(())
}
