//! Clanfall engine CLI.
//!
//! Usage:
//!   clanfall replay battle.json               # Resolve (or replay) a battle
//!   clanfall accrue characters.json --write   # Run one offline XP cycle
//!   clanfall curve --to 50                    # Print XP thresholds
//!   clanfall config                           # Print the default balance file

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use clanfall::combat::{resolve_battle, BattleMode, BattleOutcome, BattleSeed, CombatStats};
use clanfall::offline::{run_cycle, MemoryStore, StoreSnapshot};
use clanfall::BalanceConfig;

#[derive(Parser)]
#[command(name = "clanfall")]
#[command(about = "Battle resolution and progression engine for Clanfall")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Balance configuration file (TOML). Built-in defaults when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a battle described in a JSON file
    Replay {
        /// Battle file with mode, attacker, defender and optional seed
        battle: PathBuf,
    },
    /// Run one offline XP accrual cycle over a character snapshot
    Accrue {
        /// Snapshot file (characters with progress and ledger)
        snapshot: PathBuf,

        /// Cycle time (RFC 3339). Defaults to now.
        #[arg(long)]
        now: Option<DateTime<Utc>>,

        /// Write the updated snapshot back to the file
        #[arg(short, long)]
        write: bool,
    },
    /// Print cumulative XP thresholds for a level range
    Curve {
        #[arg(long, default_value_t = 1)]
        from: u32,

        #[arg(long)]
        to: Option<u32>,
    },
    /// Print the active balance configuration as TOML
    Config,
}

/// Battle description read by `replay`.
#[derive(Debug, Deserialize)]
struct BattleFile {
    #[serde(default)]
    seed: Option<BattleSeed>,
    mode: BattleMode,
    attacker: CombatStats,
    defender: CombatStats,
}

#[derive(Debug, Serialize)]
struct ReplayOutput<'a> {
    seed: &'a BattleSeed,
    outcome: &'a BattleOutcome,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let balance = match &cli.config {
        Some(path) => BalanceConfig::load(path)
            .with_context(|| format!("loading balance config {}", path.display()))?,
        None => BalanceConfig::default(),
    };

    match cli.command {
        Commands::Replay { battle } => replay(&battle, &balance),
        Commands::Accrue {
            snapshot,
            now,
            write,
        } => accrue(&snapshot, now.unwrap_or_else(Utc::now), write, &balance),
        Commands::Curve { from, to } => {
            print_curve(from, to.unwrap_or(balance.leveling.max_level), &balance);
            Ok(())
        }
        Commands::Config => {
            print!("{}", balance.to_toml_string()?);
            Ok(())
        }
    }
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn replay(path: &Path, balance: &BalanceConfig) -> Result<()> {
    let battle: BattleFile = read_json(path)?;
    let seed = match battle.seed {
        Some(seed) => seed,
        None => {
            let seed = BattleSeed::generate();
            log::info!("no seed in battle file, generated {}", seed);
            seed
        }
    };

    let outcome = resolve_battle(
        battle.mode,
        &battle.attacker,
        &battle.defender,
        &seed,
        &balance.combat,
    )?;

    let output = ReplayOutput {
        seed: &seed,
        outcome: &outcome,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn accrue(path: &Path, now: DateTime<Utc>, write: bool, balance: &BalanceConfig) -> Result<()> {
    let snapshot: StoreSnapshot = read_json(path)?;
    let store = MemoryStore::from_snapshot(snapshot)?;

    let report = run_cycle(&store, &balance.leveling, &balance.offline, now)?;

    println!("Offline accrual at {}", now.to_rfc3339());
    println!("  Processed:  {}", report.processed);
    println!("  Awarded:    {} ({} xp)", report.awarded, report.xp_granted);
    println!("  Capped:     {}", report.capped);
    for (id, level_up) in &report.level_ups {
        println!(
            "  Character {} reached level {} (+{} points, milestones {:?})",
            id, level_up.new_level, level_up.points_gained, level_up.achievements_earned
        );
    }
    for failure in &report.failures {
        println!("  Character {} failed: {}", failure.character_id, failure.error);
    }

    if write {
        let json = serde_json::to_string_pretty(&store.snapshot()?)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    if !report.failures.is_empty() {
        bail!("{} character(s) failed during the cycle", report.failures.len());
    }
    Ok(())
}

fn print_curve(from: u32, to: u32, balance: &BalanceConfig) {
    let curve = &balance.leveling;
    let to = to.min(curve.max_level);
    println!("{:>6} {:>18} {:>8} {:>10}", "Level", "Total XP", "Points", "Milestone");
    for level in from.max(1)..=to {
        println!(
            "{:>6} {:>18} {:>8} {:>10}",
            level,
            curve.xp_for_level(level),
            curve.total_points_for_level(level),
            if curve.is_milestone(level) { "*" } else { "" }
        );
    }
}
