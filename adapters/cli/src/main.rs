#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drafts two armies and plays out their battle.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use skirmish_core::{
    BattleLog, Command, Event, Side, UnitSnapshot, DEFAULT_SEARCH_MARGIN, GRID_WIDTH,
    PLACEMENT_WIDTH,
};
use skirmish_system_combat::{Battle, BattleState, CancelToken};
use skirmish_system_pathfinding::{Config as PathConfig, Pathfinder, SearchStrategy};
use skirmish_system_preset::{Config as PresetConfig, PresetGenerator};
use skirmish_world::{self as world, World};
use tracing_subscriber::EnvFilter;

use scenario::Scenario;

/// Plays a seeded battle between a player army and a computer army.
#[derive(Debug, Parser)]
#[command(name = "skirmish", about = "Simulate a grid battle between two drafted armies")]
struct Args {
    /// Scenario TOML listing unit templates and the points budget
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Seed for army placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Points budget per army, overriding the scenario
    #[arg(long)]
    points: Option<u32>,

    /// Neighbour generation used by path queries
    #[arg(long, value_enum, default_value_t = Strategy::JumpPoint)]
    strategy: Strategy,

    /// Cells searched around the attacker and target
    #[arg(long, default_value_t = DEFAULT_SEARCH_MARGIN)]
    margin: u32,

    /// Search the whole grid instead of a window around both units
    #[arg(long)]
    unbounded: bool,

    /// Node expansions allowed per path query
    #[arg(long)]
    budget: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Strategy {
    Plain,
    JumpPoint,
}

impl From<Strategy> for SearchStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Plain => SearchStrategy::Plain,
            Strategy::JumpPoint => SearchStrategy::JumpPoint,
        }
    }
}

/// Reports every resolved attack through `tracing`.
#[derive(Debug, Default)]
struct ConsoleLog {
    attacks: usize,
}

impl BattleLog for ConsoleLog {
    fn record_attack(&mut self, attacker: &UnitSnapshot, target: &UnitSnapshot) {
        self.attacks += 1;
        tracing::info!(
            attacker = %attacker.name,
            attacker_side = side_label(attacker.side),
            from = %attacker.cell,
            target = %target.name,
            target_side = side_label(target.side),
            at = %target.cell,
            health = target.health,
            down = !target.alive,
            "attack"
        );
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Player => "player",
        Side::Computer => "computer",
    }
}

/// Entry point for the Skirmish command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    let points = args.points.unwrap_or(scenario.points);
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, points, "starting skirmish");

    let player = PresetGenerator::new(PresetConfig::new(seed))
        .generate(&scenario.templates, points)
        .context("failed to draft the player army")?;
    let computer = PresetGenerator::new(
        PresetConfig::new(seed.wrapping_add(1)).with_column_offset(GRID_WIDTH - PLACEMENT_WIDTH),
    )
    .generate(&scenario.templates, points)
    .context("failed to draft the computer army")?;

    println!(
        "seed {seed}: player drafts {} units ({} points), computer drafts {} units ({} points)",
        player.len(),
        player.points(),
        computer.len(),
        computer.points()
    );

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::DeployArmy {
            side: Side::Player,
            army: player,
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::DeployArmy {
            side: Side::Computer,
            army: computer,
        },
        &mut events,
    );
    for event in &events {
        if let Event::DeploymentRejected {
            side,
            name,
            cell,
            reason,
        } = event
        {
            tracing::warn!(?side, %name, %cell, %reason, "unit was not deployed");
        }
    }

    let pathfinder = Pathfinder::new(PathConfig {
        strategy: args.strategy.into(),
        margin: (!args.unbounded).then_some(args.margin),
        expansion_budget: args.budget,
    });
    let mut battle = Battle::standard(pathfinder);
    let mut log = ConsoleLog::default();
    events.clear();
    let report = battle
        .simulate(&mut world, &mut log, &CancelToken::new(), &mut events)
        .context("battle aborted")?;

    let verdict = match report.outcome {
        BattleState::PlayerWins => "player wins",
        BattleState::ComputerWins => "computer wins",
        BattleState::Draw => "draw",
        BattleState::Stalemate => "stalemate",
        BattleState::Interrupted => "interrupted",
        BattleState::Faulted => "faulted",
        BattleState::Running => "unfinished",
    };
    println!(
        "{verdict} after {} rounds and {} attacks; survivors: player {}, computer {}",
        report.rounds,
        log.attacks,
        report.player_survivors,
        report.computer_survivors,
    );
    Ok(())
}
