#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round-based battle loop that resolves attacks until one army falls.
//!
//! Turn order is fixed when the battle starts: every living player unit by
//! descending base attack, followed by every living computer unit in the same
//! order. Every round walks that order once; each unit still
//! standing picks a target from a fresh roster view and the attack is applied
//! to the world before the next unit acts, so a unit killed mid-round neither
//! acts nor gets targeted again. Downed units are purged after the pass.

mod cancel;

pub use cancel::CancelToken;

use std::cmp::Reverse;

use skirmish_core::{
    BattleLog, Command, Event, PathError, PathPlanner, RosterView, Side, TargetSelector, UnitId,
    UnitSnapshot,
};
use skirmish_system_pathfinding::Pathfinder;
use skirmish_system_targeting::{rows_of, FrontlineTargeting};
use skirmish_world::{self as world, query, World};
use thiserror::Error;

/// Lifecycle of a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BattleState {
    /// Both armies still have living units.
    Running,
    /// The computer army was wiped out.
    PlayerWins,
    /// The player army was wiped out.
    ComputerWins,
    /// Both armies fell in the same round.
    Draw,
    /// A full round dealt no damage; nothing can change any more.
    Stalemate,
    /// A path query failed mid-round; the round was closed out and play
    /// stopped.
    Faulted,
    /// The cancel token was observed between rounds.
    Interrupted,
}

impl BattleState {
    /// Reports whether the battle has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Summary returned once the battle stops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BattleReport {
    /// Terminal state the battle reached.
    pub outcome: BattleState,
    /// Rounds fully played.
    pub rounds: u32,
    /// Attacks resolved across all rounds.
    pub attacks: u32,
    /// Living player units at the end.
    pub player_survivors: usize,
    /// Living computer units at the end.
    pub computer_survivors: usize,
}

/// Faults that abort a battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BattleError {
    /// A path query received endpoints it cannot handle.
    #[error("path query failed: {0}")]
    Path(#[from] PathError),
}

/// Totals gathered while playing one round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Attacks resolved during the round.
    pub attacks: u32,
    /// Health removed during the round.
    pub damage: u64,
}

/// Battle loop parameterised over its targeting and path planning.
#[derive(Debug)]
pub struct Battle<S, P> {
    selector: S,
    planner: P,
    state: BattleState,
    turn_order: Vec<UnitId>,
    rounds: u32,
    attacks: u32,
}

impl Battle<FrontlineTargeting, Pathfinder> {
    /// Creates a battle using front-line targeting and the provided pathfinder.
    #[must_use]
    pub fn standard(pathfinder: Pathfinder) -> Self {
        Self::new(FrontlineTargeting::new(), pathfinder)
    }
}

impl<S, P> Battle<S, P>
where
    S: TargetSelector,
    P: PathPlanner,
{
    /// Creates a battle from its collaborators.
    #[must_use]
    pub fn new(selector: S, planner: P) -> Self {
        Self {
            selector,
            planner,
            state: BattleState::Running,
            turn_order: Vec::new(),
            rounds: 0,
            attacks: 0,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BattleState {
        self.state
    }

    /// Rounds fully played so far.
    #[must_use]
    pub const fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Fixes the turn order from the living units in `world`.
    ///
    /// The whole player side acts before the computer side. Within a side,
    /// higher base attack acts first and ties go to the lower identifier.
    pub fn begin(&mut self, world: &World) {
        let roster = query::roster(world);
        self.turn_order.clear();
        for side in [Side::Player, Side::Computer] {
            let mut living: Vec<&UnitSnapshot> = roster.alive_on(side).collect();
            living.sort_by_key(|unit| (Reverse(unit.base_attack), unit.id));
            self.turn_order.extend(living.into_iter().map(|unit| unit.id));
        }
        self.rounds = 0;
        self.attacks = 0;
        self.state = BattleState::Running;
        self.settle(world, None);
    }

    /// Runs rounds until the battle reaches a terminal state.
    ///
    /// `cancel` is checked once before every round; every resolved attack is
    /// reported to `log` and every world event is appended to `out_events`.
    pub fn simulate<L>(
        &mut self,
        world: &mut World,
        log: &mut L,
        cancel: &CancelToken,
        out_events: &mut Vec<Event>,
    ) -> Result<BattleReport, BattleError>
    where
        L: BattleLog,
    {
        self.begin(world);

        while !self.state.is_terminal() {
            if cancel.is_cancelled() {
                tracing::info!(rounds = self.rounds, "battle interrupted");
                self.state = BattleState::Interrupted;
                break;
            }
            let _ = self.play_round(world, log, out_events)?;
        }

        let report = BattleReport {
            outcome: self.state,
            rounds: self.rounds,
            attacks: self.attacks,
            player_survivors: query::alive_count(world, Side::Player),
            computer_survivors: query::alive_count(world, Side::Computer),
        };
        tracing::info!(
            outcome = ?report.outcome,
            rounds = report.rounds,
            attacks = report.attacks,
            player_survivors = report.player_survivors,
            computer_survivors = report.computer_survivors,
            "battle finished"
        );
        Ok(report)
    }

    /// Plays a single round and updates the battle state.
    ///
    /// Does nothing once the battle is over. A failing path query stops the
    /// remaining turns, but the round is still closed out: downed units are
    /// purged, the counters advance and the state becomes
    /// [`BattleState::Faulted`] before the error is returned.
    pub fn play_round<L>(
        &mut self,
        world: &mut World,
        log: &mut L,
        out_events: &mut Vec<Event>,
    ) -> Result<RoundSummary, BattleError>
    where
        L: BattleLog,
    {
        let mut summary = RoundSummary::default();
        if self.state.is_terminal() {
            return Ok(summary);
        }

        let turns = self.resolve_turns(world, log, out_events, &mut summary);

        world::apply(world, Command::PurgeDead, out_events);
        self.turn_order
            .retain(|id| query::unit(world, *id).is_some_and(|unit| unit.alive));
        self.rounds += 1;
        self.attacks += summary.attacks;

        tracing::info!(
            round = self.rounds,
            attacks = summary.attacks,
            damage = summary.damage,
            player_alive = query::alive_count(world, Side::Player),
            computer_alive = query::alive_count(world, Side::Computer),
            "round complete"
        );

        if let Err(error) = turns {
            tracing::warn!(round = self.rounds, %error, "round cut short by a path fault");
            self.state = BattleState::Faulted;
            return Err(error.into());
        }

        self.settle(world, Some(summary));
        Ok(summary)
    }

    fn resolve_turns<L>(
        &mut self,
        world: &mut World,
        log: &mut L,
        out_events: &mut Vec<Event>,
        summary: &mut RoundSummary,
    ) -> Result<(), PathError>
    where
        L: BattleLog,
    {
        let order = self.turn_order.clone();
        for attacker_id in order {
            let roster = query::roster(world);
            let Some(attacker) = roster.get(attacker_id).filter(|unit| unit.alive) else {
                continue;
            };
            let Some(target_id) = self.choose_target(attacker, &roster)? else {
                continue;
            };

            let mut events = Vec::new();
            world::apply(
                world,
                Command::ResolveAttack {
                    attacker: attacker_id,
                    target: target_id,
                },
                &mut events,
            );

            for event in &events {
                if let Event::AttackResolved {
                    attacker,
                    target,
                    damage,
                    ..
                } = event
                {
                    summary.attacks += 1;
                    summary.damage += u64::from(*damage);
                    if let (Some(attacker), Some(target)) =
                        (query::unit(world, *attacker), query::unit(world, *target))
                    {
                        tracing::debug!(
                            attacker = %attacker.name,
                            target = %target.name,
                            damage,
                            remaining = target.health,
                            "attack resolved"
                        );
                        log.record_attack(&attacker, &target);
                    }
                }
            }
            out_events.append(&mut events);
        }
        Ok(())
    }

    /// Picks the unit `attacker` strikes this turn, if any.
    ///
    /// Candidates are the front-most enemies of each row, tried nearest
    /// first. Adjacent candidates are attacked directly; the rest need a
    /// non-empty path around every other living unit.
    pub fn choose_target(
        &mut self,
        attacker: &UnitSnapshot,
        roster: &RosterView,
    ) -> Result<Option<UnitId>, PathError> {
        let rows = rows_of(roster, attacker.side.opponent());
        let mut candidates = self
            .selector
            .suitable_targets(&rows, attacker.side.flank());
        candidates.sort_by_key(|unit| (unit.cell.manhattan_distance(attacker.cell), unit.id));

        for candidate in candidates {
            if candidate.cell.is_adjacent(attacker.cell) {
                return Ok(Some(candidate.id));
            }
            let path = self.planner.plan(attacker, candidate, roster)?;
            if !path.is_empty() {
                return Ok(Some(candidate.id));
            }
        }

        tracing::debug!(attacker = %attacker.name, "no reachable target");
        Ok(None)
    }

    fn settle(&mut self, world: &World, round: Option<RoundSummary>) {
        let player = query::alive_count(world, Side::Player);
        let computer = query::alive_count(world, Side::Computer);
        self.state = match (player, computer) {
            (0, 0) => BattleState::Draw,
            (_, 0) => BattleState::PlayerWins,
            (0, _) => BattleState::ComputerWins,
            _ if round.is_some_and(|summary| summary.damage == 0) => BattleState::Stalemate,
            _ => BattleState::Running,
        };
    }
}
