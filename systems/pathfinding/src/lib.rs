#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Obstacle-aware shortest-path search over the combat grid.
//!
//! A query blocks every live unit except the attacker and its target, bounds
//! the search to a window around both, and runs A* with a Manhattan
//! heuristic. Jump-ahead pruning can be switched on to cross straight
//! corridors in a single expansion; it never changes path length or whether a
//! path exists.

mod occupancy;
mod search;

pub use occupancy::{build_occupancy, OccupancyGrid};

use skirmish_core::{
    CellCoord, Path, PathError, PathPlanner, RosterView, SearchWindow, UnitSnapshot, COMBAT_GRID,
    DEFAULT_SEARCH_MARGIN,
};

use search::SearchWorkspace;

/// Neighbour generation used by the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SearchStrategy {
    /// Expands every passable orthogonal neighbour.
    Plain,
    /// Skips straight runs whose cells offer no side branch.
    #[default]
    JumpPoint,
}

/// Configuration parameters for the pathfinder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Neighbour generation rule.
    pub strategy: SearchStrategy,
    /// Cells added around the attacker/target bounding box; `None` searches
    /// the whole grid.
    pub margin: Option<u32>,
    /// Maximum node expansions per query before giving up with an empty path.
    pub expansion_budget: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strategy: SearchStrategy::default(),
            margin: Some(DEFAULT_SEARCH_MARGIN),
            expansion_budget: None,
        }
    }
}

/// Pathfinder that reuses its node tables between queries.
#[derive(Debug, Default)]
pub struct Pathfinder {
    config: Config,
    workspace: SearchWorkspace,
    last_expanded: usize,
}

impl Pathfinder {
    /// Creates a pathfinder using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            workspace: SearchWorkspace::default(),
            last_expanded: 0,
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Nodes expanded by the most recent query.
    #[must_use]
    pub const fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Finds a shortest 4-directional path from `start` to `goal`.
    ///
    /// The start cell is always treated as passable; every other cell,
    /// including the goal, must be free in `occupancy` and inside `window`.
    /// Returns [`Path::empty`] when no route exists and an error only when an
    /// endpoint lies outside the grid or the window.
    pub fn find_path(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        occupancy: &OccupancyGrid,
        window: SearchWindow,
    ) -> Result<Path, PathError> {
        validate_endpoint(start, occupancy, window)?;
        validate_endpoint(goal, occupancy, window)?;

        let outcome = self.workspace.run(
            start,
            goal,
            occupancy,
            window,
            self.config.strategy,
            self.config.expansion_budget,
        );
        self.last_expanded = outcome.expanded;

        if outcome.budget_exhausted {
            tracing::warn!(
                %start,
                %goal,
                expanded = outcome.expanded,
                "path search gave up after exhausting its expansion budget"
            );
        } else {
            tracing::debug!(
                %start,
                %goal,
                steps = outcome.path.steps(),
                found = !outcome.path.is_empty(),
                expanded = outcome.expanded,
                "path query"
            );
        }

        Ok(outcome.path)
    }

    /// Finds the path `attacker` would walk to reach `target`.
    ///
    /// Every other live unit in `roster` blocks its cell. The search window is
    /// the attacker/target bounding box padded by the configured margin.
    pub fn target_path(
        &mut self,
        attacker: &UnitSnapshot,
        target: &UnitSnapshot,
        roster: &RosterView,
    ) -> Result<Path, PathError> {
        let occupancy = build_occupancy(roster, attacker.id, target.id);
        let window = match self.config.margin {
            Some(margin) => SearchWindow::around(attacker.cell, target.cell, margin, COMBAT_GRID),
            None => SearchWindow::full(COMBAT_GRID),
        };
        self.find_path(attacker.cell, target.cell, &occupancy, window)
    }
}

impl PathPlanner for Pathfinder {
    fn plan(
        &mut self,
        attacker: &UnitSnapshot,
        target: &UnitSnapshot,
        roster: &RosterView,
    ) -> Result<Path, PathError> {
        self.target_path(attacker, target, roster)
    }
}

/// Finds a path with a throwaway pathfinder.
pub fn find_path(
    start: CellCoord,
    goal: CellCoord,
    occupancy: &OccupancyGrid,
    window: SearchWindow,
    strategy: SearchStrategy,
) -> Result<Path, PathError> {
    Pathfinder::new(Config {
        strategy,
        ..Config::default()
    })
    .find_path(start, goal, occupancy, window)
}

fn validate_endpoint(
    cell: CellCoord,
    occupancy: &OccupancyGrid,
    window: SearchWindow,
) -> Result<(), PathError> {
    let size = occupancy.size();
    if !size.contains(cell) {
        return Err(PathError::OutsideGrid {
            cell,
            width: size.width(),
            height: size.height(),
        });
    }
    if !window.contains(cell) {
        return Err(PathError::OutsideWindow {
            cell,
            min: window.min(),
            max: window.max(),
        });
    }
    Ok(())
}
