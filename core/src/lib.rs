#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish battle engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values. Systems read
//! immutable [`RosterView`] snapshots and respond with new commands.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of columns on the combat grid.
pub const GRID_WIDTH: u32 = 27;

/// Number of rows on the combat grid.
pub const GRID_HEIGHT: u32 = 21;

/// Number of columns on the narrow field used when placing an army preset.
pub const PLACEMENT_WIDTH: u32 = 3;

/// Number of rows on the narrow field used when placing an army preset.
pub const PLACEMENT_HEIGHT: u32 = 21;

/// Cells added around the start/goal bounding box when windowing a path query.
pub const DEFAULT_SEARCH_MARGIN: u32 = 5;

/// Dimensions of the combat grid.
pub const COMBAT_GRID: GridSize = GridSize::new(GRID_WIDTH, GRID_HEIGHT);

/// Dimensions of the placement field.
pub const PLACEMENT_GRID: GridSize = GridSize::new(PLACEMENT_WIDTH, PLACEMENT_HEIGHT);

/// Location of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based horizontal index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based vertical index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }

    /// Cell one step away in the provided direction, if it stays inside `grid`.
    #[must_use]
    pub fn step(self, direction: Direction, grid: GridSize) -> Option<CellCoord> {
        let next = match direction {
            Direction::North => CellCoord::new(self.x, self.y.checked_sub(1)?),
            Direction::East => CellCoord::new(self.x.checked_add(1)?, self.y),
            Direction::South => CellCoord::new(self.x, self.y.checked_add(1)?),
            Direction::West => CellCoord::new(self.x.checked_sub(1)?, self.y),
        };
        grid.contains(next).then_some(next)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing y.
    North,
    /// Movement toward increasing x.
    East,
    /// Movement toward increasing y.
    South,
    /// Movement toward decreasing x.
    West,
}

impl Direction {
    /// Every direction in the fixed expansion order used by searches.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The two directions orthogonal to this one.
    #[must_use]
    pub const fn perpendicular(self) -> [Direction; 2] {
        match self {
            Self::North | Self::South => [Self::East, Self::West],
            Self::East | Self::West => [Self::North, Self::South],
        }
    }
}

/// Width and height of a rectangular grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    width: u32,
    height: u32,
}

impl GridSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let width = usize::try_from(self.width).unwrap_or(0);
        let height = usize::try_from(self.height).unwrap_or(0);
        width.saturating_mul(height)
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Row-major offset of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let x = usize::try_from(cell.x).ok()?;
        let y = usize::try_from(cell.y).ok()?;
        let width = usize::try_from(self.width).ok()?;
        y.checked_mul(width)?.checked_add(x)
    }

    /// Cell stored at the provided row-major offset.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        let width = usize::try_from(self.width).ok()?;
        if width == 0 || index >= self.cell_count() {
            return None;
        }
        let x = u32::try_from(index % width).ok()?;
        let y = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(x, y))
    }
}

/// Inclusive rectangular sub-window of a grid that bounds a path search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchWindow {
    min: CellCoord,
    max: CellCoord,
}

impl SearchWindow {
    /// Window covering every cell of the grid.
    #[must_use]
    pub fn full(grid: GridSize) -> Self {
        Self::from_corners(
            CellCoord::new(0, 0),
            CellCoord::new(
                grid.width().saturating_sub(1),
                grid.height().saturating_sub(1),
            ),
        )
    }

    /// Bounding box of `a` and `b` padded by `margin` cells and clamped to `grid`.
    #[must_use]
    pub fn around(a: CellCoord, b: CellCoord, margin: u32, grid: GridSize) -> Self {
        let max_x = grid.width().saturating_sub(1);
        let max_y = grid.height().saturating_sub(1);
        Self {
            min: CellCoord::new(
                a.x().min(b.x()).saturating_sub(margin),
                a.y().min(b.y()).saturating_sub(margin),
            ),
            max: CellCoord::new(
                a.x().max(b.x()).saturating_add(margin).min(max_x),
                a.y().max(b.y()).saturating_add(margin).min(max_y),
            ),
        }
    }

    /// Window spanning the two corners, in any order.
    #[must_use]
    pub fn from_corners(a: CellCoord, b: CellCoord) -> Self {
        Self {
            min: CellCoord::new(a.x().min(b.x()), a.y().min(b.y())),
            max: CellCoord::new(a.x().max(b.x()), a.y().max(b.y())),
        }
    }

    /// Upper-left corner, inclusive.
    #[must_use]
    pub const fn min(&self) -> CellCoord {
        self.min
    }

    /// Lower-right corner, inclusive.
    #[must_use]
    pub const fn max(&self) -> CellCoord {
        self.max
    }

    /// Reports whether the cell lies inside the window.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.x >= self.min.x && cell.x <= self.max.x && cell.y >= self.min.y && cell.y <= self.max.y
    }
}

/// Unique identifier assigned to a unit by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Army a unit fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Army deployed on the left edge of the combat grid.
    Player,
    /// Army deployed on the right edge of the combat grid.
    Computer,
}

impl Side {
    /// The side fighting against this one.
    #[must_use]
    pub const fn opponent(self) -> Side {
        match self {
            Self::Player => Self::Computer,
            Self::Computer => Self::Player,
        }
    }

    /// Flank this side attacks from.
    #[must_use]
    pub const fn flank(self) -> AttackFlank {
        match self {
            Self::Player => AttackFlank::FromLeft,
            Self::Computer => AttackFlank::FromRight,
        }
    }
}

/// Edge of the battlefield an attack originates from.
///
/// Decides which unit of an enemy row counts as front-most: attacks from the
/// left reach the unit with the largest y, attacks from the right reach the
/// unit with the smallest y.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackFlank {
    /// The attacker stands on the left army's side.
    FromLeft,
    /// The attacker stands on the right army's side.
    FromRight,
}

/// Static description of a unit before it is deployed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    /// Display name, unique within an army by convention.
    pub name: String,
    /// Unit type label, also the key of opposing bonus maps.
    pub unit_type: String,
    /// Starting health.
    pub health: i32,
    /// Damage dealt per attack.
    pub base_attack: u32,
    /// Points the unit costs when drafting an army.
    pub cost: u32,
    /// Free-form attack type label such as "melee" or "ranged".
    pub attack_type: String,
    /// Attack multipliers keyed by the opposing unit type.
    #[serde(default)]
    pub attack_bonuses: BTreeMap<String, f64>,
    /// Defence multipliers keyed by the opposing unit type.
    #[serde(default)]
    pub defence_bonuses: BTreeMap<String, f64>,
    /// Cell the unit is deployed to.
    pub cell: CellCoord,
}

/// Ordered collection of units drafted for one side.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Army {
    units: Vec<UnitSpec>,
    points: u32,
}

impl Army {
    /// Creates an army whose points equal the summed cost of its units.
    #[must_use]
    pub fn new(units: Vec<UnitSpec>) -> Self {
        let points = units
            .iter()
            .fold(0u32, |total, unit| total.saturating_add(unit.cost));
        Self { units, points }
    }

    /// Units in draft order.
    #[must_use]
    pub fn units(&self) -> &[UnitSpec] {
        &self.units
    }

    /// Aggregate point cost of the army.
    #[must_use]
    pub const fn points(&self) -> u32 {
        self.points
    }

    /// Number of units in the army.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Reports whether the army has no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Consumes the army, yielding its units.
    #[must_use]
    pub fn into_units(self) -> Vec<UnitSpec> {
        self.units
    }
}

/// Immutable representation of a single unit's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitSnapshot {
    /// Identifier allocated to the unit by the world.
    pub id: UnitId,
    /// Army the unit fights for.
    pub side: Side,
    /// Display name.
    pub name: String,
    /// Unit type label.
    pub unit_type: String,
    /// Cell the unit occupies.
    pub cell: CellCoord,
    /// Remaining health; zero or below means the unit is down.
    pub health: i32,
    /// Damage dealt per attack.
    pub base_attack: u32,
    /// Draft cost.
    pub cost: u32,
    /// Whether the unit can still act and be targeted.
    pub alive: bool,
}

/// Read-only snapshot describing every deployed unit.
#[derive(Clone, Debug, Default)]
pub struct RosterView {
    snapshots: Vec<UnitSnapshot>,
}

impl RosterView {
    /// Creates a new roster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<UnitSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over every snapshot in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the units that are still alive.
    pub fn alive(&self) -> impl Iterator<Item = &UnitSnapshot> {
        self.snapshots.iter().filter(|snapshot| snapshot.alive)
    }

    /// Iterator over the living units of one side.
    pub fn alive_on(&self, side: Side) -> impl Iterator<Item = &UnitSnapshot> {
        self.alive().filter(move |snapshot| snapshot.side == side)
    }

    /// Looks up a unit by identifier.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<UnitSnapshot> {
        self.snapshots
    }
}

/// Ordered sequence of grid cells produced by a path search.
///
/// A non-empty path starts at the start cell and ends at the goal, with every
/// consecutive pair one orthogonal step apart. An empty path means no route
/// exists. A query whose start equals its goal yields a single-cell path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Vec<CellCoord>,
}

impl Path {
    /// Path signalling that no route exists.
    #[must_use]
    pub const fn empty() -> Self {
        Self { cells: Vec::new() }
    }

    /// Wraps cells already ordered from start to goal.
    #[must_use]
    pub fn from_cells(cells: Vec<CellCoord>) -> Self {
        debug_assert!(
            cells.windows(2).all(|pair| pair[0].is_adjacent(pair[1])),
            "path cells must be one orthogonal step apart"
        );
        Self { cells }
    }

    /// Cells from start to goal.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Reports whether the search found no route.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of grid steps the path takes.
    #[must_use]
    pub fn steps(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// First cell of the path.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.cells.first().copied()
    }

    /// Last cell of the path.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.cells.last().copied()
    }

    /// Consumes the path, yielding its cells.
    #[must_use]
    pub fn into_vec(self) -> Vec<CellCoord> {
        self.cells
    }
}

/// Contract violations reported by path queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PathError {
    /// An endpoint lies outside the occupancy grid.
    #[error("cell {cell} lies outside the {width}x{height} grid")]
    OutsideGrid {
        /// Offending cell.
        cell: CellCoord,
        /// Grid width.
        width: u32,
        /// Grid height.
        height: u32,
    },
    /// An endpoint lies outside the search window.
    #[error("cell {cell} lies outside the search window {min}..={max}")]
    OutsideWindow {
        /// Offending cell.
        cell: CellCoord,
        /// Upper-left window corner.
        min: CellCoord,
        /// Lower-right window corner.
        max: CellCoord,
    },
    /// The occupancy grid does not hold one flag per cell.
    #[error("occupancy grid holds {actual} cells, expected {expected}")]
    GridMismatch {
        /// Cell count implied by the grid dimensions.
        expected: usize,
        /// Cell count actually stored.
        actual: usize,
    },
}

/// Reasons an attack request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AttackError {
    /// One of the referenced units does not exist.
    #[error("unknown unit")]
    UnknownUnit,
    /// The attacker was already down.
    #[error("attacker is down")]
    AttackerDown,
    /// The target was already down.
    #[error("target is down")]
    TargetDown,
    /// Attacker and target fight for the same side.
    #[error("target fights for the same side")]
    FriendlyTarget,
}

/// Reasons a unit deployment may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum DeploymentError {
    /// The requested cell lies outside the combat grid.
    #[error("cell lies outside the combat grid")]
    OutOfBounds,
    /// Another living unit already stands on the requested cell.
    #[error("cell is already occupied")]
    Occupied,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Deploys every unit of the army for the provided side.
    DeployArmy {
        /// Side the army fights for.
        side: Side,
        /// Units to deploy in draft order.
        army: Army,
    },
    /// Applies one attack from `attacker` to `target`.
    ResolveAttack {
        /// Unit dealing the damage.
        attacker: UnitId,
        /// Unit receiving the damage.
        target: UnitId,
    },
    /// Removes every unit that is down from the roster.
    PurgeDead,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a unit joined the roster.
    UnitDeployed {
        /// Identifier assigned to the unit.
        unit: UnitId,
        /// Side the unit fights for.
        side: Side,
        /// Cell the unit occupies.
        cell: CellCoord,
    },
    /// Reports that a unit of a deployed army could not be placed.
    DeploymentRejected {
        /// Side the unit was drafted for.
        side: Side,
        /// Display name of the rejected unit.
        name: String,
        /// Requested cell.
        cell: CellCoord,
        /// Specific reason the placement failed.
        reason: DeploymentError,
    },
    /// Confirms that an attack landed.
    AttackResolved {
        /// Unit that dealt the damage.
        attacker: UnitId,
        /// Unit that received the damage.
        target: UnitId,
        /// Health removed from the target.
        damage: u32,
        /// Target health after the attack.
        remaining_health: i32,
    },
    /// Announces that a unit's health dropped to zero or below.
    UnitDied {
        /// Unit that went down.
        unit: UnitId,
    },
    /// Reports that an attack request was rejected.
    AttackRejected {
        /// Unit named as attacker.
        attacker: UnitId,
        /// Unit named as target.
        target: UnitId,
        /// Specific reason the attack failed.
        reason: AttackError,
    },
    /// Confirms that downed units left the roster.
    UnitsPurged {
        /// Units that were removed, in identifier order.
        units: Vec<UnitId>,
    },
}

/// Plans the route an attacker would take toward a target.
pub trait PathPlanner {
    /// Returns the path from `attacker` to `target` around every other live
    /// unit in `roster`, or an empty path when none exists.
    fn plan(
        &mut self,
        attacker: &UnitSnapshot,
        target: &UnitSnapshot,
        roster: &RosterView,
    ) -> Result<Path, PathError>;
}

/// Picks the enemy units that may be attacked directly.
pub trait TargetSelector {
    /// Returns at most one unit per row, in row order.
    fn suitable_targets<'a>(
        &self,
        rows: &[Vec<&'a UnitSnapshot>],
        flank: AttackFlank,
    ) -> Vec<&'a UnitSnapshot>;
}

/// Receives every resolved attack.
pub trait BattleLog {
    /// Called once per attack with both units as they stand after the damage.
    fn record_attack(&mut self, attacker: &UnitSnapshot, target: &UnitSnapshot);
}
