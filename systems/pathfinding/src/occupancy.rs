//! Blocked-cell grid derived from the live roster for a single path query.

use skirmish_core::{CellCoord, GridSize, PathError, RosterView, UnitId, UnitSnapshot, COMBAT_GRID};

/// Dense row-major map of impassable cells.
///
/// Cells outside the grid always report as blocked so searches never step off
/// the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    size: GridSize,
    blocked: Vec<bool>,
}

impl OccupancyGrid {
    /// Creates a grid with every cell passable.
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            blocked: vec![false; size.cell_count()],
        }
    }

    /// Wraps an existing row-major blocked map.
    pub fn from_cells(size: GridSize, blocked: Vec<bool>) -> Result<Self, PathError> {
        let expected = size.cell_count();
        if blocked.len() != expected {
            return Err(PathError::GridMismatch {
                expected,
                actual: blocked.len(),
            });
        }
        Ok(Self { size, blocked })
    }

    /// Marks every live unit's cell as blocked, skipping the `excluded` units.
    ///
    /// Dead units and units standing outside the grid are ignored.
    #[must_use]
    pub fn from_units<'a, I>(size: GridSize, units: I, excluded: &[UnitId]) -> Self
    where
        I: IntoIterator<Item = &'a UnitSnapshot>,
    {
        let mut grid = Self::new(size);
        for unit in units {
            if !unit.alive || excluded.contains(&unit.id) {
                continue;
            }
            grid.block(unit.cell);
        }
        grid
    }

    /// Marks the cell as impassable. Cells outside the grid are ignored.
    pub fn block(&mut self, cell: CellCoord) {
        if let Some(index) = self.size.index(cell) {
            self.blocked[index] = true;
        }
    }

    /// Reports whether the cell cannot be entered.
    #[must_use]
    pub fn is_blocked(&self, cell: CellCoord) -> bool {
        self.size
            .index(cell)
            .map_or(true, |index| self.blocked[index])
    }

    /// Dimensions of the grid.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Number of blocked cells.
    #[must_use]
    pub fn blocked_count(&self) -> usize {
        self.blocked.iter().filter(|blocked| **blocked).count()
    }
}

/// Builds the combat-grid occupancy for a query from `attacker` to `target`.
///
/// Both endpoints are left passable even though they stand on the board.
#[must_use]
pub fn build_occupancy(roster: &RosterView, attacker: UnitId, target: UnitId) -> OccupancyGrid {
    OccupancyGrid::from_units(COMBAT_GRID, roster.iter(), &[attacker, target])
}
