//! Best-first grid search with array-backed node tables.
//!
//! The open set is a binary heap ordered by `(f, sequence)`: the lowest
//! f-score wins and ties go to the node pushed first. That rule decides which
//! of several equally short paths is returned, so it must stay stable.

use std::{cmp::Reverse, collections::BinaryHeap};

use skirmish_core::{CellCoord, Direction, GridSize, Path, SearchWindow};

use crate::{occupancy::OccupancyGrid, SearchStrategy};

/// Outcome of a single search run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SearchOutcome {
    pub(crate) path: Path,
    pub(crate) expanded: usize,
    pub(crate) budget_exhausted: bool,
}

/// Reusable scratch tables sized to the occupancy grid.
#[derive(Debug, Default)]
pub(crate) struct SearchWorkspace {
    size: Option<GridSize>,
    g_scores: Vec<u32>,
    parents: Vec<Option<usize>>,
    closed: Vec<bool>,
    open: BinaryHeap<Reverse<(u32, u64, usize)>>,
    sequence: u64,
}

impl SearchWorkspace {
    fn reset(&mut self, size: GridSize) {
        let cell_count = size.cell_count();
        if self.size != Some(size) || self.g_scores.len() != cell_count {
            self.g_scores = vec![u32::MAX; cell_count];
            self.parents = vec![None; cell_count];
            self.closed = vec![false; cell_count];
            self.size = Some(size);
        } else {
            self.g_scores.fill(u32::MAX);
            self.parents.fill(None);
            self.closed.fill(false);
        }
        self.open.clear();
        self.sequence = 0;
    }

    fn push(&mut self, index: usize, f_score: u32) {
        self.open.push(Reverse((f_score, self.sequence, index)));
        self.sequence = self.sequence.wrapping_add(1);
    }

    /// Runs the search. Endpoints must already be validated against the grid
    /// and the window.
    pub(crate) fn run(
        &mut self,
        start: CellCoord,
        goal: CellCoord,
        occupancy: &OccupancyGrid,
        window: SearchWindow,
        strategy: SearchStrategy,
        budget: Option<usize>,
    ) -> SearchOutcome {
        let size = occupancy.size();
        let mut outcome = SearchOutcome {
            path: Path::empty(),
            expanded: 0,
            budget_exhausted: false,
        };

        if start == goal {
            outcome.path = Path::from_cells(vec![start]);
            return outcome;
        }

        let field = Field {
            size,
            occupancy,
            window,
            goal,
        };
        if !field.is_passable(goal) {
            return outcome;
        }

        let (Some(start_index), Some(goal_index)) = (size.index(start), size.index(goal)) else {
            return outcome;
        };

        self.reset(size);
        self.g_scores[start_index] = 0;
        self.push(start_index, start.manhattan_distance(goal));

        while let Some(Reverse((_, _, index))) = self.open.pop() {
            if self.closed[index] {
                continue;
            }
            if index == goal_index {
                outcome.path = self.reconstruct(size, goal_index);
                return outcome;
            }
            if budget.is_some_and(|limit| outcome.expanded >= limit) {
                outcome.budget_exhausted = true;
                return outcome;
            }

            self.closed[index] = true;
            outcome.expanded += 1;

            let Some(cell) = size.cell_at(index) else {
                continue;
            };
            let current_g = self.g_scores[index];

            for direction in Direction::ALL {
                let successor = match strategy {
                    SearchStrategy::Plain => field.step(cell, direction).map(|next| (next, 1)),
                    SearchStrategy::JumpPoint => field.jump(cell, direction),
                };
                let Some((next, distance)) = successor else {
                    continue;
                };
                let Some(next_index) = size.index(next) else {
                    continue;
                };
                if self.closed[next_index] {
                    continue;
                }

                let tentative = current_g.saturating_add(distance);
                if tentative >= self.g_scores[next_index] {
                    continue;
                }

                self.g_scores[next_index] = tentative;
                self.parents[next_index] = Some(index);
                self.push(next_index, tentative + next.manhattan_distance(goal));
            }
        }

        outcome
    }

    /// Walks parent links back from the goal, filling in the straight runs
    /// that jumps skipped over.
    fn reconstruct(&self, size: GridSize, goal_index: usize) -> Path {
        let mut cells = Vec::new();
        let mut current = goal_index;
        let Some(mut cursor) = size.cell_at(current) else {
            return Path::empty();
        };
        cells.push(cursor);

        while let Some(parent) = self.parents[current] {
            let Some(parent_cell) = size.cell_at(parent) else {
                return Path::empty();
            };
            let Some(direction) = direction_between(cursor, parent_cell) else {
                return Path::empty();
            };
            while cursor != parent_cell {
                let Some(next) = cursor.step(direction, size) else {
                    return Path::empty();
                };
                cursor = next;
                cells.push(cursor);
            }
            current = parent;
        }

        cells.reverse();
        Path::from_cells(cells)
    }
}

/// Read-only passability rules for one query.
struct Field<'a> {
    size: GridSize,
    occupancy: &'a OccupancyGrid,
    window: SearchWindow,
    goal: CellCoord,
}

impl Field<'_> {
    fn is_passable(&self, cell: CellCoord) -> bool {
        self.window.contains(cell) && !self.occupancy.is_blocked(cell)
    }

    fn step(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        cell.step(direction, self.size)
            .filter(|next| self.is_passable(*next))
    }

    /// Follows `direction` from `cell` until reaching a cell worth expanding.
    ///
    /// A run stops at the goal or at the first cell with an open side branch.
    /// Runs ending against a wall without any branch lead nowhere and yield
    /// `None`.
    fn jump(&self, cell: CellCoord, direction: Direction) -> Option<(CellCoord, u32)> {
        let mut current = cell;
        let mut distance = 0u32;
        loop {
            current = self.step(current, direction)?;
            distance += 1;

            if current == self.goal {
                return Some((current, distance));
            }

            let branches = direction
                .perpendicular()
                .into_iter()
                .any(|side| self.step(current, side).is_some());
            if branches {
                return Some((current, distance));
            }
        }
    }
}

/// Direction leading from `from` toward `to` when both share a row or column.
fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    if from == to {
        return None;
    }
    if from.x() == to.x() {
        return Some(if to.y() < from.y() {
            Direction::North
        } else {
            Direction::South
        });
    }
    if from.y() == to.y() {
        return Some(if to.x() > from.x() {
            Direction::East
        } else {
            Direction::West
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(
        size: GridSize,
        walls: &[(u32, u32)],
        start: (u32, u32),
        goal: (u32, u32),
        strategy: SearchStrategy,
    ) -> SearchOutcome {
        let mut occupancy = OccupancyGrid::new(size);
        for &(x, y) in walls {
            occupancy.block(CellCoord::new(x, y));
        }
        SearchWorkspace::default().run(
            CellCoord::new(start.0, start.1),
            CellCoord::new(goal.0, goal.1),
            &occupancy,
            SearchWindow::full(size),
            strategy,
            None,
        )
    }

    #[test]
    fn direction_between_handles_aligned_cells() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            direction_between(origin, CellCoord::new(3, 0)),
            Some(Direction::North)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(9, 3)),
            Some(Direction::East)
        );
        assert_eq!(direction_between(origin, CellCoord::new(4, 4)), None);
        assert_eq!(direction_between(origin, origin), None);
    }

    #[test]
    fn jump_runs_expand_into_unit_steps() {
        // Single-row corridor: every cell has blocked sides, so the jump
        // crosses the whole run in one expansion.
        let size = GridSize::new(8, 1);
        let result = outcome(size, &[], (0, 0), (7, 0), SearchStrategy::JumpPoint);

        assert_eq!(result.path.steps(), 7);
        assert_eq!(result.path.cells().len(), 8);
        assert_eq!(result.expanded, 1);
    }

    #[test]
    fn corridor_needs_fewer_expansions_with_jumps() {
        let size = GridSize::new(12, 3);
        let walls: Vec<_> = (1..11).flat_map(|x| [(x, 0), (x, 2)]).collect();

        let plain = outcome(size, &walls, (0, 1), (11, 1), SearchStrategy::Plain);
        let jumping = outcome(size, &walls, (0, 1), (11, 1), SearchStrategy::JumpPoint);

        assert_eq!(plain.path, jumping.path);
        assert!(jumping.expanded < plain.expanded);
    }

    #[test]
    fn equal_f_scores_prefer_earlier_insertion() {
        // On an open 2x2 grid the first neighbour pushed (East in expansion
        // order) wins the tie.
        let size = GridSize::new(2, 2);
        let result = outcome(size, &[], (0, 0), (1, 1), SearchStrategy::Plain);
        assert_eq!(
            result.path.cells(),
            &[
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1)
            ]
        );
    }

    #[test]
    fn budget_stops_search_early() {
        let size = GridSize::new(10, 10);
        let mut occupancy = OccupancyGrid::new(size);
        occupancy.block(CellCoord::new(5, 5));
        let result = SearchWorkspace::default().run(
            CellCoord::new(0, 0),
            CellCoord::new(9, 9),
            &occupancy,
            SearchWindow::full(size),
            SearchStrategy::Plain,
            Some(3),
        );

        assert!(result.budget_exhausted);
        assert!(result.path.is_empty());
        assert_eq!(result.expanded, 3);
    }
}
