use std::collections::VecDeque;

use proptest::prelude::*;
use skirmish_core::{CellCoord, GridSize, Path, SearchWindow};
use skirmish_system_pathfinding::{find_path, OccupancyGrid, SearchStrategy};

const WIDTH: u32 = 9;
const HEIGHT: u32 = 7;

fn grid_size() -> GridSize {
    GridSize::new(WIDTH, HEIGHT)
}

/// Breadth-first step count from `start` to `goal`, treating `start` as free.
fn bfs_distance(
    occupancy: &OccupancyGrid,
    window: SearchWindow,
    start: CellCoord,
    goal: CellCoord,
) -> Option<usize> {
    let size = occupancy.size();
    if start == goal {
        return Some(0);
    }
    let mut distances = vec![None; size.cell_count()];
    let mut queue = VecDeque::new();
    distances[size.index(start)?] = Some(0usize);
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        let distance = distances[size.index(cell)?]?;
        for direction in skirmish_core::Direction::ALL {
            let Some(next) = cell.step(direction, size) else {
                continue;
            };
            if !window.contains(next) || occupancy.is_blocked(next) {
                continue;
            }
            let index = size.index(next)?;
            if distances[index].is_some() {
                continue;
            }
            distances[index] = Some(distance + 1);
            if next == goal {
                return Some(distance + 1);
            }
            queue.push_back(next);
        }
    }
    None
}

fn assert_well_formed(path: &Path, occupancy: &OccupancyGrid, start: CellCoord, goal: CellCoord) {
    assert_eq!(path.start(), Some(start));
    assert_eq!(path.goal(), Some(goal));
    for pair in path.cells().windows(2) {
        assert!(pair[0].is_adjacent(pair[1]), "non-orthogonal step {pair:?}");
    }
    for cell in path.cells().iter().skip(1) {
        assert!(!occupancy.is_blocked(*cell), "path crosses blocked {cell}");
    }
}

fn scenario() -> impl Strategy<Value = (Vec<bool>, (u32, u32), (u32, u32))> {
    let cell_count = (WIDTH * HEIGHT) as usize;
    (
        prop::collection::vec(prop::bool::weighted(0.3), cell_count),
        (0..WIDTH, 0..HEIGHT),
        (0..WIDTH, 0..HEIGHT),
    )
}

proptest! {
    #[test]
    fn plain_search_matches_breadth_first_baseline((blocked, start, goal) in scenario()) {
        let occupancy = OccupancyGrid::from_cells(grid_size(), blocked).expect("sized grid");
        let window = SearchWindow::full(grid_size());
        let start = CellCoord::new(start.0, start.1);
        let goal = CellCoord::new(goal.0, goal.1);

        let path = find_path(start, goal, &occupancy, window, SearchStrategy::Plain)
            .expect("endpoints inside grid");
        let expected = if start != goal && occupancy.is_blocked(goal) {
            None
        } else {
            bfs_distance(&occupancy, window, start, goal)
        };

        match expected {
            Some(steps) => {
                prop_assert_eq!(path.steps(), steps);
                assert_well_formed(&path, &occupancy, start, goal);
            }
            None => prop_assert!(path.is_empty()),
        }
    }

    #[test]
    fn jump_pruning_preserves_length_and_verdict((blocked, start, goal) in scenario()) {
        let occupancy = OccupancyGrid::from_cells(grid_size(), blocked).expect("sized grid");
        let window = SearchWindow::full(grid_size());
        let start = CellCoord::new(start.0, start.1);
        let goal = CellCoord::new(goal.0, goal.1);

        let plain = find_path(start, goal, &occupancy, window, SearchStrategy::Plain)
            .expect("endpoints inside grid");
        let jumping = find_path(start, goal, &occupancy, window, SearchStrategy::JumpPoint)
            .expect("endpoints inside grid");

        prop_assert_eq!(plain.is_empty(), jumping.is_empty());
        prop_assert_eq!(plain.steps(), jumping.steps());
        if !jumping.is_empty() {
            assert_well_formed(&jumping, &occupancy, start, goal);
        }
    }

    #[test]
    fn windowed_search_stays_inside_window(
        (blocked, start, goal) in scenario(),
        margin in 0u32..3,
    ) {
        let occupancy = OccupancyGrid::from_cells(grid_size(), blocked).expect("sized grid");
        let start = CellCoord::new(start.0, start.1);
        let goal = CellCoord::new(goal.0, goal.1);
        let window = SearchWindow::around(start, goal, margin, grid_size());

        let path = find_path(start, goal, &occupancy, window, SearchStrategy::JumpPoint)
            .expect("endpoints inside window");
        let expected = if start != goal && occupancy.is_blocked(goal) {
            None
        } else {
            bfs_distance(&occupancy, window, start, goal)
        };

        prop_assert_eq!(path.is_empty(), expected.is_none());
        if let Some(steps) = expected {
            prop_assert_eq!(path.steps(), steps);
        }
        prop_assert!(path.cells().iter().all(|cell| window.contains(*cell)));
    }

    #[test]
    fn identical_inputs_yield_identical_paths((blocked, start, goal) in scenario()) {
        let occupancy = OccupancyGrid::from_cells(grid_size(), blocked).expect("sized grid");
        let window = SearchWindow::full(grid_size());
        let start = CellCoord::new(start.0, start.1);
        let goal = CellCoord::new(goal.0, goal.1);

        for strategy in [SearchStrategy::Plain, SearchStrategy::JumpPoint] {
            let first = find_path(start, goal, &occupancy, window, strategy)
                .expect("endpoints inside grid");
            let second = find_path(start, goal, &occupancy, window, strategy)
                .expect("endpoints inside grid");
            prop_assert_eq!(first, second);
        }
    }
}

#[test]
fn walled_off_goal_has_no_path_under_either_strategy() {
    let mut occupancy = OccupancyGrid::new(grid_size());
    let goal = CellCoord::new(4, 3);
    for neighbor in [(4, 2), (5, 3), (4, 4), (3, 3)] {
        occupancy.block(CellCoord::new(neighbor.0, neighbor.1));
    }

    for strategy in [SearchStrategy::Plain, SearchStrategy::JumpPoint] {
        let path = find_path(
            CellCoord::new(0, 0),
            goal,
            &occupancy,
            SearchWindow::full(grid_size()),
            strategy,
        )
        .expect("endpoints inside grid");
        assert!(path.is_empty(), "{strategy:?} found a path into a sealed cell");
    }
}
