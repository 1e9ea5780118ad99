#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks the front-most enemy in every row.
//!
//! Rows are keyed by x. Inside a row the y coordinate decides which unit faces
//! the attacker, so only that unit is a legal direct target and path queries
//! are limited to one candidate per row.

use std::collections::BTreeMap;

use skirmish_core::{AttackFlank, RosterView, Side, TargetSelector, UnitSnapshot};

/// Target selector that returns the front-most living unit of each row.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrontlineTargeting;

impl FrontlineTargeting {
    /// Creates a new selector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TargetSelector for FrontlineTargeting {
    fn suitable_targets<'a>(
        &self,
        rows: &[Vec<&'a UnitSnapshot>],
        flank: AttackFlank,
    ) -> Vec<&'a UnitSnapshot> {
        suitable_targets(rows, flank)
    }
}

/// Returns the front-most living unit of every row, in row order.
///
/// Attacks from the right reach the unit with the smallest y; attacks from
/// the left reach the unit with the largest y. Rows without a living unit
/// contribute nothing.
#[must_use]
pub fn suitable_targets<'a>(
    rows: &[Vec<&'a UnitSnapshot>],
    flank: AttackFlank,
) -> Vec<&'a UnitSnapshot> {
    let mut out = Vec::with_capacity(rows.len());

    for row in rows {
        let mut best: Option<&'a UnitSnapshot> = None;

        for &candidate in row {
            if !candidate.alive {
                continue;
            }

            if best.map_or(true, |existing| precedes(candidate, existing, flank)) {
                best = Some(candidate);
            }
        }

        if let Some(unit) = best {
            out.push(unit);
        }
    }

    out
}

/// Groups the living units of `side` into rows keyed by x, ordered by x.
#[must_use]
pub fn rows_of(roster: &RosterView, side: Side) -> Vec<Vec<&UnitSnapshot>> {
    let mut rows: BTreeMap<u32, Vec<&UnitSnapshot>> = BTreeMap::new();
    for unit in roster.alive_on(side) {
        rows.entry(unit.cell.x()).or_default().push(unit);
    }
    rows.into_values().collect()
}

fn precedes(candidate: &UnitSnapshot, existing: &UnitSnapshot, flank: AttackFlank) -> bool {
    let (candidate_y, existing_y) = (candidate.cell.y(), existing.cell.y());
    if candidate_y != existing_y {
        return match flank {
            AttackFlank::FromRight => candidate_y < existing_y,
            AttackFlank::FromLeft => candidate_y > existing_y,
        };
    }

    candidate.id < existing.id
}
