#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state for Skirmish.
//!
//! Both armies live in one roster; every unit carries a side tag, so there is
//! never a second list to keep in sync. The roster is only mutated through
//! [`apply`] and only read through [`query`].

use skirmish_core::{
    AttackError, CellCoord, Command, DeploymentError, Event, Side, UnitId, UnitSpec, COMBAT_GRID,
};

/// Deployed unit owned by the world.
#[derive(Clone, Debug)]
struct Unit {
    id: UnitId,
    side: Side,
    spec: UnitSpec,
    health: i32,
    alive: bool,
}

impl Unit {
    fn deploy(id: UnitId, side: Side, spec: UnitSpec) -> Self {
        let health = spec.health;
        Self {
            id,
            side,
            spec,
            health,
            alive: health > 0,
        }
    }

    fn cell(&self) -> CellCoord {
        self.spec.cell
    }

    /// Subtracts damage and reports whether the hit took the unit down.
    fn take_damage(&mut self, damage: u32) -> bool {
        let damage = i32::try_from(damage).unwrap_or(i32::MAX);
        self.health = self.health.saturating_sub(damage);
        if self.health <= 0 && self.alive {
            self.alive = false;
            return true;
        }
        false
    }
}

/// Represents the authoritative battle state.
#[derive(Debug, Default)]
pub struct World {
    units: Vec<Unit>,
    next_unit_id: u32,
}

impl World {
    /// Creates an empty world with no deployed units.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn unit_index(&self, id: UnitId) -> Option<usize> {
        self.units
            .binary_search_by_key(&id, |unit| unit.id)
            .ok()
    }

    fn is_cell_taken(&self, cell: CellCoord) -> bool {
        self.units
            .iter()
            .any(|unit| unit.alive && unit.cell() == cell)
    }

    fn allocate_id(&mut self) -> UnitId {
        let id = UnitId::new(self.next_unit_id);
        self.next_unit_id = self.next_unit_id.saturating_add(1);
        id
    }

    fn resolve_attack(
        &mut self,
        attacker: UnitId,
        target: UnitId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), AttackError> {
        let attacker_index = self.unit_index(attacker).ok_or(AttackError::UnknownUnit)?;
        let target_index = self.unit_index(target).ok_or(AttackError::UnknownUnit)?;

        let (attacker_side, damage) = {
            let unit = &self.units[attacker_index];
            if !unit.alive {
                return Err(AttackError::AttackerDown);
            }
            (unit.side, unit.spec.base_attack)
        };

        let victim = &mut self.units[target_index];
        if !victim.alive {
            return Err(AttackError::TargetDown);
        }
        if victim.side == attacker_side {
            return Err(AttackError::FriendlyTarget);
        }

        let died = victim.take_damage(damage);
        out_events.push(Event::AttackResolved {
            attacker,
            target,
            damage,
            remaining_health: victim.health,
        });
        if died {
            out_events.push(Event::UnitDied { unit: target });
        }
        Ok(())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::DeployArmy { side, army } => {
            for spec in army.into_units() {
                let cell = spec.cell;
                let rejection = if !COMBAT_GRID.contains(cell) {
                    Some(DeploymentError::OutOfBounds)
                } else if spec.health > 0 && world.is_cell_taken(cell) {
                    Some(DeploymentError::Occupied)
                } else {
                    None
                };

                if let Some(reason) = rejection {
                    out_events.push(Event::DeploymentRejected {
                        side,
                        name: spec.name,
                        cell,
                        reason,
                    });
                    continue;
                }

                let id = world.allocate_id();
                world.units.push(Unit::deploy(id, side, spec));
                out_events.push(Event::UnitDeployed {
                    unit: id,
                    side,
                    cell,
                });
            }
        }
        Command::ResolveAttack { attacker, target } => {
            if let Err(reason) = world.resolve_attack(attacker, target, out_events) {
                out_events.push(Event::AttackRejected {
                    attacker,
                    target,
                    reason,
                });
            }
        }
        Command::PurgeDead => {
            let purged: Vec<UnitId> = world
                .units
                .iter()
                .filter(|unit| !unit.alive)
                .map(|unit| unit.id)
                .collect();
            if purged.is_empty() {
                return;
            }
            world.units.retain(|unit| unit.alive);
            out_events.push(Event::UnitsPurged { units: purged });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Unit, World};
    use skirmish_core::{RosterView, Side, UnitId, UnitSnapshot};

    fn snapshot(unit: &Unit) -> UnitSnapshot {
        UnitSnapshot {
            id: unit.id,
            side: unit.side,
            name: unit.spec.name.clone(),
            unit_type: unit.spec.unit_type.clone(),
            cell: unit.spec.cell,
            health: unit.health,
            base_attack: unit.spec.base_attack,
            cost: unit.spec.cost,
            alive: unit.alive,
        }
    }

    /// Captures a read-only view of every unit still on the roster.
    #[must_use]
    pub fn roster(world: &World) -> RosterView {
        RosterView::from_snapshots(world.units.iter().map(snapshot).collect())
    }

    /// Captures a single unit, if it is still on the roster.
    #[must_use]
    pub fn unit(world: &World, id: UnitId) -> Option<UnitSnapshot> {
        world.unit_index(id).map(|index| snapshot(&world.units[index]))
    }

    /// Counts the living units of one side.
    #[must_use]
    pub fn alive_count(world: &World, side: Side) -> usize {
        world
            .units
            .iter()
            .filter(|unit| unit.alive && unit.side == side)
            .count()
    }

    /// Summed draft cost of the units deployed for one side, living or not.
    #[must_use]
    pub fn army_points(world: &World, side: Side) -> u32 {
        world
            .units
            .iter()
            .filter(|unit| unit.side == side)
            .fold(0u32, |total, unit| total.saturating_add(unit.spec.cost))
    }
}
