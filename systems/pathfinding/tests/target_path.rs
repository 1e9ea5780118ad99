use std::collections::BTreeMap;

use skirmish_core::{
    Army, CellCoord, Command, PathPlanner, Side, UnitId, UnitSpec, GRID_HEIGHT,
};
use skirmish_system_pathfinding::{Config, Pathfinder, SearchStrategy};
use skirmish_world::{self as world, query, World};

fn spec(name: &str, cell: (u32, u32)) -> UnitSpec {
    UnitSpec {
        name: name.to_owned(),
        unit_type: "Swordsman".to_owned(),
        health: 50,
        base_attack: 10,
        cost: 10,
        attack_type: "melee".to_owned(),
        attack_bonuses: BTreeMap::new(),
        defence_bonuses: BTreeMap::new(),
        cell: CellCoord::new(cell.0, cell.1),
    }
}

fn deploy(world: &mut World, side: Side, units: Vec<UnitSpec>) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::DeployArmy {
            side,
            army: Army::new(units),
        },
        &mut events,
    );
}

#[test]
fn path_routes_around_allied_screen() {
    let mut world = World::new();
    // Attacker at (2, 10) is boxed in by allies to the east, north and south.
    deploy(
        &mut world,
        Side::Player,
        vec![
            spec("attacker", (2, 10)),
            spec("east", (3, 10)),
            spec("north", (2, 9)),
            spec("south", (2, 11)),
        ],
    );
    deploy(&mut world, Side::Computer, vec![spec("target", (24, 10))]);

    let roster = query::roster(&world);
    let attacker = roster.get(UnitId::new(0)).expect("attacker deployed").clone();
    let target = roster.get(UnitId::new(4)).expect("target deployed").clone();

    for strategy in [SearchStrategy::Plain, SearchStrategy::JumpPoint] {
        let mut pathfinder = Pathfinder::new(Config {
            strategy,
            ..Config::default()
        });
        let path = pathfinder
            .plan(&attacker, &target, &roster)
            .expect("endpoints on the grid");

        // One step west, two north past the screen, across, two back south.
        assert_eq!(path.steps(), 28, "{strategy:?}");
        assert_eq!(path.start(), Some(attacker.cell));
        assert_eq!(path.goal(), Some(target.cell));
        assert!(!path.cells().contains(&CellCoord::new(3, 10)));
    }
}

#[test]
fn fully_enclosed_attacker_has_no_path() {
    let mut world = World::new();
    deploy(
        &mut world,
        Side::Player,
        vec![
            spec("attacker", (0, 0)),
            spec("east", (1, 0)),
            spec("south", (0, 1)),
        ],
    );
    deploy(
        &mut world,
        Side::Computer,
        vec![spec("target", (26, GRID_HEIGHT - 1))],
    );

    let roster = query::roster(&world);
    let attacker = roster.get(UnitId::new(0)).expect("attacker deployed").clone();
    let target = roster.get(UnitId::new(3)).expect("target deployed").clone();

    let mut pathfinder = Pathfinder::default();
    let path = pathfinder
        .plan(&attacker, &target, &roster)
        .expect("endpoints on the grid");
    assert!(path.is_empty());
}

#[test]
fn dead_units_do_not_block() {
    let mut world = World::new();
    deploy(
        &mut world,
        Side::Player,
        vec![spec("attacker", (10, 5)), spec("killer", (0, 0))],
    );
    deploy(
        &mut world,
        Side::Computer,
        vec![spec("blocker", (11, 5)), spec("target", (12, 5))],
    );

    let mut events = Vec::new();
    for _ in 0..5 {
        world::apply(
            &mut world,
            Command::ResolveAttack {
                attacker: UnitId::new(1),
                target: UnitId::new(2),
            },
            &mut events,
        );
    }

    let roster = query::roster(&world);
    assert!(!roster.get(UnitId::new(2)).expect("blocker on roster").alive);
    let attacker = roster.get(UnitId::new(0)).expect("attacker deployed").clone();
    let target = roster.get(UnitId::new(3)).expect("target deployed").clone();

    let path = Pathfinder::default()
        .target_path(&attacker, &target, &roster)
        .expect("endpoints on the grid");
    assert_eq!(path.steps(), 2);
}
