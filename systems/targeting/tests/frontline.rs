use std::collections::BTreeMap;

use skirmish_core::{Army, CellCoord, Command, Side, TargetSelector, UnitId, UnitSpec};
use skirmish_system_targeting::{rows_of, FrontlineTargeting};
use skirmish_world::{self as world, query, World};

fn spec(name: &str, cell: (u32, u32), health: i32) -> UnitSpec {
    UnitSpec {
        name: name.to_owned(),
        unit_type: "Pikeman".to_owned(),
        health,
        base_attack: 20,
        cost: 15,
        attack_type: "melee".to_owned(),
        attack_bonuses: BTreeMap::new(),
        defence_bonuses: BTreeMap::new(),
        cell: CellCoord::new(cell.0, cell.1),
    }
}

fn deployed_world() -> World {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::DeployArmy {
            side: Side::Player,
            army: Army::new(vec![spec("hero", (0, 10), 100)]),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::DeployArmy {
            side: Side::Computer,
            army: Army::new(vec![
                spec("a", (24, 3), 20),
                spec("b", (24, 7), 20),
                spec("c", (24, 12), 20),
                spec("d", (26, 1), 20),
                spec("e", (26, 18), 20),
            ]),
        },
        &mut events,
    );
    world
}

#[test]
fn one_target_per_enemy_row() {
    let world = deployed_world();
    let roster = query::roster(&world);
    let rows = rows_of(&roster, Side::Computer);
    let selector = FrontlineTargeting::new();

    let from_left: Vec<_> = selector
        .suitable_targets(&rows, Side::Player.flank())
        .iter()
        .map(|unit| unit.name.clone())
        .collect();
    assert_eq!(from_left, vec!["c", "e"]);

    let from_right: Vec<_> = selector
        .suitable_targets(&rows, Side::Computer.flank())
        .iter()
        .map(|unit| unit.name.clone())
        .collect();
    assert_eq!(from_right, vec!["a", "d"]);
}

#[test]
fn killed_front_unit_is_replaced_by_its_neighbour() {
    let mut world = deployed_world();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::ResolveAttack {
            attacker: UnitId::new(0),
            target: UnitId::new(3),
        },
        &mut events,
    );

    let roster = query::roster(&world);
    let rows = rows_of(&roster, Side::Computer);
    let targets = FrontlineTargeting::new().suitable_targets(&rows, Side::Player.flank());

    assert_eq!(targets[0].name, "b");
}
