use std::collections::{BTreeSet, VecDeque};

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use swarm_td_core::{ColliderTag, GridCoord, Side, Vec2};
use swarm_td_system_dungeon::{
    DoorMask, DungeonGenerator, DungeonGraph, RoomTemplate, TemplateCatalog,
};

const TILE: f32 = 16.0;

fn template(id: &str, width: u32, height: u32, doors: DoorMask) -> RoomTemplate {
    RoomTemplate {
        id: id.to_owned(),
        width,
        height,
        doors,
        player_spawn: Vec2::new(8.0, 8.0),
        spawn_points: Vec::new(),
        obstacles: Vec::new(),
    }
}

#[test]
fn single_right_door_places_matching_neighbor_flush() {
    let start = template("start", 30, 20, DoorMask::NONE.with(Side::Right));
    let pool = vec![
        template("a", 30, 20, DoorMask::NONE.with(Side::Left)),
        template("b", 30, 20, DoorMask::NONE.with(Side::Left).with(Side::Top)),
        template("c", 30, 20, DoorMask::ALL),
    ];
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    let graph = DungeonGenerator::new().generate(&start, &pool, 2, TILE, &mut rng);

    assert_eq!(graph.len(), 2);
    let second = graph.room(GridCoord::new(1, 0)).expect("right neighbour placed");
    assert_eq!(second.origin(), Vec2::new(30.0 * TILE, 0.0));
    assert!(graph.connected(GridCoord::new(0, 0), Side::Right));
    assert!(graph.is_connected());
}

#[test]
fn expansion_stops_when_doors_run_out() {
    let start = template("start", 10, 10, DoorMask::NONE.with(Side::Bottom));
    let pool = vec![template("dead-end", 10, 10, DoorMask::NONE.with(Side::Top))];
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let graph = DungeonGenerator::new().generate(&start, &pool, 5, TILE, &mut rng);

    assert_eq!(graph.len(), 2);
    assert_eq!(
        graph.position(GridCoord::new(0, 1)),
        Some(Vec2::new(0.0, 10.0 * TILE))
    );
}

#[test]
fn doorway_without_a_matching_template_is_sealed() {
    let start = template("start", 10, 10, DoorMask::NONE.with(Side::Right));
    let pool = vec![template("walled-off", 10, 10, DoorMask::ALL.without(Side::Left))];
    let mut rng = ChaCha8Rng::seed_from_u64(5);

    let graph = DungeonGenerator::new().generate(&start, &pool, 3, TILE, &mut rng);

    assert_eq!(graph.len(), 1);
    assert!(graph.is_connected());
    assert_eq!(graph.closed_doors().len(), 4);
    assert!(graph
        .seal_colliders(TILE)
        .iter()
        .any(|seal| seal.tag() == ColliderTag::DoorSeal(Side::Right)));
}

#[test]
fn unmatched_doorways_do_not_block_matching_ones() {
    let start = template(
        "start",
        10,
        10,
        DoorMask::NONE.with(Side::Right).with(Side::Bottom),
    );
    let pool = vec![template("corridor", 10, 10, DoorMask::NONE.with(Side::Top))];

    for seed in 0..8 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph = DungeonGenerator::new().generate(&start, &pool, 4, TILE, &mut rng);

        assert_eq!(graph.len(), 2, "seed {seed}");
        assert!(graph.room(GridCoord::new(0, 1)).is_some(), "seed {seed}");
        assert!(graph.room(GridCoord::new(1, 0)).is_none(), "seed {seed}");
        assert!(graph.is_connected(), "seed {seed}");
    }
}

#[test]
fn fully_open_templates_reach_the_room_limit() {
    let catalog = TemplateCatalog::builtin();
    for seed in 0..16 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let graph =
            DungeonGenerator::new().generate(&catalog.start, &catalog.rooms, 5, TILE, &mut rng);
        assert_eq!(graph.len(), 5, "seed {seed}");
        assert!(graph.is_connected(), "seed {seed}");
        assert_eq!(graph.rooms().filter(|room| room.is_start()).count(), 1);
    }
}

#[test]
fn same_seed_yields_same_map() {
    let catalog = TemplateCatalog::builtin();
    let mut first = ChaCha8Rng::seed_from_u64(42);
    let mut second = ChaCha8Rng::seed_from_u64(42);
    let a = DungeonGenerator::new().generate(&catalog.start, &catalog.rooms, 7, TILE, &mut first);
    let b = DungeonGenerator::new().generate(&catalog.start, &catalog.rooms, 7, TILE, &mut second);
    assert_eq!(a, b);
}

#[test]
fn isolated_start_room_is_sealed_on_every_side() {
    let start = template("start", 10, 8, DoorMask::NONE);
    let graph = DungeonGenerator::new().generate(
        &start,
        &[template("x", 10, 8, DoorMask::ALL)],
        5,
        TILE,
        &mut ChaCha8Rng::seed_from_u64(3),
    );
    let seals = graph.seal_colliders(TILE);
    assert_eq!(graph.len(), 1);
    assert_eq!(seals.len(), 4);
    let top = seals
        .iter()
        .find(|seal| seal.tag() == ColliderTag::DoorSeal(Side::Top))
        .expect("top seal");
    assert_eq!(top.rect().width(), 160.0);
    assert_eq!(top.rect().height(), TILE);
}

fn mask_strategy() -> impl Strategy<Value = DoorMask> {
    (0_u8..16).prop_map(|bits| {
        Side::ALL
            .into_iter()
            .enumerate()
            .filter(|(index, _)| bits & (1 << index) != 0)
            .fold(DoorMask::NONE, |mask, (_, side)| mask.with(side))
    })
}

/// Rooms a single-template pool can reach from the start room, capped at `max_rooms`.
///
/// A neighbour is reachable when the current room has a door towards it and
/// the pool template has the door facing back.
fn reachable_rooms(start: DoorMask, pool: DoorMask, max_rooms: usize) -> usize {
    let origin = GridCoord::new(0, 0);
    let mut reached = BTreeSet::from([origin]);
    let mut frontier = VecDeque::from([origin]);
    while let Some(coord) = frontier.pop_front() {
        let doors = if coord == origin { start } else { pool };
        for side in doors.sides() {
            let next = coord.neighbor(side);
            if pool.contains(side.opposite()) && reached.insert(next) {
                if reached.len() >= max_rooms {
                    return max_rooms;
                }
                frontier.push_back(next);
            }
        }
    }
    reached.len().min(max_rooms)
}

fn assert_sealed(graph: &DungeonGraph) -> Result<(), TestCaseError> {
    let seals = graph.seal_colliders(TILE);
    for (coord, side) in graph.closed_doors() {
        let room = graph.room(coord).expect("closed door belongs to a placed room");
        let sealed = seals.iter().any(|seal| {
            seal.tag() == ColliderTag::DoorSeal(side) && seal.rect().intersects(room.bounds())
        });
        prop_assert!(sealed);
    }
    Ok(())
}

proptest! {
    #[test]
    fn single_template_maps_fill_every_reachable_cell(
        start_doors in mask_strategy(),
        pool_doors in mask_strategy(),
        max_rooms in 1_usize..12,
        seed in any::<u64>(),
    ) {
        let start = template("start", 12, 12, start_doors);
        let pool = vec![template("room", 12, 12, pool_doors)];
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let graph = DungeonGenerator::new().generate(&start, &pool, max_rooms, TILE, &mut rng);

        prop_assert_eq!(graph.len(), reachable_rooms(start_doors, pool_doors, max_rooms));
        prop_assert!(graph.is_connected());
        assert_sealed(&graph)?;
    }

    #[test]
    fn mixed_pools_expand_until_full_or_exhausted(
        start_doors in mask_strategy(),
        pool_doors in prop::collection::vec(mask_strategy(), 1..6),
        max_rooms in 1_usize..10,
        seed in any::<u64>(),
    ) {
        let pool: Vec<RoomTemplate> = pool_doors
            .iter()
            .enumerate()
            .map(|(index, doors)| template(&format!("t{index}"), 12, 12, *doors))
            .collect();
        let start = template("start", 12, 12, start_doors);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let graph = DungeonGenerator::new().generate(&start, &pool, max_rooms, TILE, &mut rng);

        prop_assert!(graph.len() <= max_rooms);
        prop_assert!(graph.is_connected());
        if graph.len() < max_rooms {
            // Every remaining open door faces a placed room or a doorway no
            // template can answer.
            for room in graph.rooms() {
                for side in room.doors().sides() {
                    let target = room.grid_coord().neighbor(side);
                    let answerable = pool_doors.iter().any(|doors| doors.contains(side.opposite()));
                    prop_assert!(graph.room(target).is_some() || !answerable);
                }
            }
        }
        assert_sealed(&graph)?;
    }
}
