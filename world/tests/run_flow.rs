use std::time::Duration;

use swarm_td_core::{Archetype, Command, DefenseKind, Event, GameMode, PlacementError, Vec2};
use swarm_td_world::{self as world, query, World, WorldConfig};

fn start(config: WorldConfig) -> World {
    World::new(config, &mut Vec::new()).expect("config is valid")
}

fn place(world: &mut World, kind: DefenseKind, position: Vec2) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::PlaceDefense { kind, position }, &mut events);
    events
}

fn tick(world: &mut World, millis: u64) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(millis),
        },
        &mut events,
    );
    events
}

fn single_room() -> WorldConfig {
    let mut config = WorldConfig::default();
    config.balance.world.room_count = 1;
    config
}

#[test]
fn turret_limit_is_checked_before_funds() {
    let mut config = WorldConfig::default();
    config.balance.economy.starting_money = 1_000;
    let mut world = start(config);

    for column in 0..5 {
        let events = place(
            &mut world,
            DefenseKind::Turret,
            Vec2::new(100.0 + 50.0 * column as f32, 60.0),
        );
        assert!(matches!(events.as_slice(), [Event::DefensePlaced { .. }]));
    }
    let position = Vec2::new(100.0, 260.0);
    assert_eq!(
        place(&mut world, DefenseKind::Turret, position),
        vec![Event::PlacementRejected {
            kind: DefenseKind::Turret,
            position,
            reason: PlacementError::LimitReached,
        }]
    );
    assert_eq!(query::money(&world), 750);
    assert_eq!(query::defenses(&world).len(), 5);
}

#[test]
fn unaffordable_defense_is_refused() {
    let mut world = start(WorldConfig::default());
    for column in 0..3 {
        let _ = place(
            &mut world,
            DefenseKind::Turret,
            Vec2::new(100.0 + 50.0 * column as f32, 60.0),
        );
    }
    assert_eq!(query::money(&world), 0);

    let position = Vec2::new(300.0, 260.0);
    assert_eq!(
        place(&mut world, DefenseKind::Trap, position),
        vec![Event::PlacementRejected {
            kind: DefenseKind::Trap,
            position,
            reason: PlacementError::InsufficientFunds,
        }]
    );
}

#[test]
fn player_cannot_walk_through_a_built_wall() {
    let mut world = start(WorldConfig::default());
    let spawn = query::player(&world).position;
    let events = place(&mut world, DefenseKind::Wall, spawn + Vec2::new(48.0, 0.0));
    assert!(matches!(events.as_slice(), [Event::WallPlaced { .. }]));
    assert_eq!(query::walls(&world).len(), 1);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SteerPlayer {
            direction: Vec2::new(1.0, 0.0),
        },
        &mut events,
    );
    for _ in 0..50 {
        let _ = tick(&mut world, 20);
    }
    let player = query::player(&world);
    let wall = query::walls(&world)[0].1;
    assert!(player.hitbox.right() <= wall.left() + 1e-3);
}

#[test]
fn single_room_run_opens_the_portal_and_reaches_the_boss() {
    let mut world = start(single_room());

    let first = tick(&mut world, 20);
    assert!(first.contains(&Event::PortalOpened {
        position: Vec2::new(240.0, 160.0),
    }));
    assert_eq!(query::mode(&world), GameMode::Dungeon);

    let second = tick(&mut world, 20);
    assert!(second.contains(&Event::BossRoomEntered));
    assert!(second.contains(&Event::EnemySpawned {
        enemy: query::boss(&world).expect("boss spawned").id,
        archetype: Archetype::Boss,
        position: Vec2::new(320.0, 140.0),
    }));
    assert_eq!(query::mode(&world), GameMode::BossRoom);
    assert_eq!(query::player(&world).position, Vec2::new(320.0, 400.0));
    assert_eq!(query::portal(&world), None);
    assert_eq!(query::rooms(&world).len(), 1);
}

#[test]
fn defeating_the_boss_freezes_the_run() {
    let mut config = single_room();
    config.balance.player.damage = 1_000;
    config.balance.player.health = 100;
    let mut world = start(config);
    let _ = tick(&mut world, 20);
    let _ = tick(&mut world, 20);

    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::FirePlayerShot {
            toward: Vec2::new(320.0, 140.0),
        },
        &mut events,
    );
    for _ in 0..100 {
        events.extend(tick(&mut world, 20));
        if query::mode(&world) != GameMode::BossRoom {
            break;
        }
    }

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { archetype: Archetype::Boss, .. })));
    assert_eq!(events.last(), Some(&Event::Victory));
    assert_eq!(query::mode(&world), GameMode::Victory);

    assert!(tick(&mut world, 20).is_empty());
    let position = Vec2::new(100.0, 100.0);
    assert_eq!(
        place(&mut world, DefenseKind::Trap, position),
        vec![Event::PlacementRejected {
            kind: DefenseKind::Trap,
            position,
            reason: PlacementError::InvalidMode,
        }]
    );
}
