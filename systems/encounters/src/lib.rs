#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Room encounter lifecycle: spawning on entry, clear detection, loot and the boss portal.
//!
//! The system owns the loot pickups and the portal. Rooms carry their own
//! encounter flags, so the lifecycle survives as long as the dungeon graph
//! does. All randomness is drawn from the caller's generator in a fixed
//! order, which keeps runs reproducible for a given seed.

use std::time::Duration;

use rand::{seq::SliceRandom, Rng};
use swarm_td_core::{
    Arena, Archetype, Balance, Damageable, EnemyId, GameFlow, GridCoord, Rect, UpgradeKind, Vec2,
};
use swarm_td_system_dungeon::{DungeonGraph, Room};
use swarm_td_system_enemy_ai::{spawn_enemy, Enemy};
use tracing::{debug, info};

/// Upgrade lying on the floor of a cleared room.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pickup {
    upgrade: UpgradeKind,
    rect: Rect,
}

impl Pickup {
    /// Upgrade granted on collection.
    #[must_use]
    pub const fn upgrade(&self) -> UpgradeKind {
        self.upgrade
    }

    /// Collection area.
    #[must_use]
    pub const fn rect(&self) -> &Rect {
        &self.rect
    }
}

/// Side effects reported by the encounter system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EncounterAction {
    /// The player stepped into a room for the first time.
    RoomEntered {
        /// Room entered.
        room: GridCoord,
    },
    /// A room encounter produced an enemy.
    Spawned {
        /// Room owning the enemy.
        room: GridCoord,
        /// Handle of the new enemy.
        enemy: EnemyId,
        /// Behaviour family.
        archetype: Archetype,
        /// Spawn point.
        position: Vec2,
    },
    /// Every enemy of a room has been defeated.
    RoomCleared {
        /// Room cleared.
        room: GridCoord,
    },
    /// A cleared room dropped an upgrade.
    LootDropped {
        /// Upgrade carried by the pickup.
        upgrade: UpgradeKind,
        /// Centre of the pickup.
        position: Vec2,
    },
    /// The player picked up an upgrade.
    Collected {
        /// Upgrade to apply.
        upgrade: UpgradeKind,
    },
    /// Every non-start room is cleared and the boss portal appeared.
    PortalOpened {
        /// Centre of the portal.
        position: Vec2,
    },
    /// The player stepped into the portal.
    PortalEntered,
}

/// Read-only facts the encounter system needs for one tick.
#[derive(Clone, Copy, Debug)]
pub struct EncounterContext<'a> {
    /// Simulation time after the tick's clock advance.
    pub now: Duration,
    /// Player hitbox.
    pub player: Rect,
    /// Balance set of the run.
    pub balance: &'a Balance,
}

/// Encounter system holding the pickups and the portal of the current dungeon.
#[derive(Debug, Default)]
pub struct Encounters {
    pickups: Vec<Pickup>,
    portal: Option<Rect>,
}

impl Encounters {
    /// Creates the system for a fresh dungeon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upgrades waiting to be collected.
    #[must_use]
    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    /// Boss portal, once opened.
    #[must_use]
    pub const fn portal(&self) -> Option<&Rect> {
        self.portal.as_ref()
    }

    /// Runs the room lifecycle for one tick.
    ///
    /// The output buffer is cleared before being filled.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        graph: &mut DungeonGraph,
        enemies: &mut Arena<EnemyId, Enemy>,
        ctx: &EncounterContext<'_>,
        rng: &mut R,
        flow: &mut dyn GameFlow,
        out: &mut Vec<EncounterAction>,
    ) {
        out.clear();

        if let Some(coord) = graph.room_containing(ctx.player.center()) {
            if let Some(room) = graph.room_mut(coord) {
                if room.mark_visited() {
                    debug!(x = coord.x(), y = coord.y(), "room entered");
                    out.push(EncounterAction::RoomEntered { room: coord });
                }
                populate(room, enemies, ctx, rng, out);
            }
        }

        self.detect_clears(graph, enemies, ctx, rng, out);
        self.collect_pickups(&ctx.player, out);

        if let Some(portal) = self.portal {
            if portal.intersects(&ctx.player) {
                info!("player entered the boss portal");
                flow.request_boss_room();
                out.push(EncounterAction::PortalEntered);
                return;
            }
        }
        self.open_portal(graph, ctx, out);
    }

    /// Marks every visited room whose live roster is empty as cleared and rolls its loot.
    fn detect_clears<R: Rng + ?Sized>(
        &mut self,
        graph: &mut DungeonGraph,
        enemies: &Arena<EnemyId, Enemy>,
        ctx: &EncounterContext<'_>,
        rng: &mut R,
        out: &mut Vec<EncounterAction>,
    ) {
        let pending: Vec<GridCoord> = graph
            .rooms()
            .filter(|room| room.visited() && !room.cleared())
            .map(Room::grid_coord)
            .collect();

        for coord in pending {
            let Some(room) = graph.room_mut(coord) else {
                continue;
            };
            room.retain_enemies(|id| enemies.get(id).is_some_and(Enemy::is_alive));
            let settled = room.enemies_spawned() || room.spawn_points().is_empty();
            if !settled || !room.enemies().is_empty() {
                continue;
            }

            room.mark_cleared();
            info!(x = coord.x(), y = coord.y(), "room cleared");
            out.push(EncounterAction::RoomCleared { room: coord });

            if room.loot_spawned() {
                continue;
            }
            room.mark_loot_spawned();
            if let Some(pickup) = roll_loot(room, ctx, rng) {
                debug!(upgrade = ?pickup.upgrade, "loot dropped");
                out.push(EncounterAction::LootDropped {
                    upgrade: pickup.upgrade,
                    position: pickup.rect.center(),
                });
                self.pickups.push(pickup);
            }
        }
    }

    fn collect_pickups(&mut self, player: &Rect, out: &mut Vec<EncounterAction>) {
        self.pickups.retain(|pickup| {
            if pickup.rect.intersects(player) {
                out.push(EncounterAction::Collected {
                    upgrade: pickup.upgrade,
                });
                false
            } else {
                true
            }
        });
    }

    /// Opens the portal at the start room's player spawn once every other room is cleared.
    fn open_portal(
        &mut self,
        graph: &DungeonGraph,
        ctx: &EncounterContext<'_>,
        out: &mut Vec<EncounterAction>,
    ) {
        if self.portal.is_some() {
            return;
        }
        if !graph.rooms().filter(|room| !room.is_start()).all(Room::cleared) {
            return;
        }
        let Some(start) = graph.start_room() else {
            return;
        };
        let position = start.player_spawn();
        let size = ctx.balance.encounters.portal_size;
        self.portal = Some(Rect::from_center(position, Vec2::splat(size)));
        info!(x = position.x, y = position.y, "boss portal opened");
        out.push(EncounterAction::PortalOpened { position });
    }
}

/// Spawns the room's encounter the first time the player stands in it.
fn populate<R: Rng + ?Sized>(
    room: &mut Room,
    enemies: &mut Arena<EnemyId, Enemy>,
    ctx: &EncounterContext<'_>,
    rng: &mut R,
    out: &mut Vec<EncounterAction>,
) {
    if room.enemies_spawned() || room.spawn_points().is_empty() {
        return;
    }

    let tuning = &ctx.balance.encounters;
    let count = rng.gen_range(tuning.min_enemies..=tuning.max_enemies);
    let coord = room.grid_coord();
    let mut roster = Vec::new();
    for _ in 0..count {
        let archetype = Archetype::REGULAR[rng.gen_range(0..Archetype::REGULAR.len())];
        let points = room.spawn_points();
        let position = points[rng.gen_range(0..points.len())];
        let Some(enemy) = spawn_enemy(enemies, archetype, position, ctx.now, ctx.balance) else {
            continue;
        };
        roster.push(enemy);
        out.push(EncounterAction::Spawned {
            room: coord,
            enemy,
            archetype,
            position,
        });
    }
    debug!(x = coord.x(), y = coord.y(), spawned = roster.len(), "room populated");
    room.record_spawn(roster);
}

/// Rolls the drop chance and, on success, a weighted upgrade placed away from the player.
///
/// The drop point is a random spawn point; when it lies too close to the
/// player a second point is drawn and kept regardless of its distance. Rooms
/// without spawn points drop at their centre.
fn roll_loot<R: Rng + ?Sized>(
    room: &Room,
    ctx: &EncounterContext<'_>,
    rng: &mut R,
) -> Option<Pickup> {
    let tuning = &ctx.balance.encounters;
    if !rng.gen_bool(tuning.loot_drop_chance) {
        return None;
    }
    let upgrade = ctx
        .balance
        .upgrades
        .weights
        .choose_weighted(rng, |entry| entry.weight)
        .ok()?
        .kind;

    let points = room.spawn_points();
    let position = if points.is_empty() {
        room.bounds().center()
    } else {
        let player = ctx.player.center();
        let first = points[rng.gen_range(0..points.len())];
        if first.distance(player) < tuning.loot_min_distance {
            points[rng.gen_range(0..points.len())]
        } else {
            first
        }
    };

    Some(Pickup {
        upgrade,
        rect: Rect::from_center(position, Vec2::splat(tuning.pickup_size)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use swarm_td_system_dungeon::TemplateCatalog;

    #[derive(Default)]
    struct Flow {
        boss_requests: usize,
    }

    impl GameFlow for Flow {
        fn declare_victory(&mut self) {}

        fn request_boss_room(&mut self) {
            self.boss_requests += 1;
        }
    }

    #[test]
    fn lone_start_room_opens_portal_immediately_and_only_once() {
        let catalog = TemplateCatalog::builtin();
        let balance = Balance::default();
        let mut graph = DungeonGraph::single(&catalog.start, balance.world.tile_size);
        let mut enemies = Arena::new();
        let mut encounters = Encounters::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut flow = Flow::default();
        let mut out = Vec::new();
        let away = Rect::from_center(Vec2::new(40.0, 40.0), Vec2::new(24.0, 32.0));
        let ctx = EncounterContext {
            now: Duration::ZERO,
            player: away,
            balance: &balance,
        };

        encounters.update(&mut graph, &mut enemies, &ctx, &mut rng, &mut flow, &mut out);
        assert!(out.contains(&EncounterAction::PortalOpened {
            position: Vec2::new(240.0, 160.0)
        }));

        encounters.update(&mut graph, &mut enemies, &ctx, &mut rng, &mut flow, &mut out);
        assert!(!out
            .iter()
            .any(|action| matches!(action, EncounterAction::PortalOpened { .. })));
        assert_eq!(flow.boss_requests, 0);
    }

    #[test]
    fn pickups_are_collected_on_overlap() {
        let mut encounters = Encounters::new();
        encounters.pickups.push(Pickup {
            upgrade: UpgradeKind::Money,
            rect: Rect::from_center(Vec2::new(100.0, 100.0), Vec2::splat(30.0)),
        });
        let mut out = Vec::new();

        encounters.collect_pickups(&Rect::from_center(Vec2::ZERO, Vec2::splat(20.0)), &mut out);
        assert!(out.is_empty());

        encounters.collect_pickups(
            &Rect::from_center(Vec2::new(110.0, 100.0), Vec2::splat(20.0)),
            &mut out,
        );
        assert_eq!(
            out,
            vec![EncounterAction::Collected {
                upgrade: UpgradeKind::Money
            }]
        );
        assert!(encounters.pickups().is_empty());
    }
}
