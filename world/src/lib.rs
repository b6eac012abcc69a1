#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Swarm TD.
//!
//! The world owns every entity table and runs the systems in a fixed order
//! each tick: clock, player, projectiles, enemies, defenses, room lifecycle,
//! then deferred removals. Adapters drive it exclusively through [`apply`] and
//! read it through the [`query`] functions.

mod economy;
mod player;
mod projectiles;
mod walls;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use swarm_td_core::{
    balance::BalanceError, normalize_or, Arena, Archetype, Balance, ColliderTag, Command,
    Damageable, DefenseId, DefenseKind, EconomySink, EnemyId, Event, GameFlow, GameMode,
    HitOutcome, PlacementError, ProjectileId, ProjectileKind, Rect, RoomRegistry, StaticCollider,
    UpgradeKind, Vec2, WallId, FALLBACK_DIRECTION, WELCOME_BANNER,
};
use swarm_td_system_collision::{first_hit, HitRefinement, RectangleHits};
use swarm_td_system_defenses::{
    check_capacity, BarbedWire, Bomb, Defense, DefenseAction, DefenseContext, Defenses, Trap,
    Turret,
};
use swarm_td_system_dungeon::{CatalogError, DungeonGenerator, DungeonGraph, TemplateCatalog};
use swarm_td_system_encounters::{EncounterAction, EncounterContext, Encounters};
use swarm_td_system_enemy_ai::{spawn_enemy, strike, AiAction, AiContext, Enemy, EnemyAi, Removal};
use thiserror::Error;
use tracing::{debug, info, warn};

use economy::{Economy, RunFlow};
use player::Player;
use projectiles::Projectile;
use walls::WallRegistry;

/// Everything needed to start a run.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Balance constants.
    pub balance: Balance,
    /// Room templates used by the generator and the boss transition.
    pub catalog: TemplateCatalog,
    /// Seed of the run's random generator.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            balance: Balance::default(),
            catalog: TemplateCatalog::builtin(),
            seed: 0,
        }
    }
}

/// Configuration problems detected while building a world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The balance set is inconsistent.
    #[error("invalid balance set")]
    Balance(#[from] BalanceError),
    /// The room template catalog is unusable.
    #[error("invalid room catalog")]
    Catalog(#[from] CatalogError),
}

/// Represents the authoritative Swarm TD world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    balance: Balance,
    catalog: TemplateCatalog,
    rng: ChaCha8Rng,
    clock: Duration,
    mode: GameMode,
    dungeon: DungeonGraph,
    colliders: Vec<StaticCollider>,
    player: Player,
    enemies: Arena<EnemyId, Enemy>,
    projectiles: Arena<ProjectileId, Projectile>,
    defenses: Arena<DefenseId, Defense>,
    walls: WallRegistry,
    economy: Economy,
    flow: RunFlow,
    enemy_ai: EnemyAi,
    defense_system: Defenses,
    encounters: Encounters,
    refinement: Box<dyn HitRefinement>,
    ai_actions: Vec<AiAction>,
    defense_actions: Vec<DefenseAction>,
    encounter_actions: Vec<EncounterAction>,
    doomed_enemies: Vec<EnemyId>,
    doomed_defenses: Vec<DefenseId>,
    doomed_projectiles: Vec<ProjectileId>,
}

impl World {
    /// Validates the configuration, generates the dungeon and places the player
    /// on the start room's spawn point.
    pub fn new(config: WorldConfig, out_events: &mut Vec<Event>) -> Result<Self, WorldError> {
        let WorldConfig {
            balance,
            catalog,
            seed,
        } = config;
        balance.validate()?;
        catalog.validate(balance.world.tile_size)?;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let dungeon = DungeonGenerator::new().generate(
            &catalog.start,
            &catalog.rooms,
            balance.world.room_count,
            balance.world.tile_size,
            &mut rng,
        );
        let colliders = dungeon.static_colliders(balance.world.seal_thickness);
        let sealed_sides = dungeon.closed_doors().len();
        info!(seed, rooms = dungeon.len(), sealed_sides, "dungeon generated");
        out_events.push(Event::DungeonGenerated {
            rooms: dungeon.len(),
            sealed_sides,
        });

        let spawn = dungeon
            .start_room()
            .map_or(catalog.start.player_spawn, |room| room.player_spawn());

        Ok(Self {
            banner: WELCOME_BANNER,
            player: Player::new(spawn, &balance),
            economy: Economy::new(balance.economy.starting_money),
            balance,
            catalog,
            rng,
            clock: Duration::ZERO,
            mode: GameMode::Dungeon,
            dungeon,
            colliders,
            enemies: Arena::new(),
            projectiles: Arena::new(),
            defenses: Arena::new(),
            walls: WallRegistry::new(),
            flow: RunFlow::default(),
            enemy_ai: EnemyAi::new(),
            defense_system: Defenses::new(),
            encounters: Encounters::new(),
            refinement: Box::new(RectangleHits),
            ai_actions: Vec::new(),
            defense_actions: Vec::new(),
            encounter_actions: Vec::new(),
            doomed_enemies: Vec::new(),
            doomed_defenses: Vec::new(),
            doomed_projectiles: Vec::new(),
        })
    }

    /// Replaces the second-stage projectile hit test.
    pub fn set_hit_refinement(&mut self, refinement: Box<dyn HitRefinement>) {
        self.refinement = refinement;
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.mode.is_playable() {
            return;
        }
        self.clock += dt;
        out_events.push(Event::TimeAdvanced { dt });

        self.player.advance(dt, &self.colliders);
        self.update_projectiles(dt, out_events);
        self.update_enemies(dt, out_events);
        self.update_defenses(dt, out_events);
        if self.mode == GameMode::Dungeon {
            self.update_encounters(out_events);
        }
        self.remove_doomed(out_events);
        self.resolve_flow(out_events);
    }

    fn update_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.doomed_projectiles.clear();
        let now = self.clock;
        for (id, projectile) in self.projectiles.iter_mut() {
            projectile.advance(dt, &self.colliders);
            if projectile.expired(now) {
                self.doomed_projectiles.push(id);
                continue;
            }

            if projectile.kind().is_hostile() {
                if projectile.hitbox().intersects(self.player.hitbox()) {
                    damage_player(
                        &mut self.player,
                        &mut self.mode,
                        projectile.damage(),
                        now,
                        out_events,
                    );
                    self.doomed_projectiles.push(id);
                }
                continue;
            }

            let candidates = self
                .enemies
                .iter()
                .filter(|(_, enemy)| enemy.is_alive())
                .map(|(enemy_id, enemy)| (enemy_id, *enemy.render_rect()));
            let Some(target) = first_hit(projectile.hitbox(), candidates, &*self.refinement)
            else {
                continue;
            };
            hit_enemy(
                &mut self.enemies,
                &mut self.economy,
                &mut self.dungeon,
                target,
                projectile.damage(),
                now,
                out_events,
            );
            self.doomed_projectiles.push(id);
        }
        for id in self.doomed_projectiles.drain(..) {
            let _ = self.projectiles.remove(id);
        }
    }

    fn update_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let ctx = AiContext {
            now: self.clock,
            dt,
            player: *self.player.hitbox(),
            colliders: &self.colliders,
            balance: &self.balance,
        };
        self.enemy_ai
            .update(&mut self.enemies, &ctx, &mut self.ai_actions);

        let mut actions = std::mem::take(&mut self.ai_actions);
        for action in actions.drain(..) {
            match action {
                AiAction::Fire {
                    kind,
                    origin,
                    direction,
                    ..
                } => {
                    let damage = match kind {
                        ProjectileKind::Rock => self.balance.boss.rock_damage,
                        _ => self.balance.skeleton.bone_damage,
                    };
                    self.launch(kind, origin, direction, damage, out_events);
                }
                AiAction::DamagePlayer { amount, .. } => {
                    damage_player(&mut self.player, &mut self.mode, amount, self.clock, out_events);
                }
                AiAction::Victory { .. } => self.flow.declare_victory(),
                AiAction::PhaseChanged { enemy, phase } => {
                    out_events.push(Event::BossPhaseChanged { enemy, phase });
                }
                AiAction::StateChanged { enemy, state } => {
                    out_events.push(Event::BossStateChanged { enemy, state });
                }
                AiAction::Remove { enemy, reason } => {
                    if reason == Removal::Despawned {
                        debug!(enemy = enemy.get(), "enemy despawned");
                    }
                    self.doomed_enemies.push(enemy);
                }
            }
        }
        self.ai_actions = actions;
    }

    fn update_defenses(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let ctx = DefenseContext {
            now: self.clock,
            dt,
            colliders: &self.colliders,
            balance: &self.balance,
        };
        self.defense_system.update(
            &mut self.defenses,
            &mut self.enemies,
            &ctx,
            &mut self.defense_actions,
        );

        let mut actions = std::mem::take(&mut self.defense_actions);
        for action in actions.drain(..) {
            match action {
                DefenseAction::Hit { enemy, amount, .. } => hit_enemy(
                    &mut self.enemies,
                    &mut self.economy,
                    &mut self.dungeon,
                    enemy,
                    amount,
                    self.clock,
                    out_events,
                ),
                DefenseAction::Fire {
                    origin, direction, ..
                } => {
                    let damage = self.balance.turret.damage;
                    let kind = ProjectileKind::TurretBullet;
                    self.launch(kind, origin, direction, damage, out_events);
                }
                DefenseAction::Triggered { defense } => {
                    out_events.push(Event::TrapTriggered { defense });
                }
                DefenseAction::Exploded {
                    defense,
                    position,
                    hits,
                } => out_events.push(Event::BombExploded {
                    defense,
                    position,
                    hits,
                }),
                DefenseAction::Expired { defense } => self.doomed_defenses.push(defense),
            }
        }
        self.defense_actions = actions;
    }

    fn update_encounters(&mut self, out_events: &mut Vec<Event>) {
        let ctx = EncounterContext {
            now: self.clock,
            player: *self.player.hitbox(),
            balance: &self.balance,
        };
        self.encounters.update(
            &mut self.dungeon,
            &mut self.enemies,
            &ctx,
            &mut self.rng,
            &mut self.flow,
            &mut self.encounter_actions,
        );

        let mut actions = std::mem::take(&mut self.encounter_actions);
        for action in actions.drain(..) {
            match action {
                EncounterAction::RoomEntered { room } => {
                    out_events.push(Event::RoomEntered { room });
                }
                EncounterAction::Spawned {
                    enemy,
                    archetype,
                    position,
                    ..
                } => out_events.push(Event::EnemySpawned {
                    enemy,
                    archetype,
                    position,
                }),
                EncounterAction::RoomCleared { room } => {
                    out_events.push(Event::RoomCleared { room });
                }
                EncounterAction::LootDropped { upgrade, position } => {
                    out_events.push(Event::LootDropped { upgrade, position });
                }
                EncounterAction::Collected { upgrade } => self.collect(upgrade, out_events),
                EncounterAction::PortalOpened { position } => {
                    out_events.push(Event::PortalOpened { position });
                }
                EncounterAction::PortalEntered => debug!("portal entered"),
            }
        }
        self.encounter_actions = actions;
    }

    fn remove_doomed(&mut self, out_events: &mut Vec<Event>) {
        for enemy in self.doomed_enemies.drain(..) {
            if self.enemies.remove(enemy).is_some() {
                self.dungeon.release_enemy(enemy);
                out_events.push(Event::EnemyRemoved { enemy });
            }
        }
        for defense in self.doomed_defenses.drain(..) {
            if let Some(removed) = self.defenses.remove(defense) {
                out_events.push(Event::DefenseExpired {
                    defense,
                    kind: removed.kind(),
                });
            }
        }
    }

    fn resolve_flow(&mut self, out_events: &mut Vec<Event>) {
        if self.flow.take_victory() && self.mode.is_playable() {
            self.mode = GameMode::Victory;
            info!(kills = self.economy.kills(), "boss defeated");
            out_events.push(Event::Victory);
            return;
        }
        if self.flow.take_boss_room() && self.mode == GameMode::Dungeon {
            self.enter_boss_room(out_events);
        }
    }

    /// Tears down every entity group and rebuilds the world around the boss arena.
    fn enter_boss_room(&mut self, out_events: &mut Vec<Event>) {
        self.enemies.clear();
        self.projectiles.clear();
        self.defenses.clear();
        self.walls.clear();
        self.encounters = Encounters::new();

        let tile = self.balance.world.tile_size;
        self.dungeon = DungeonGraph::single(&self.catalog.boss, tile);
        self.colliders = self.dungeon.static_colliders(self.balance.world.seal_thickness);
        if let Some(room) = self.dungeon.start_room() {
            self.player.place_at(room.player_spawn());
        }
        self.mode = GameMode::BossRoom;
        info!("entered the boss arena");
        out_events.push(Event::BossRoomEntered);

        let Some(spawn) = self.catalog.boss_spawn() else {
            return;
        };
        if let Some(enemy) =
            spawn_enemy(&mut self.enemies, Archetype::Boss, spawn, self.clock, &self.balance)
        {
            out_events.push(Event::EnemySpawned {
                enemy,
                archetype: Archetype::Boss,
                position: spawn,
            });
        }
    }

    fn launch(
        &mut self,
        kind: ProjectileKind,
        origin: Vec2,
        direction: Vec2,
        damage: i32,
        out_events: &mut Vec<Event>,
    ) {
        let projectile = self.projectiles.insert(Projectile::launch(
            kind,
            origin,
            direction,
            damage,
            self.clock,
            &self.balance,
        ));
        out_events.push(Event::ProjectileFired {
            projectile,
            kind,
            origin,
            direction,
        });
    }

    fn fire_player_shot(&mut self, toward: Vec2, out_events: &mut Vec<Event>) {
        if !self.mode.is_playable() || !self.player.try_fire(self.clock) {
            return;
        }
        let origin = self.player.center();
        let direction = normalize_or(toward - origin, FALLBACK_DIRECTION);
        let damage = self.player.damage();
        self.launch(ProjectileKind::PlayerBullet, origin, direction, damage, out_events);
    }

    fn place_defense(&mut self, kind: DefenseKind, position: Vec2, out_events: &mut Vec<Event>) {
        if let Err(reason) = self.try_place(kind, position, out_events) {
            warn!(?kind, ?reason, x = position.x, y = position.y, "placement refused");
            out_events.push(Event::PlacementRejected {
                kind,
                position,
                reason,
            });
        }
    }

    fn try_place(
        &mut self,
        kind: DefenseKind,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if !self.mode.is_playable() {
            return Err(PlacementError::InvalidMode);
        }
        if kind == DefenseKind::Wall {
            return self.place_wall(position, out_events);
        }

        check_capacity(kind, &self.defenses, &self.balance)?;
        if !self.economy.try_spend(kind.cost(&self.balance)) {
            return Err(PlacementError::InsufficientFunds);
        }

        let now = self.clock;
        let defense = match kind {
            DefenseKind::Turret => Defense::Turret(Turret::new(
                position,
                self.player.turret_range(),
                now,
                &self.balance.turret,
            )),
            DefenseKind::Trap => Defense::Trap(Trap::new(position, &self.balance.trap)),
            DefenseKind::BarbedWire => {
                Defense::BarbedWire(BarbedWire::new(position, &self.balance.wire))
            }
            DefenseKind::Bomb => Defense::Bomb(Bomb::new(
                self.player.center(),
                position,
                now,
                &self.balance.bomb,
            )),
            DefenseKind::Wall => return Err(PlacementError::InvalidMode),
        };
        let defense = self.defenses.insert(defense);
        debug!(defense = defense.get(), ?kind, "defense placed");
        out_events.push(Event::DefensePlaced {
            defense,
            kind,
            position,
        });
        Ok(())
    }

    fn place_wall(
        &mut self,
        position: Vec2,
        out_events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        let tuning = &self.balance.wall;
        let rect = Rect::from_center(position, Vec2::new(tuning.width, tuning.height));
        let blocked = rect.intersects(self.player.hitbox())
            || self
                .colliders
                .iter()
                .any(|collider| collider.rect().intersects(&rect));
        if blocked {
            return Err(PlacementError::Obstructed);
        }
        if !self.economy.try_spend(tuning.cost) {
            return Err(PlacementError::InsufficientFunds);
        }

        let wall = self.walls.insert(rect);
        self.colliders
            .push(StaticCollider::new(rect, ColliderTag::Buildable(wall)));
        debug!(wall = wall.get(), "wall placed");
        out_events.push(Event::WallPlaced { wall, rect });
        Ok(())
    }

    fn remove_wall(&mut self, wall: WallId, out_events: &mut Vec<Event>) {
        if !self.mode.is_playable() || self.walls.remove(wall).is_none() {
            out_events.push(Event::WallRemovalRejected { wall });
            return;
        }
        self.colliders
            .retain(|collider| collider.tag() != ColliderTag::Buildable(wall));
        let tuning = &self.balance.wall;
        let refund = (tuning.cost as f32 * tuning.refund_ratio) as u32;
        self.economy.refund(refund);
        out_events.push(Event::WallRemoved { wall, refund });
    }

    fn collect(&mut self, upgrade: UpgradeKind, out_events: &mut Vec<Event>) {
        if upgrade == UpgradeKind::Money {
            self.economy.grant(self.balance.upgrades.money_bonus);
        } else {
            self.player.apply_upgrade(upgrade, &self.balance);
        }
        debug!(?upgrade, "upgrade collected");
        out_events.push(Event::UpgradeCollected { upgrade });
    }
}

/// Applies one hit to an enemy and reports the outcome.
fn hit_enemy(
    enemies: &mut Arena<EnemyId, Enemy>,
    economy: &mut Economy,
    rooms: &mut DungeonGraph,
    id: EnemyId,
    amount: i32,
    now: Duration,
    out_events: &mut Vec<Event>,
) {
    let Some(enemy) = enemies.get_mut(id) else {
        return;
    };
    match strike(id, enemy, amount, now, economy, rooms) {
        HitOutcome::Ignored => {}
        HitOutcome::Wounded { remaining } => out_events.push(Event::EnemyDamaged {
            enemy: id,
            amount,
            remaining,
        }),
        HitOutcome::Killed => out_events.push(Event::EnemyKilled {
            enemy: id,
            archetype: enemy.archetype(),
            reward: enemy.kill_reward(),
        }),
    }
}

/// Applies damage to the player, ending the run when health runs out.
fn damage_player(
    player: &mut Player,
    mode: &mut GameMode,
    amount: i32,
    now: Duration,
    out_events: &mut Vec<Event>,
) {
    match player.take_hit(amount, now) {
        HitOutcome::Ignored => {}
        HitOutcome::Wounded { remaining } => {
            out_events.push(Event::PlayerDamaged { amount, remaining });
        }
        HitOutcome::Killed => {
            out_events.push(Event::PlayerDamaged {
                amount,
                remaining: player.health(),
            });
            out_events.push(Event::PlayerDefeated);
            *mode = GameMode::GameOver;
            info!("player defeated");
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SteerPlayer { direction } => world.player.steer(direction),
        Command::FirePlayerShot { toward } => world.fire_player_shot(toward, out_events),
        Command::PlaceDefense { kind, position } => world.place_defense(kind, position, out_events),
        Command::RemoveWall { wall } => world.remove_wall(wall, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use swarm_td_core::{
        Archetype, BossPhase, BossState, Damageable, DefenseId, DefenseKind, EnemyId, Facing,
        GameMode, GridCoord, ProjectileId, ProjectileKind, Rect, StaticCollider, UpgradeKind,
        Vec2, WallId,
    };
    use swarm_td_system_defenses::Defense;

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the run.
    #[must_use]
    pub fn mode(world: &World) -> GameMode {
        world.mode
    }

    /// Simulation time elapsed since the run started.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Money available for building.
    #[must_use]
    pub fn money(world: &World) -> u32 {
        world.economy.money()
    }

    /// Enemies killed so far.
    #[must_use]
    pub fn kills(world: &World) -> u32 {
        world.economy.kills()
    }

    /// Static colliders of the current map, including player-built walls.
    #[must_use]
    pub fn colliders(world: &World) -> &[StaticCollider] {
        &world.colliders
    }

    /// Player-built walls in identifier order.
    #[must_use]
    pub fn walls(world: &World) -> Vec<(WallId, Rect)> {
        world.walls.iter().map(|(id, rect)| (id, *rect)).collect()
    }

    /// Snapshot of the player avatar.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        let player = &world.player;
        PlayerSnapshot {
            position: player.center(),
            hitbox: *player.hitbox(),
            render_rect: *player.render_rect(),
            health: player.health(),
            max_health: player.max_health(),
            damage: player.damage(),
            speed: player.speed(),
            fire_interval: player.fire_interval(),
            turret_range: player.turret_range(),
        }
    }

    /// Snapshots of every enemy in roster order, corpses included.
    #[must_use]
    pub fn enemies(world: &World) -> Vec<EnemySnapshot> {
        world
            .enemies
            .iter()
            .map(|(id, enemy)| EnemySnapshot {
                id,
                archetype: enemy.archetype(),
                position: enemy.center(),
                hitbox: *enemy.hitbox(),
                render_rect: *enemy.render_rect(),
                health: enemy.health(),
                max_health: enemy.max_health(),
                facing: enemy.facing(),
                speed: enemy.speed(),
                flashing: enemy.is_flashing(world.clock),
                alive: enemy.is_alive(),
            })
            .collect()
    }

    /// Status of the boss, when one is present.
    #[must_use]
    pub fn boss(world: &World) -> Option<BossStatus> {
        world.enemies.iter().find_map(|(id, enemy)| {
            let brain = enemy.boss()?;
            let health_ratio = if enemy.max_health() > 0 {
                enemy.health().max(0) as f32 / enemy.max_health() as f32
            } else {
                0.0
            };
            Some(BossStatus {
                id,
                phase: brain.phase(),
                state: brain.state(),
                cone_visible: brain.shows_cone(),
                health_ratio,
                animation_progress: brain.animation_progress(&world.balance.boss),
            })
        })
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles
            .iter()
            .map(|(id, projectile)| ProjectileSnapshot {
                id,
                kind: projectile.kind(),
                hitbox: *projectile.hitbox(),
                direction: projectile.direction(),
            })
            .collect()
    }

    /// Defenses in placement order.
    #[must_use]
    pub fn defenses(world: &World) -> Vec<DefenseSnapshot> {
        world
            .defenses
            .iter()
            .map(|(id, defense)| {
                let (turret_angle, trap_progress) = match defense {
                    Defense::Turret(turret) => (Some(turret.facing_angle()), None),
                    Defense::Trap(trap) => (None, Some(trap.progress(world.clock))),
                    Defense::BarbedWire(_) | Defense::Bomb(_) => (None, None),
                };
                DefenseSnapshot {
                    id,
                    kind: defense.kind(),
                    position: defense.position(),
                    turret_angle,
                    trap_progress,
                }
            })
            .collect()
    }

    /// Rooms of the current map in grid order.
    #[must_use]
    pub fn rooms(world: &World) -> Vec<RoomSnapshot> {
        world
            .dungeon
            .rooms()
            .map(|room| RoomSnapshot {
                coord: room.grid_coord(),
                template_id: room.template_id().to_owned(),
                bounds: *room.bounds(),
                visited: room.visited(),
                cleared: room.cleared(),
                is_start: room.is_start(),
            })
            .collect()
    }

    /// Upgrades waiting on the floor.
    #[must_use]
    pub fn pickups(world: &World) -> Vec<(UpgradeKind, Rect)> {
        world
            .encounters
            .pickups()
            .iter()
            .map(|pickup| (pickup.upgrade(), *pickup.rect()))
            .collect()
    }

    /// Boss portal, once opened.
    #[must_use]
    pub fn portal(world: &World) -> Option<Rect> {
        world.encounters.portal().copied()
    }

    /// Read-only snapshot of the player avatar.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct PlayerSnapshot {
        /// Centre of the hitbox.
        pub position: Vec2,
        /// Collision bounds.
        pub hitbox: Rect,
        /// Visual bounds.
        pub render_rect: Rect,
        /// Current health.
        pub health: i32,
        /// Maximum health.
        pub max_health: i32,
        /// Damage dealt per bullet.
        pub damage: i32,
        /// Movement speed.
        pub speed: f32,
        /// Minimum time between shots.
        pub fire_interval: Duration,
        /// Radius given to newly built turrets.
        pub turret_range: f32,
    }

    /// Read-only snapshot of one enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Handle of the enemy.
        pub id: EnemyId,
        /// Behaviour family.
        pub archetype: Archetype,
        /// Centre of the hitbox.
        pub position: Vec2,
        /// Collision bounds.
        pub hitbox: Rect,
        /// Visual bounds.
        pub render_rect: Rect,
        /// Current health.
        pub health: i32,
        /// Health at spawn.
        pub max_health: i32,
        /// Four-way facing.
        pub facing: Facing,
        /// Current movement speed.
        pub speed: f32,
        /// Whether the hit flash is showing.
        pub flashing: bool,
        /// Whether the enemy is still alive.
        pub alive: bool,
    }

    /// Boss overlay data.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BossStatus {
        /// Handle of the boss.
        pub id: EnemyId,
        /// Health phase.
        pub phase: BossPhase,
        /// Attack state.
        pub state: BossState,
        /// Whether the smash cone overlay should be drawn.
        pub cone_visible: bool,
        /// Health over maximum health.
        pub health_ratio: f32,
        /// Progress of the running attack animation.
        pub animation_progress: f32,
    }

    /// Read-only snapshot of a projectile.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Handle of the projectile.
        pub id: ProjectileId,
        /// Kind of projectile.
        pub kind: ProjectileKind,
        /// Collision bounds.
        pub hitbox: Rect,
        /// Unit direction of travel.
        pub direction: Vec2,
    }

    /// Read-only snapshot of a defense.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct DefenseSnapshot {
        /// Handle of the defense.
        pub id: DefenseId,
        /// Kind of defense.
        pub kind: DefenseKind,
        /// Centre of the defense.
        pub position: Vec2,
        /// Gun angle of a turret in radians.
        pub turret_angle: Option<f32>,
        /// Snap animation progress of a trap.
        pub trap_progress: Option<f32>,
    }

    /// Read-only snapshot of a room.
    #[derive(Clone, Debug, PartialEq)]
    pub struct RoomSnapshot {
        /// Grid coordinate.
        pub coord: GridCoord,
        /// Template the room was built from.
        pub template_id: String,
        /// Pixel bounds.
        pub bounds: Rect,
        /// Whether the player has entered the room.
        pub visited: bool,
        /// Whether the room's encounter is over.
        pub cleared: bool,
        /// Whether this is the entry room.
        pub is_start: bool,
    }
}
