#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Swarm TD simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the world executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values describing
//! every observable state change. Systems share the geometry primitives, the
//! balance set and the capability traits defined here.

pub mod arena;
pub mod balance;
pub mod capabilities;
pub mod geometry;

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use arena::{Arena, ArenaKey};
pub use balance::Balance;
pub use capabilities::{Damageable, EconomySink, GameFlow, HitOutcome, RoomRegistry};
pub use geometry::{normalize_or, Rect, FALLBACK_DIRECTION};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Swarm TD.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by one frame.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Sets the player's movement intent until the next steer command.
    SteerPlayer {
        /// Desired direction of travel; the zero vector stops the player.
        direction: Vec2,
    },
    /// Fires a player bullet toward a world point when the weapon is ready.
    FirePlayerShot {
        /// World point the bullet is aimed at.
        toward: Vec2,
    },
    /// Builds a defense at the provided world position.
    PlaceDefense {
        /// Kind of defense to build.
        kind: DefenseKind,
        /// Centre of the defense, or the landing point of a thrown bomb.
        position: Vec2,
    },
    /// Tears down a player-built wall for a partial refund.
    RemoveWall {
        /// Wall to remove.
        wall: WallId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports the shape of a freshly generated dungeon.
    DungeonGenerated {
        /// Number of rooms placed.
        rooms: usize,
        /// Number of door sides sealed by generated colliders.
        sealed_sides: usize,
    },
    /// The player lost health.
    PlayerDamaged {
        /// Damage applied.
        amount: i32,
        /// Health left afterwards.
        remaining: i32,
    },
    /// The player's health reached zero.
    PlayerDefeated,
    /// An enemy entered the world.
    EnemySpawned {
        /// Handle of the new enemy.
        enemy: EnemyId,
        /// Behaviour family of the enemy.
        archetype: Archetype,
        /// Centre of the enemy at spawn time.
        position: Vec2,
    },
    /// An enemy survived a hit.
    EnemyDamaged {
        /// Enemy that was hit.
        enemy: EnemyId,
        /// Damage applied.
        amount: i32,
        /// Health left afterwards.
        remaining: i32,
    },
    /// An enemy died and its reward was credited.
    EnemyKilled {
        /// Enemy that died.
        enemy: EnemyId,
        /// Behaviour family of the enemy.
        archetype: Archetype,
        /// Money credited for the kill.
        reward: u32,
    },
    /// An enemy left the world, either as a removed corpse or by despawning.
    EnemyRemoved {
        /// Enemy that was removed.
        enemy: EnemyId,
    },
    /// A projectile was launched.
    ProjectileFired {
        /// Handle of the projectile.
        projectile: ProjectileId,
        /// Kind of projectile.
        kind: ProjectileKind,
        /// Launch point.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// A defense was built.
    DefensePlaced {
        /// Handle of the defense.
        defense: DefenseId,
        /// Kind of defense.
        kind: DefenseKind,
        /// Centre of the defense.
        position: Vec2,
    },
    /// A wall was built.
    WallPlaced {
        /// Handle of the wall.
        wall: WallId,
        /// Collider occupied by the wall.
        rect: Rect,
    },
    /// A placement request was refused.
    PlacementRejected {
        /// Kind of defense requested.
        kind: DefenseKind,
        /// Requested position.
        position: Vec2,
        /// Reason the request was refused.
        reason: PlacementError,
    },
    /// A defense finished its job and left the world.
    DefenseExpired {
        /// Handle of the defense.
        defense: DefenseId,
        /// Kind of defense.
        kind: DefenseKind,
    },
    /// A trap snapped shut.
    TrapTriggered {
        /// Trap that fired.
        defense: DefenseId,
    },
    /// A bomb's fuse ran out.
    BombExploded {
        /// Bomb that exploded.
        defense: DefenseId,
        /// Explosion centre.
        position: Vec2,
        /// Number of enemies caught in the blast.
        hits: usize,
    },
    /// A wall was removed and part of its cost refunded.
    WallRemoved {
        /// Wall that was removed.
        wall: WallId,
        /// Money returned.
        refund: u32,
    },
    /// A wall removal was refused because no such wall exists.
    WallRemovalRejected {
        /// Wall named in the request.
        wall: WallId,
    },
    /// The player entered a room for the first time.
    RoomEntered {
        /// Grid coordinate of the room.
        room: GridCoord,
    },
    /// A room's encounter was defeated.
    RoomCleared {
        /// Grid coordinate of the room.
        room: GridCoord,
    },
    /// An upgrade pickup appeared.
    LootDropped {
        /// Upgrade carried by the pickup.
        upgrade: UpgradeKind,
        /// Centre of the pickup.
        position: Vec2,
    },
    /// The player collected an upgrade.
    UpgradeCollected {
        /// Upgrade applied.
        upgrade: UpgradeKind,
    },
    /// The boss portal appeared.
    PortalOpened {
        /// Centre of the portal.
        position: Vec2,
    },
    /// The world was rebuilt around the boss arena.
    BossRoomEntered,
    /// The boss crossed a health threshold.
    BossPhaseChanged {
        /// Boss handle.
        enemy: EnemyId,
        /// Phase entered.
        phase: BossPhase,
    },
    /// The boss attack state machine changed state.
    BossStateChanged {
        /// Boss handle.
        enemy: EnemyId,
        /// State entered.
        state: BossState,
    },
    /// The boss was defeated.
    Victory,
}

/// Run-level mode of the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameMode {
    /// Exploring the generated dungeon.
    Dungeon,
    /// Fighting the boss in its arena.
    BossRoom,
    /// The boss was defeated; the simulation is frozen.
    Victory,
    /// The player died; the simulation is frozen.
    GameOver,
}

impl GameMode {
    /// Reports whether ticks and commands still mutate the world.
    #[must_use]
    pub const fn is_playable(self) -> bool {
        matches!(self, Self::Dungeon | Self::BossRoom)
    }
}

/// Unique handle assigned to an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl ArenaKey for EnemyId {
    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique handle assigned to a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(u32);

impl ProjectileId {
    /// Creates a new projectile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl ArenaKey for ProjectileId {
    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique handle assigned to a turret, trap, wire or bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefenseId(u32);

impl DefenseId {
    /// Creates a new defense identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl ArenaKey for DefenseId {
    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Unique handle assigned to a player-built wall.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WallId(u32);

impl WallId {
    /// Creates a new wall identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl ArenaKey for WallId {
    fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).unwrap_or(u32::MAX))
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Location of a room on the dungeon grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i32,
    y: i32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column of the room.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row of the room; rows grow downwards.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Coordinate of the neighbouring cell across `side`.
    #[must_use]
    pub const fn neighbor(self, side: Side) -> Self {
        let (dx, dy) = side.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Side of a room, naming both door positions and wall directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Upper edge.
    Top,
    /// Lower edge.
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

impl Side {
    /// Every side in a fixed order.
    pub const ALL: [Side; 4] = [Side::Top, Side::Bottom, Side::Left, Side::Right];

    /// Side facing this one across a shared edge.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Grid offset toward the neighbour across this side.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::Bottom => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

/// Four-way facing derived from the dominant axis of a direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Facing toward decreasing `y`.
    Up,
    /// Facing toward increasing `y`.
    Down,
    /// Facing toward decreasing `x`.
    Left,
    /// Facing toward increasing `x`.
    Right,
}

impl Facing {
    /// Picks the facing whose axis dominates `direction`.
    ///
    /// Ties favour the vertical axis.
    #[must_use]
    pub fn from_direction(direction: Vec2) -> Self {
        if direction.x.abs() > direction.y.abs() {
            if direction.x > 0.0 {
                Self::Right
            } else {
                Self::Left
            }
        } else if direction.y < 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    /// Unit vector pointing the way the facing looks.
    #[must_use]
    pub fn unit(self) -> Vec2 {
        match self {
            Self::Up => Vec2::new(0.0, -1.0),
            Self::Down => Vec2::new(0.0, 1.0),
            Self::Left => Vec2::new(-1.0, 0.0),
            Self::Right => Vec2::new(1.0, 0.0),
        }
    }
}

/// Behaviour family of an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Archetype {
    /// Ground chaser that paths around walls.
    Melee,
    /// Wall-ignoring swarmer with flocking separation.
    Flyer,
    /// Ranged chaser that stops to throw bones.
    Skeleton,
    /// Multi-phase arena boss.
    Boss,
}

impl Archetype {
    /// Archetypes eligible for random room encounters.
    pub const REGULAR: [Archetype; 3] = [Archetype::Melee, Archetype::Flyer, Archetype::Skeleton];
}

/// Health phase of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BossPhase {
    /// Above the phase-two threshold; throws only.
    One,
    /// Between thresholds; smash unlocked.
    Two,
    /// Below the phase-three threshold.
    Three,
}

impl BossPhase {
    /// Phase number starting at one.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// Attack state of the boss.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BossState {
    /// Chasing the player and waiting for a cooldown.
    Idle,
    /// Winding up a rock throw.
    ThrowPre,
    /// Releasing the rock.
    ThrowCast,
    /// Finishing the throw animation.
    ThrowRecover,
    /// Winding up a ground smash.
    SmashPre,
    /// Landing the smash.
    SmashCast,
    /// Finishing the smash animation.
    SmashRecover,
}

impl BossState {
    /// Reports whether the smash cone should be drawn.
    #[must_use]
    pub const fn shows_cone(self) -> bool {
        matches!(self, Self::SmashPre | Self::SmashCast)
    }
}

/// Kind of projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProjectileKind {
    /// Bullet fired by the player.
    PlayerBullet,
    /// Bullet fired by a turret.
    TurretBullet,
    /// Bone thrown by a skeleton.
    Bone,
    /// Rock thrown by the boss.
    Rock,
}

impl ProjectileKind {
    /// Reports whether the projectile damages the player rather than enemies.
    #[must_use]
    pub const fn is_hostile(self) -> bool {
        matches!(self, Self::Bone | Self::Rock)
    }
}

/// Player-buildable defenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefenseKind {
    /// Auto-aiming gun emplacement.
    Turret,
    /// Two-hit snap trap.
    Trap,
    /// Slowing area.
    BarbedWire,
    /// Thrown fuse grenade.
    Bomb,
    /// Solid collider that blocks movement.
    Wall,
}

impl DefenseKind {
    /// Build cost under the provided balance set.
    #[must_use]
    pub fn cost(self, balance: &Balance) -> u32 {
        match self {
            Self::Turret => balance.turret.cost,
            Self::Trap => balance.trap.cost,
            Self::BarbedWire => balance.wire.cost,
            Self::Bomb => balance.bomb.cost,
            Self::Wall => balance.wall.cost,
        }
    }
}

/// Reasons a placement request may be refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementError {
    /// The run is over, so nothing can be built.
    InvalidMode,
    /// The player cannot afford the defense.
    InsufficientFunds,
    /// The population cap for this defense is reached.
    LimitReached,
    /// The footprint overlaps the player or an existing collider.
    Obstructed,
}

/// Upgrades that can drop from cleared rooms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    /// Restores the player to full health.
    Heal,
    /// Raises maximum and current health by one.
    HealthUp,
    /// Raises player bullet damage.
    Damage,
    /// Grants money.
    Money,
    /// Shortens the player fire interval.
    FireRate,
    /// Raises player speed.
    Speed,
    /// Raises the range of turrets built afterwards.
    Range,
}

/// Immutable collider the movers resolve against.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaticCollider {
    rect: Rect,
    tag: ColliderTag,
}

impl StaticCollider {
    /// Creates a collider with the provided bounds and tag.
    #[must_use]
    pub const fn new(rect: Rect, tag: ColliderTag) -> Self {
        Self { rect, tag }
    }

    /// Bounds of the collider.
    #[must_use]
    pub const fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Provenance of the collider.
    #[must_use]
    pub const fn tag(&self) -> ColliderTag {
        self.tag
    }
}

/// Provenance of a static collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColliderTag {
    /// Wall geometry that belongs to a room template.
    Terrain,
    /// Generated seal closing a door without a matching neighbour.
    DoorSeal(Side),
    /// Wall built by the player.
    Buildable(WallId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_sides_round_trip() {
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            let (dx, dy) = side.offset();
            let (ox, oy) = side.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn neighbor_follows_offset() {
        let origin = GridCoord::new(2, -1);
        assert_eq!(origin.neighbor(Side::Right), GridCoord::new(3, -1));
        assert_eq!(origin.neighbor(Side::Top), GridCoord::new(2, -2));
    }

    #[test]
    fn facing_follows_dominant_axis() {
        assert_eq!(Facing::from_direction(Vec2::new(0.9, 0.1)), Facing::Right);
        assert_eq!(Facing::from_direction(Vec2::new(-0.9, 0.4)), Facing::Left);
        assert_eq!(Facing::from_direction(Vec2::new(0.2, -0.8)), Facing::Up);
        assert_eq!(Facing::from_direction(Vec2::new(0.5, 0.5)), Facing::Down);
    }

    #[test]
    fn hostile_projectiles_are_enemy_owned() {
        assert!(ProjectileKind::Bone.is_hostile());
        assert!(ProjectileKind::Rock.is_hostile());
        assert!(!ProjectileKind::TurretBullet.is_hostile());
    }

    #[test]
    fn defense_costs_follow_balance() {
        let balance = Balance::default();
        assert_eq!(DefenseKind::Turret.cost(&balance), 50);
        assert_eq!(DefenseKind::Wall.cost(&balance), 30);
        assert_eq!(DefenseKind::BarbedWire.cost(&balance), 25);
    }
}
