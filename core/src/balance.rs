//! Balance constants that tune every subsystem of the run.
//!
//! The set is deserialised from TOML with unknown keys rejected, so a balance
//! file either matches the schema exactly or fails at startup. All cooldowns
//! and lifetimes are expressed in milliseconds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::UpgradeKind;

/// Reasons a balance set may be rejected.
#[derive(Debug, Error)]
pub enum BalanceError {
    /// The TOML document could not be parsed into the balance schema.
    #[error("failed to parse balance document: {0}")]
    Parse(#[from] toml::de::Error),
    /// A value parsed correctly but breaks an invariant the simulation relies on.
    #[error("invalid balance value `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Human readable explanation.
        reason: &'static str,
    },
}

/// Complete balance configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Balance {
    /// Map-wide constants.
    pub world: WorldBalance,
    /// Player avatar tuning.
    pub player: PlayerBalance,
    /// Regular enemy tuning shared by melee, flyer and skeleton archetypes.
    pub enemies: EnemyBalance,
    /// Skeleton ranged attack cycle.
    pub skeleton: SkeletonBalance,
    /// Boss tuning.
    pub boss: BossBalance,
    /// Turret defense tuning.
    pub turret: TurretBalance,
    /// Trap defense tuning.
    pub trap: TrapBalance,
    /// Barbed wire defense tuning.
    pub wire: WireBalance,
    /// Bomb defense tuning.
    pub bomb: BombBalance,
    /// Buildable wall tuning.
    pub wall: WallBalance,
    /// Starting economy.
    pub economy: EconomyBalance,
    /// Room encounter tuning.
    pub encounters: EncounterBalance,
    /// Upgrade pickup weights and magnitudes.
    pub upgrades: UpgradeBalance,
}

impl Balance {
    /// Parses and validates a balance set from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, BalanceError> {
        let balance: Balance = toml::from_str(contents)?;
        balance.validate()?;
        Ok(balance)
    }

    /// Checks the cross-field invariants the simulation depends on.
    pub fn validate(&self) -> Result<(), BalanceError> {
        if self.world.tile_size <= 0.0 {
            return Err(invalid("world.tile_size", "must be positive"));
        }
        if self.world.room_count == 0 {
            return Err(invalid("world.room_count", "at least the start room is required"));
        }
        if self.world.seal_thickness <= 0.0 {
            return Err(invalid("world.seal_thickness", "must be positive"));
        }
        if self.player.health <= 0 {
            return Err(invalid("player.health", "must be positive"));
        }
        if self.encounters.min_enemies > self.encounters.max_enemies {
            return Err(invalid(
                "encounters.min_enemies",
                "must not exceed encounters.max_enemies",
            ));
        }
        if !(0.0..=1.0).contains(&self.encounters.loot_drop_chance) {
            return Err(invalid("encounters.loot_drop_chance", "must lie in [0, 1]"));
        }
        if !(self.wire.slow_factor > 0.0 && self.wire.slow_factor < 1.0) {
            return Err(invalid("wire.slow_factor", "must lie strictly between 0 and 1"));
        }
        if !(0.0..=1.0).contains(&self.wall.refund_ratio) {
            return Err(invalid("wall.refund_ratio", "must lie in [0, 1]"));
        }
        if !(self.trap.second_hit_progress > 0.0 && self.trap.second_hit_progress <= 1.0) {
            return Err(invalid("trap.second_hit_progress", "must lie in (0, 1]"));
        }
        let (two, three) = (self.boss.phase_two_ratio, self.boss.phase_three_ratio);
        if !(0.0 < three && three < two && two < 1.0) {
            return Err(invalid(
                "boss.phase_two_ratio",
                "phase thresholds must satisfy 0 < phase_three < phase_two < 1",
            ));
        }
        if self.boss.throw_hit_frame > self.boss.throw_frame_count
            || self.boss.smash_hit_frame > self.boss.smash_frame_count
        {
            return Err(invalid(
                "boss.throw_hit_frame",
                "hit frames must lie within their animation",
            ));
        }
        if self.upgrades.weights.iter().all(|entry| entry.weight == 0) {
            return Err(invalid(
                "upgrades.weights",
                "at least one upgrade needs a positive weight",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> BalanceError {
    BalanceError::Invalid { field, reason }
}

/// Converts a millisecond setting into a [`Duration`].
#[must_use]
pub const fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Map-wide constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorldBalance {
    /// Edge length of one map tile in pixels.
    pub tile_size: f32,
    /// Maximum number of rooms placed by the generator.
    pub room_count: usize,
    /// Thickness of the colliders that seal unmatched doors.
    pub seal_thickness: f32,
}

impl Default for WorldBalance {
    fn default() -> Self {
        Self {
            tile_size: 16.0,
            room_count: 5,
            seal_thickness: 16.0,
        }
    }
}

/// Player avatar tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerBalance {
    /// Starting and maximum health.
    pub health: i32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Damage dealt by one player bullet.
    pub damage: i32,
    /// Minimum time between two player shots.
    pub fire_interval_ms: u64,
    /// Bullet speed in pixels per second.
    pub bullet_speed: f32,
    /// Bullet lifetime.
    pub bullet_lifetime_ms: u64,
    /// Edge length of a bullet's square hitbox.
    pub bullet_size: f32,
    /// Width of the player's collision box.
    pub hitbox_width: f32,
    /// Height of the player's collision box.
    pub hitbox_height: f32,
}

impl Default for PlayerBalance {
    fn default() -> Self {
        Self {
            health: 5,
            speed: 200.0,
            damage: 1,
            fire_interval_ms: 400,
            bullet_speed: 350.0,
            bullet_lifetime_ms: 1_000,
            bullet_size: 8.0,
            hitbox_width: 24.0,
            hitbox_height: 32.0,
        }
    }
}

/// Per-archetype stats.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArchetypeBalance {
    /// Starting health.
    pub health: i32,
    /// Movement speed in pixels per second.
    pub speed: f32,
    /// Damage dealt to the player on contact.
    pub contact_damage: i32,
    /// Money credited when the enemy is killed.
    pub kill_reward: u32,
    /// Width of the sprite bounds.
    pub sprite_width: f32,
    /// Height of the sprite bounds.
    pub sprite_height: f32,
    /// Horizontal inset applied on each side to derive the hitbox.
    pub hitbox_inset_x: f32,
    /// Vertical inset applied on each side to derive the hitbox.
    pub hitbox_inset_y: f32,
}

/// Regular enemy tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyBalance {
    /// Melee chaser stats.
    pub melee: ArchetypeBalance,
    /// Flyer stats.
    pub flyer: ArchetypeBalance,
    /// Skeleton stats.
    pub skeleton: ArchetypeBalance,
    /// Lifetime after which a regular enemy despawns.
    pub despawn_ms: u64,
    /// Maximum number of live enemies.
    pub max_population: usize,
    /// Distance between two line-of-sight probes.
    pub sight_step: f32,
    /// Displacement under which a tick counts as "not moved".
    pub stuck_threshold: f32,
    /// Accumulated stuck time that triggers a direction rotation.
    pub stuck_timeout_ms: u64,
    /// Radius inside which flyers repel each other.
    pub flock_radius: f32,
    /// Delay between death and removal of the corpse.
    pub death_duration_ms: u64,
    /// Length of the hit flash window.
    pub flash_duration_ms: u64,
    /// Minimum time between two contact hits from the same enemy.
    pub contact_cooldown_ms: u64,
}

impl Default for EnemyBalance {
    fn default() -> Self {
        Self {
            melee: ArchetypeBalance {
                health: 5,
                speed: 100.0,
                contact_damage: 1,
                kill_reward: 5,
                sprite_width: 64.0,
                sprite_height: 64.0,
                hitbox_inset_x: 15.0,
                hitbox_inset_y: 25.0,
            },
            flyer: ArchetypeBalance {
                health: 3,
                speed: 120.0,
                contact_damage: 1,
                kill_reward: 5,
                sprite_width: 40.0,
                sprite_height: 40.0,
                hitbox_inset_x: 8.0,
                hitbox_inset_y: 8.0,
            },
            skeleton: ArchetypeBalance {
                health: 5,
                speed: 80.0,
                contact_damage: 1,
                kill_reward: 5,
                sprite_width: 64.0,
                sprite_height: 64.0,
                hitbox_inset_x: 15.0,
                hitbox_inset_y: 25.0,
            },
            despawn_ms: 20_000,
            max_population: 30,
            sight_step: 3.0,
            stuck_threshold: 0.5,
            stuck_timeout_ms: 200,
            flock_radius: 20.0,
            death_duration_ms: 1,
            flash_duration_ms: 100,
            contact_cooldown_ms: 1_000,
        }
    }
}

/// Skeleton ranged attack cycle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkeletonBalance {
    /// Cooldown between the end of one shot and the next telegraph.
    pub attack_cooldown_ms: u64,
    /// Length of the stationary telegraph before a shot.
    pub shoot_pause_ms: u64,
    /// Bone projectile speed.
    pub bone_speed: f32,
    /// Bone projectile lifetime.
    pub bone_lifetime_ms: u64,
    /// Damage dealt by a bone.
    pub bone_damage: i32,
    /// Edge length of a bone's square hitbox.
    pub bone_size: f32,
}

impl Default for SkeletonBalance {
    fn default() -> Self {
        Self {
            attack_cooldown_ms: 2_000,
            shoot_pause_ms: 500,
            bone_speed: 250.0,
            bone_lifetime_ms: 1_000,
            bone_damage: 1,
            bone_size: 10.0,
        }
    }
}

/// Boss tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BossBalance {
    /// Base stats of the boss body.
    pub body: ArchetypeBalance,
    /// Damage dealt by a thrown rock.
    pub rock_damage: i32,
    /// Rock projectile speed.
    pub rock_speed: f32,
    /// Rock projectile lifetime.
    pub rock_lifetime_ms: u64,
    /// Edge length of a rock's square hitbox.
    pub rock_size: f32,
    /// Cooldown between throws.
    pub throw_cooldown_ms: u64,
    /// Cooldown between smashes.
    pub smash_cooldown_ms: u64,
    /// Reach of the smash cone in pixels.
    pub smash_range: f32,
    /// Total opening angle of the smash cone in degrees.
    pub smash_angle_deg: f32,
    /// Damage dealt by a smash.
    pub smash_damage: i32,
    /// Health ratio under which phase two starts.
    pub phase_two_ratio: f32,
    /// Health ratio under which phase three starts.
    pub phase_three_ratio: f32,
    /// Speed multiplier applied once per phase transition.
    pub phase_speed_multiplier: f32,
    /// Animation frames advanced per second while winding up or recovering.
    pub animation_fps: f32,
    /// Frame count of the throw animation.
    pub throw_frame_count: u32,
    /// Frame at which the throw releases its rock.
    pub throw_hit_frame: u32,
    /// Frame count of the smash animation.
    pub smash_frame_count: u32,
    /// Frame at which the smash lands.
    pub smash_hit_frame: u32,
}

impl Default for BossBalance {
    fn default() -> Self {
        Self {
            body: ArchetypeBalance {
                health: 500,
                speed: 60.0,
                contact_damage: 1,
                kill_reward: 100,
                sprite_width: 128.0,
                sprite_height: 128.0,
                hitbox_inset_x: 30.0,
                hitbox_inset_y: 30.0,
            },
            rock_damage: 2,
            rock_speed: 220.0,
            rock_lifetime_ms: 2_000,
            rock_size: 16.0,
            throw_cooldown_ms: 3_000,
            smash_cooldown_ms: 6_000,
            smash_range: 300.0,
            smash_angle_deg: 70.0,
            smash_damage: 2,
            phase_two_ratio: 0.5,
            phase_three_ratio: 0.2,
            phase_speed_multiplier: 1.5,
            animation_fps: 10.0,
            throw_frame_count: 8,
            throw_hit_frame: 5,
            smash_frame_count: 10,
            smash_hit_frame: 6,
        }
    }
}

/// Turret defense tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TurretBalance {
    /// Build cost.
    pub cost: u32,
    /// Maximum number of turrets alive at once.
    pub max_count: usize,
    /// Lifetime after which a turret crumbles.
    pub lifetime_ms: u64,
    /// Targeting radius.
    pub range: f32,
    /// Interval between target re-scans.
    pub scan_interval_ms: u64,
    /// Minimum time between two shots.
    pub fire_interval_ms: u64,
    /// Damage dealt by a turret bullet.
    pub damage: i32,
    /// Turret bullet speed.
    pub bullet_speed: f32,
    /// Turret bullet lifetime.
    pub bullet_lifetime_ms: u64,
    /// Distance between two line-of-sight probes.
    pub sight_step: f32,
    /// Margin around the turret-to-target box when caching nearby walls.
    pub wall_margin: f32,
    /// Distance from the turret centre to the muzzle.
    pub gun_length: f32,
    /// Edge length of the turret footprint.
    pub footprint: f32,
}

impl Default for TurretBalance {
    fn default() -> Self {
        Self {
            cost: 50,
            max_count: 5,
            lifetime_ms: 30_000,
            range: 300.0,
            scan_interval_ms: 500,
            fire_interval_ms: 200,
            damage: 1,
            bullet_speed: 350.0,
            bullet_lifetime_ms: 1_000,
            sight_step: 10.0,
            wall_margin: 64.0,
            gun_length: 20.0,
            footprint: 32.0,
        }
    }
}

/// Trap defense tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrapBalance {
    /// Build cost.
    pub cost: u32,
    /// Damage dealt by each of the two hits.
    pub damage: i32,
    /// Length of the snap animation.
    pub animation_ms: u64,
    /// Animation progress at which the second hit lands.
    pub second_hit_progress: f32,
    /// Width of the trigger area.
    pub width: f32,
    /// Height of the trigger area.
    pub height: f32,
}

impl Default for TrapBalance {
    fn default() -> Self {
        Self {
            cost: 35,
            damage: 5,
            animation_ms: 1_000,
            second_hit_progress: 0.75,
            width: 32.0,
            height: 32.0,
        }
    }
}

/// Barbed wire defense tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireBalance {
    /// Build cost.
    pub cost: u32,
    /// Speed multiplier applied to enemies inside the wire.
    pub slow_factor: f32,
    /// Width of the slowing area.
    pub width: f32,
    /// Height of the slowing area.
    pub height: f32,
}

impl Default for WireBalance {
    fn default() -> Self {
        Self {
            cost: 25,
            slow_factor: 0.2,
            width: 48.0,
            height: 32.0,
        }
    }
}

/// Bomb defense tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BombBalance {
    /// Build cost.
    pub cost: u32,
    /// Splash damage.
    pub damage: i32,
    /// Splash radius.
    pub radius: f32,
    /// Travel speed in pixels per second.
    pub speed: f32,
    /// Fuse after which the bomb explodes.
    pub fuse_ms: u64,
}

impl Default for BombBalance {
    fn default() -> Self {
        Self {
            cost: 25,
            damage: 15,
            radius: 80.0,
            speed: 200.0,
            fuse_ms: 1_500,
        }
    }
}

/// Buildable wall tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WallBalance {
    /// Build cost.
    pub cost: u32,
    /// Share of the cost returned when the wall is removed.
    pub refund_ratio: f32,
    /// Width of the wall collider.
    pub width: f32,
    /// Height of the wall collider.
    pub height: f32,
}

impl Default for WallBalance {
    fn default() -> Self {
        Self {
            cost: 30,
            refund_ratio: 0.5,
            width: 32.0,
            height: 32.0,
        }
    }
}

/// Starting economy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EconomyBalance {
    /// Money available at the start of a run.
    pub starting_money: u32,
}

impl Default for EconomyBalance {
    fn default() -> Self {
        Self {
            starting_money: 150,
        }
    }
}

/// Room encounter tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EncounterBalance {
    /// Minimum number of enemies spawned in a room.
    pub min_enemies: u32,
    /// Maximum number of enemies spawned in a room.
    pub max_enemies: u32,
    /// Probability that a cleared room drops an upgrade.
    pub loot_drop_chance: f64,
    /// Minimum distance between the player and a dropped upgrade.
    pub loot_min_distance: f32,
    /// Edge length of an upgrade pickup.
    pub pickup_size: f32,
    /// Edge length of the boss portal.
    pub portal_size: f32,
}

impl Default for EncounterBalance {
    fn default() -> Self {
        Self {
            min_enemies: 1,
            max_enemies: 3,
            loot_drop_chance: 0.5,
            loot_min_distance: 96.0,
            pickup_size: 30.0,
            portal_size: 48.0,
        }
    }
}

/// Weight of a single upgrade kind in the loot table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeWeight {
    /// Upgrade the weight applies to.
    pub kind: UpgradeKind,
    /// Relative weight.
    pub weight: u32,
}

/// Upgrade pickup weights and magnitudes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeBalance {
    /// Weighted loot table.
    pub weights: Vec<UpgradeWeight>,
    /// Extra player bullet damage per Damage upgrade.
    pub damage_bonus: i32,
    /// Money granted per Money upgrade.
    pub money_bonus: u32,
    /// Extra player speed per Speed upgrade.
    pub speed_bonus: f32,
    /// Extra turret range per Range upgrade.
    pub range_bonus: f32,
    /// Multiplier applied to the player fire interval per FireRate upgrade.
    pub fire_interval_factor: f32,
    /// Floor for the player fire interval.
    pub min_fire_interval_ms: u64,
}

impl Default for UpgradeBalance {
    fn default() -> Self {
        let weights = [
            (UpgradeKind::Heal, 20),
            (UpgradeKind::HealthUp, 10),
            (UpgradeKind::Damage, 15),
            (UpgradeKind::Money, 20),
            (UpgradeKind::FireRate, 15),
            (UpgradeKind::Speed, 13),
            (UpgradeKind::Range, 13),
        ]
        .into_iter()
        .map(|(kind, weight)| UpgradeWeight { kind, weight })
        .collect();

        Self {
            weights,
            damage_bonus: 1,
            money_bonus: 50,
            speed_bonus: 15.0,
            range_bonus: 125.0,
            fire_interval_factor: 0.85,
            min_fire_interval_ms: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_balance_is_valid() {
        assert!(Balance::default().validate().is_ok());
    }

    #[test]
    fn shipped_balance_file_matches_defaults() {
        let parsed = Balance::from_toml_str(include_str!("../../config/balance.toml"))
            .expect("shipped balance file parses");
        assert_eq!(parsed, Balance::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut document = include_str!("../../config/balance.toml").to_owned();
        document.push_str("\n[mystery]\nvalue = 1\n");
        assert!(matches!(
            Balance::from_toml_str(&document),
            Err(BalanceError::Parse(_))
        ));
    }

    #[test]
    fn inverted_enemy_range_is_rejected() {
        let mut balance = Balance::default();
        balance.encounters.min_enemies = 4;
        assert!(matches!(
            balance.validate(),
            Err(BalanceError::Invalid {
                field: "encounters.min_enemies",
                ..
            })
        ));
    }

    #[test]
    fn slow_factor_must_slow() {
        let mut balance = Balance::default();
        balance.wire.slow_factor = 1.0;
        assert!(balance.validate().is_err());
    }
}
