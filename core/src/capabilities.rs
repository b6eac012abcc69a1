//! Narrow capability interfaces handed to subsystems instead of a shared game context.

use std::time::Duration;

use crate::EnemyId;

/// Result of applying one hit to a damageable entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// The target was already dead, so the hit changed nothing.
    Ignored,
    /// The target survived with the given health.
    Wounded {
        /// Health left after the hit.
        remaining: i32,
    },
    /// This hit brought the target's health to zero or below.
    Killed,
}

/// Implemented by every entity that can take damage.
pub trait Damageable {
    /// Subtracts `amount` from the entity's health at simulation time `now`.
    fn take_hit(&mut self, amount: i32, now: Duration) -> HitOutcome;

    /// Reports whether the entity is still alive.
    fn is_alive(&self) -> bool;
}

/// Receives the economic side effects of combat and construction.
pub trait EconomySink {
    /// Credits a kill reward and bumps the kill counter.
    fn credit_kill(&mut self, reward: u32);

    /// Deducts `cost` when affordable, reporting whether it was.
    fn try_spend(&mut self, cost: u32) -> bool;

    /// Returns money to the player.
    fn refund(&mut self, amount: u32);
}

/// Tracks which room owns which enemy.
pub trait RoomRegistry {
    /// Drops `enemy` from whichever room roster lists it.
    fn release_enemy(&mut self, enemy: EnemyId);
}

/// Receives run-level transitions requested by the simulation.
pub trait GameFlow {
    /// Records that the boss was defeated.
    fn declare_victory(&mut self);

    /// Records that the player stepped through the boss portal.
    fn request_boss_room(&mut self);
}
