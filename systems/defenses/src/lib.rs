#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Player-built hazards: turrets, traps, barbed wire and bombs.
//!
//! Defenses hold enemies only by [`EnemyId`] handle. A handle whose enemy has
//! died or left the table is treated as a lost target. Damage is never applied
//! here: the system reports [`DefenseAction::Hit`] requests for the world to
//! resolve, so kills flow through the same economy path as bullet kills. The
//! one exception is barbed wire, which scales enemy speed in place.

mod turret;

use std::{collections::BTreeSet, time::Duration};

use swarm_td_core::{
    balance::{millis, BombBalance, TrapBalance, WireBalance},
    normalize_or, Arena, Balance, Damageable, DefenseId, DefenseKind, EnemyId, PlacementError,
    Rect, StaticCollider, Vec2, FALLBACK_DIRECTION,
};
use swarm_td_system_collision::Lifetime;
use swarm_td_system_enemy_ai::Enemy;
use tracing::debug;

pub use turret::Turret;

/// Snap trap that hits everything standing on it twice.
#[derive(Clone, Debug, PartialEq)]
pub struct Trap {
    area: Rect,
    animation: Duration,
    state: TrapState,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TrapState {
    Armed,
    Sprung {
        animation: Lifetime,
        second_hit_done: bool,
    },
}

impl Trap {
    /// Arms a trap centred on `center`.
    #[must_use]
    pub fn new(center: Vec2, balance: &TrapBalance) -> Self {
        Self {
            area: Rect::from_center(center, Vec2::new(balance.width, balance.height)),
            animation: millis(balance.animation_ms),
            state: TrapState::Armed,
        }
    }

    /// Trigger area.
    #[must_use]
    pub const fn area(&self) -> &Rect {
        &self.area
    }

    /// Reports whether the trap has been set off.
    #[must_use]
    pub const fn is_sprung(&self) -> bool {
        matches!(self.state, TrapState::Sprung { .. })
    }

    /// Progress of the snap animation in `[0, 1]`; zero while armed.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        match self.state {
            TrapState::Armed => 0.0,
            TrapState::Sprung { animation, .. } => animation.progress(now),
        }
    }

    fn update(
        &mut self,
        id: DefenseId,
        enemies: &Arena<EnemyId, Enemy>,
        ctx: &DefenseContext<'_>,
        overlapping: &mut Vec<EnemyId>,
        out: &mut Vec<DefenseAction>,
    ) {
        let tuning = &ctx.balance.trap;
        match &mut self.state {
            TrapState::Armed => {
                collect_overlapping(&self.area, enemies, overlapping);
                if overlapping.is_empty() {
                    return;
                }
                self.state = TrapState::Sprung {
                    animation: Lifetime::new(ctx.now, self.animation),
                    second_hit_done: false,
                };
                debug!(defense = id.get(), caught = overlapping.len(), "trap triggered");
                out.push(DefenseAction::Triggered { defense: id });
                push_hits(id, overlapping, tuning.damage, out);
            }
            TrapState::Sprung {
                animation,
                second_hit_done,
            } => {
                if !*second_hit_done && animation.progress(ctx.now) >= tuning.second_hit_progress {
                    *second_hit_done = true;
                    collect_overlapping(&self.area, enemies, overlapping);
                    push_hits(id, overlapping, tuning.damage, out);
                }
                if animation.expired(ctx.now) {
                    out.push(DefenseAction::Expired { defense: id });
                }
            }
        }
    }
}

/// Area that slows every enemy inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct BarbedWire {
    area: Rect,
    slowed: BTreeSet<EnemyId>,
}

impl BarbedWire {
    /// Lays wire centred on `center`.
    #[must_use]
    pub fn new(center: Vec2, balance: &WireBalance) -> Self {
        Self {
            area: Rect::from_center(center, Vec2::new(balance.width, balance.height)),
            slowed: BTreeSet::new(),
        }
    }

    /// Slowing area.
    #[must_use]
    pub const fn area(&self) -> &Rect {
        &self.area
    }

    /// Enemies currently slowed by this wire.
    #[must_use]
    pub const fn slowed(&self) -> &BTreeSet<EnemyId> {
        &self.slowed
    }

    /// Slows enemies that entered the area and restores those that left.
    ///
    /// Speed is scaled in place, so overlapping wires compound. Enemies that
    /// died or were removed while slowed are forgotten without restoration.
    fn update(
        &mut self,
        enemies: &mut Arena<EnemyId, Enemy>,
        factor: f32,
        inside: &mut Vec<EnemyId>,
    ) {
        collect_overlapping(&self.area, enemies, inside);

        self.slowed.retain(|id| {
            if inside.contains(id) {
                return true;
            }
            if let Some(enemy) = enemies.get_mut(*id).filter(|enemy| enemy.is_alive()) {
                enemy.divide_speed(factor);
            }
            false
        });

        for id in inside.iter() {
            if self.slowed.insert(*id) {
                if let Some(enemy) = enemies.get_mut(*id) {
                    enemy.multiply_speed(factor);
                }
            }
        }
    }
}

/// Thrown grenade that flies to a landing point and explodes when its fuse runs out.
#[derive(Clone, Debug, PartialEq)]
pub struct Bomb {
    position: Vec2,
    target: Vec2,
    speed: f32,
    fuse: Lifetime,
}

impl Bomb {
    /// Throws a bomb from `origin` toward `target`.
    #[must_use]
    pub fn new(origin: Vec2, target: Vec2, now: Duration, balance: &BombBalance) -> Self {
        Self {
            position: origin,
            target,
            speed: balance.speed,
            fuse: Lifetime::new(now, millis(balance.fuse_ms)),
        }
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Landing point.
    #[must_use]
    pub const fn target(&self) -> Vec2 {
        self.target
    }

    /// Fuse timer.
    #[must_use]
    pub const fn fuse(&self) -> &Lifetime {
        &self.fuse
    }

    /// Moves toward the landing point without overshooting it.
    fn advance(&mut self, dt: Duration) {
        let remaining = self.target - self.position;
        let step = self.speed * dt.as_secs_f32();
        if remaining.length() <= step {
            self.position = self.target;
        } else {
            self.position += normalize_or(remaining, FALLBACK_DIRECTION) * step;
        }
    }

    fn update(
        &mut self,
        id: DefenseId,
        enemies: &Arena<EnemyId, Enemy>,
        ctx: &DefenseContext<'_>,
        caught: &mut Vec<EnemyId>,
        out: &mut Vec<DefenseAction>,
    ) {
        self.advance(ctx.dt);
        if !self.fuse.expired(ctx.now) {
            return;
        }

        let tuning = &ctx.balance.bomb;
        caught.clear();
        caught.extend(
            enemies
                .iter()
                .filter(|(_, enemy)| {
                    enemy.is_alive() && enemy.center().distance(self.position) <= tuning.radius
                })
                .map(|(enemy, _)| enemy),
        );
        debug!(defense = id.get(), hits = caught.len(), "bomb exploded");
        out.push(DefenseAction::Exploded {
            defense: id,
            position: self.position,
            hits: caught.len(),
        });
        push_hits(id, caught, tuning.damage, out);
        out.push(DefenseAction::Expired { defense: id });
    }
}

/// A placed hazard.
#[derive(Clone, Debug, PartialEq)]
pub enum Defense {
    /// Auto-aiming gun.
    Turret(Turret),
    /// Two-hit snap trap.
    Trap(Trap),
    /// Slowing area.
    BarbedWire(BarbedWire),
    /// Fuse grenade in flight.
    Bomb(Bomb),
}

impl Defense {
    /// Kind reported to the presentation layer.
    #[must_use]
    pub const fn kind(&self) -> DefenseKind {
        match self {
            Self::Turret(_) => DefenseKind::Turret,
            Self::Trap(_) => DefenseKind::Trap,
            Self::BarbedWire(_) => DefenseKind::BarbedWire,
            Self::Bomb(_) => DefenseKind::Bomb,
        }
    }

    /// Centre of the defense.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        match self {
            Self::Turret(turret) => turret.center(),
            Self::Trap(trap) => trap.area().center(),
            Self::BarbedWire(wire) => wire.area().center(),
            Self::Bomb(bomb) => bomb.position(),
        }
    }
}

/// Checks the per-kind population limits before a defense is built.
pub fn check_capacity(
    kind: DefenseKind,
    defenses: &Arena<DefenseId, Defense>,
    balance: &Balance,
) -> Result<(), PlacementError> {
    if kind != DefenseKind::Turret {
        return Ok(());
    }
    let turrets = defenses
        .iter()
        .filter(|(_, defense)| defense.kind() == DefenseKind::Turret)
        .count();
    if turrets >= balance.turret.max_count {
        return Err(PlacementError::LimitReached);
    }
    Ok(())
}

/// Side effects requested by the defense system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DefenseAction {
    /// Damage an enemy.
    Hit {
        /// Defense responsible.
        defense: DefenseId,
        /// Enemy to damage.
        enemy: EnemyId,
        /// Damage to apply.
        amount: i32,
    },
    /// Launch a turret bullet.
    Fire {
        /// Turret that fired.
        defense: DefenseId,
        /// Muzzle position.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// A trap snapped shut.
    Triggered {
        /// Trap that fired.
        defense: DefenseId,
    },
    /// A bomb's fuse ran out.
    Exploded {
        /// Bomb that exploded.
        defense: DefenseId,
        /// Explosion centre.
        position: Vec2,
        /// Number of enemies inside the blast radius.
        hits: usize,
    },
    /// Remove the defense at the end of the tick.
    Expired {
        /// Defense to remove.
        defense: DefenseId,
    },
}

/// Read-only facts the defense system needs for one tick.
#[derive(Clone, Copy, Debug)]
pub struct DefenseContext<'a> {
    /// Simulation time after the tick's clock advance.
    pub now: Duration,
    /// Length of the tick.
    pub dt: Duration,
    /// Static colliders of the current map.
    pub colliders: &'a [StaticCollider],
    /// Balance set of the run.
    pub balance: &'a Balance,
}

/// Defense system that reuses its collider cache and overlap buffer between ticks.
#[derive(Debug, Default)]
pub struct Defenses {
    walls: Vec<StaticCollider>,
    overlap: Vec<EnemyId>,
}

impl Defenses {
    /// Creates the system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates every defense in placement order.
    ///
    /// The output buffer is cleared before being filled.
    pub fn update(
        &mut self,
        defenses: &mut Arena<DefenseId, Defense>,
        enemies: &mut Arena<EnemyId, Enemy>,
        ctx: &DefenseContext<'_>,
        out: &mut Vec<DefenseAction>,
    ) {
        out.clear();
        for (id, defense) in defenses.iter_mut() {
            match defense {
                Defense::Turret(turret) => turret.update(id, enemies, ctx, &mut self.walls, out),
                Defense::Trap(trap) => trap.update(id, enemies, ctx, &mut self.overlap, out),
                Defense::BarbedWire(wire) => {
                    wire.update(enemies, ctx.balance.wire.slow_factor, &mut self.overlap);
                }
                Defense::Bomb(bomb) => bomb.update(id, enemies, ctx, &mut self.overlap, out),
            }
        }
    }
}

fn collect_overlapping(area: &Rect, enemies: &Arena<EnemyId, Enemy>, out: &mut Vec<EnemyId>) {
    out.clear();
    out.extend(
        enemies
            .iter()
            .filter(|(_, enemy)| enemy.is_alive() && enemy.hitbox().intersects(area))
            .map(|(id, _)| id),
    );
}

fn push_hits(defense: DefenseId, targets: &[EnemyId], amount: i32, out: &mut Vec<DefenseAction>) {
    out.extend(targets.iter().map(|enemy| DefenseAction::Hit {
        defense,
        enemy: *enemy,
        amount,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_td_core::Archetype;

    fn context(now_ms: u64, balance: &Balance) -> DefenseContext<'_> {
        DefenseContext {
            now: Duration::from_millis(now_ms),
            dt: Duration::from_millis(20),
            colliders: &[],
            balance,
        }
    }

    #[test]
    fn bomb_clamps_final_step_onto_target() {
        let mut bomb = Bomb::new(
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Duration::ZERO,
            &BombBalance::default(),
        );
        bomb.advance(Duration::from_millis(40));
        assert_eq!(bomb.position(), Vec2::new(8.0, 0.0));
        bomb.advance(Duration::from_millis(40));
        assert_eq!(bomb.position(), Vec2::new(10.0, 0.0));
    }

    #[test]
    fn trap_ignores_dead_enemies() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let id = enemies.insert(Enemy::spawn(
            Archetype::Melee,
            Vec2::new(100.0, 100.0),
            Duration::ZERO,
            &balance,
        ));
        if let Some(enemy) = enemies.get_mut(id) {
            let _ = enemy.take_hit(100, Duration::ZERO);
        }
        let mut trap = Trap::new(Vec2::new(100.0, 100.0), &balance.trap);
        let mut out = Vec::new();

        trap.update(DefenseId::new(0), &enemies, &context(16, &balance), &mut Vec::new(), &mut out);

        assert!(out.is_empty());
        assert!(!trap.is_sprung());
    }

    #[test]
    fn turret_cap_counts_only_turrets() {
        let balance = Balance::default();
        let mut defenses = Arena::new();
        for index in 0..balance.turret.max_count {
            let _ = defenses.insert(Defense::Turret(Turret::new(
                Vec2::new(index as f32 * 40.0, 0.0),
                balance.turret.range,
                Duration::ZERO,
                &balance.turret,
            )));
        }
        assert_eq!(
            check_capacity(DefenseKind::Turret, &defenses, &balance),
            Err(PlacementError::LimitReached)
        );
        assert_eq!(check_capacity(DefenseKind::Trap, &defenses, &balance), Ok(()));
    }
}
