//! Auto-aiming gun emplacement.

use std::time::Duration;

use swarm_td_core::{
    balance::{millis, TurretBalance},
    normalize_or, Arena, Damageable, DefenseId, EnemyId, Rect, StaticCollider, Vec2,
    FALLBACK_DIRECTION,
};
use swarm_td_system_collision::{has_line_of_sight, nearby_colliders, Lifetime, SightProbe};
use swarm_td_system_enemy_ai::Enemy;

use crate::{DefenseAction, DefenseContext};

/// Turret that periodically picks the nearest visible enemy and shoots at it.
#[derive(Clone, Debug, PartialEq)]
pub struct Turret {
    center: Vec2,
    footprint: Rect,
    range: f32,
    lifetime: Lifetime,
    last_scan: Duration,
    last_shot: Duration,
    target: Option<EnemyId>,
    facing: f32,
}

impl Turret {
    /// Builds a turret centred on `center` with the provided targeting radius.
    #[must_use]
    pub fn new(center: Vec2, range: f32, now: Duration, balance: &TurretBalance) -> Self {
        Self {
            center,
            footprint: Rect::from_center(center, Vec2::splat(balance.footprint)),
            range,
            lifetime: Lifetime::new(now, millis(balance.lifetime_ms)),
            last_scan: now,
            last_shot: now,
            target: None,
            facing: 0.0,
        }
    }

    /// Centre of the turret.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Occupied footprint.
    #[must_use]
    pub const fn footprint(&self) -> &Rect {
        &self.footprint
    }

    /// Targeting radius.
    #[must_use]
    pub const fn range(&self) -> f32 {
        self.range
    }

    /// Enemy currently tracked, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EnemyId> {
        self.target
    }

    /// Gun angle in radians, measured from the positive x axis toward positive y.
    #[must_use]
    pub const fn facing_angle(&self) -> f32 {
        self.facing
    }

    /// Time left before the turret crumbles.
    #[must_use]
    pub const fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub(crate) fn update(
        &mut self,
        id: DefenseId,
        enemies: &Arena<EnemyId, Enemy>,
        ctx: &DefenseContext<'_>,
        walls: &mut Vec<StaticCollider>,
        out: &mut Vec<DefenseAction>,
    ) {
        if self.lifetime.expired(ctx.now) {
            out.push(DefenseAction::Expired { defense: id });
            return;
        }

        let tuning = &ctx.balance.turret;
        if ctx.now.saturating_sub(self.last_scan) >= millis(tuning.scan_interval_ms) {
            self.last_scan = ctx.now;
            self.target = self.find_target(enemies, ctx, walls);
        }

        let Some(target) = self.target else {
            return;
        };
        let Some(enemy) = enemies.get(target).filter(|enemy| enemy.is_alive()) else {
            self.target = None;
            return;
        };

        let direction = normalize_or(enemy.center() - self.center, FALLBACK_DIRECTION);
        self.facing = direction.y.atan2(direction.x);

        if ctx.now.saturating_sub(self.last_shot) >= millis(tuning.fire_interval_ms) {
            self.last_shot = ctx.now;
            out.push(DefenseAction::Fire {
                defense: id,
                origin: self.center + direction * tuning.gun_length,
                direction,
            });
        }
    }

    /// Picks the nearest live enemy within range that the turret can see.
    ///
    /// Sight is probed only against the colliders near the segment to each
    /// candidate, which bounds the cost on maps with many walls.
    fn find_target(
        &self,
        enemies: &Arena<EnemyId, Enemy>,
        ctx: &DefenseContext<'_>,
        walls: &mut Vec<StaticCollider>,
    ) -> Option<EnemyId> {
        let tuning = &ctx.balance.turret;
        let probe = SightProbe::every(tuning.sight_step);
        let mut best: Option<(EnemyId, f32)> = None;

        for (id, enemy) in enemies.iter() {
            if !enemy.is_alive() {
                continue;
            }
            let position = enemy.center();
            let distance = position.distance(self.center);
            if distance > self.range || best.is_some_and(|(_, nearest)| distance >= nearest) {
                continue;
            }
            nearby_colliders(self.center, position, tuning.wall_margin, ctx.colliders, walls);
            if has_line_of_sight(self.center, position, probe, walls) {
                best = Some((id, distance));
            }
        }
        best.map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_td_core::{Archetype, Balance, ColliderTag};

    fn context<'a>(
        now_ms: u64,
        colliders: &'a [StaticCollider],
        balance: &'a Balance,
    ) -> DefenseContext<'a> {
        DefenseContext {
            now: Duration::from_millis(now_ms),
            dt: Duration::from_millis(16),
            colliders,
            balance,
        }
    }

    fn enemy_at(archetype: Archetype, position: Vec2, balance: &Balance) -> Enemy {
        Enemy::spawn(archetype, position, Duration::ZERO, balance)
    }

    #[test]
    fn nearest_enemy_wins_ties_by_roster_order() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let far = enemies.insert(enemy_at(Archetype::Melee, Vec2::new(250.0, 0.0), &balance));
        let near = enemies.insert(enemy_at(Archetype::Melee, Vec2::new(0.0, 120.0), &balance));
        let twin = enemies.insert(enemy_at(Archetype::Melee, Vec2::new(0.0, -120.0), &balance));
        let turret = Turret::new(Vec2::ZERO, 300.0, Duration::ZERO, &balance.turret);

        let found = turret.find_target(&enemies, &context(500, &[], &balance), &mut Vec::new());

        assert_eq!(found, Some(near));
        assert_ne!(found, Some(far));
        assert_ne!(found, Some(twin));
    }

    #[test]
    fn distant_walls_do_not_block_sight() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let id = enemies.insert(enemy_at(Archetype::Flyer, Vec2::new(200.0, 0.0), &balance));
        let colliders = [StaticCollider::new(
            Rect::new(0.0, 400.0, 300.0, 16.0),
            ColliderTag::Terrain,
        )];
        let turret = Turret::new(Vec2::ZERO, 300.0, Duration::ZERO, &balance.turret);
        let mut walls = Vec::new();

        let found = turret.find_target(&enemies, &context(500, &colliders, &balance), &mut walls);

        assert_eq!(found, Some(id));
        assert!(walls.is_empty());
    }
}
