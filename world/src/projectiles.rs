//! Bullets, bones and rocks in flight.

use std::time::Duration;

use swarm_td_core::{
    balance::{millis, Balance},
    ProjectileKind, Rect, StaticCollider, Vec2,
};
use swarm_td_system_collision::{CollisionResponse, Lifetime, Mover};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Projectile {
    kind: ProjectileKind,
    mover: Mover,
    lifetime: Lifetime,
    damage: i32,
}

impl Projectile {
    /// Launches a projectile of `kind` from `origin` along the unit `direction`.
    ///
    /// Every projectile bounces off walls and only dies on a hit or when its
    /// lifetime runs out.
    pub(crate) fn launch(
        kind: ProjectileKind,
        origin: Vec2,
        direction: Vec2,
        damage: i32,
        now: Duration,
        balance: &Balance,
    ) -> Self {
        let (size, speed, lifetime_ms) = match kind {
            ProjectileKind::PlayerBullet => (
                balance.player.bullet_size,
                balance.player.bullet_speed,
                balance.player.bullet_lifetime_ms,
            ),
            ProjectileKind::TurretBullet => (
                balance.player.bullet_size,
                balance.turret.bullet_speed,
                balance.turret.bullet_lifetime_ms,
            ),
            ProjectileKind::Bone => (
                balance.skeleton.bone_size,
                balance.skeleton.bone_speed,
                balance.skeleton.bone_lifetime_ms,
            ),
            ProjectileKind::Rock => (
                balance.boss.rock_size,
                balance.boss.rock_speed,
                balance.boss.rock_lifetime_ms,
            ),
        };
        Self {
            kind,
            mover: Mover::square(origin, size, CollisionResponse::Reflect)
                .with_velocity(direction, speed),
            lifetime: Lifetime::new(now, millis(lifetime_ms)),
            damage,
        }
    }

    pub(crate) const fn kind(&self) -> ProjectileKind {
        self.kind
    }

    pub(crate) const fn hitbox(&self) -> &Rect {
        self.mover.hitbox()
    }

    pub(crate) const fn direction(&self) -> Vec2 {
        self.mover.direction()
    }

    pub(crate) const fn damage(&self) -> i32 {
        self.damage
    }

    pub(crate) fn expired(&self, now: Duration) -> bool {
        self.lifetime.expired(now)
    }

    /// Moves the projectile, reflecting it off any wall it runs into.
    pub(crate) fn advance(&mut self, dt: Duration, colliders: &[StaticCollider]) {
        self.mover.step(dt.as_secs_f32(), colliders);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_td_core::ColliderTag;

    fn wall() -> [StaticCollider; 1] {
        [StaticCollider::new(
            Rect::new(20.0, -50.0, 10.0, 100.0),
            ColliderTag::Terrain,
        )]
    }

    #[test]
    fn player_bullet_bounces_off_walls() {
        let balance = Balance::default();
        let mut bullet = Projectile::launch(
            ProjectileKind::PlayerBullet,
            Vec2::new(14.0, 0.0),
            Vec2::new(1.0, 0.0),
            1,
            Duration::ZERO,
            &balance,
        );
        bullet.advance(Duration::from_millis(20), &wall());
        assert_eq!(bullet.direction(), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn bone_bounces_off_walls_and_stays_alive() {
        let balance = Balance::default();
        let mut bone = Projectile::launch(
            ProjectileKind::Bone,
            Vec2::new(10.0, 0.0),
            Vec2::new(1.0, 0.0),
            1,
            Duration::ZERO,
            &balance,
        );
        bone.advance(Duration::from_millis(40), &wall());

        assert_eq!(bone.direction(), Vec2::new(-1.0, 0.0));
        assert!(!bone.hitbox().intersects(wall()[0].rect()));
        assert!(!bone.expired(Duration::from_millis(40)));
    }

    #[test]
    fn rock_bounces_off_walls() {
        let balance = Balance::default();
        let mut rock = Projectile::launch(
            ProjectileKind::Rock,
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            1,
            Duration::ZERO,
            &balance,
        );
        for _ in 0..20 {
            rock.advance(Duration::from_millis(20), &wall());
        }

        assert_eq!(rock.direction(), Vec2::new(-1.0, 0.0));
        assert!(rock.hitbox().right() <= wall()[0].rect().left());
    }
}
