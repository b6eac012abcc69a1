//! Player avatar: movement, shooting cadence, health and upgrades.

use std::time::Duration;

use swarm_td_core::{
    balance::{millis, Balance},
    normalize_or, Damageable, HitOutcome, Rect, StaticCollider, UpgradeKind, Vec2,
};
use swarm_td_system_collision::{CollisionResponse, Mover};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Player {
    mover: Mover,
    steer: Vec2,
    health: i32,
    max_health: i32,
    damage: i32,
    fire_interval: Duration,
    last_shot: Option<Duration>,
    turret_range: f32,
}

impl Player {
    pub(crate) fn new(center: Vec2, balance: &Balance) -> Self {
        let tuning = &balance.player;
        let mover = Mover::new(
            center,
            Vec2::new(tuning.hitbox_width, tuning.hitbox_height),
            Vec2::ZERO,
            CollisionResponse::Push,
        )
        .with_velocity(Vec2::ZERO, tuning.speed);
        Self {
            mover,
            steer: Vec2::ZERO,
            health: tuning.health,
            max_health: tuning.health,
            damage: tuning.damage,
            fire_interval: millis(tuning.fire_interval_ms),
            last_shot: None,
            turret_range: balance.turret.range,
        }
    }

    pub(crate) const fn hitbox(&self) -> &Rect {
        self.mover.hitbox()
    }

    pub(crate) const fn render_rect(&self) -> &Rect {
        self.mover.render_rect()
    }

    pub(crate) fn center(&self) -> Vec2 {
        self.mover.center()
    }

    pub(crate) const fn health(&self) -> i32 {
        self.health
    }

    pub(crate) const fn max_health(&self) -> i32 {
        self.max_health
    }

    pub(crate) const fn damage(&self) -> i32 {
        self.damage
    }

    pub(crate) const fn speed(&self) -> f32 {
        self.mover.speed()
    }

    pub(crate) const fn fire_interval(&self) -> Duration {
        self.fire_interval
    }

    /// Radius given to turrets built from now on.
    pub(crate) const fn turret_range(&self) -> f32 {
        self.turret_range
    }

    pub(crate) fn steer(&mut self, direction: Vec2) {
        self.steer = direction;
    }

    pub(crate) fn place_at(&mut self, center: Vec2) {
        self.mover.place_at(center);
    }

    /// Walks along the steering direction, pushed out of static colliders.
    pub(crate) fn advance(&mut self, dt: Duration, colliders: &[StaticCollider]) {
        self.mover.set_direction(normalize_or(self.steer, Vec2::ZERO));
        self.mover.step(dt.as_secs_f32(), colliders);
    }

    /// Consumes the weapon cooldown, reporting whether a shot may be fired at `now`.
    pub(crate) fn try_fire(&mut self, now: Duration) -> bool {
        let ready = self
            .last_shot
            .map_or(true, |last| now.saturating_sub(last) >= self.fire_interval);
        if ready {
            self.last_shot = Some(now);
        }
        ready
    }

    /// Applies an upgrade that affects the avatar. Money is handled by the caller.
    pub(crate) fn apply_upgrade(&mut self, upgrade: UpgradeKind, balance: &Balance) {
        let tuning = &balance.upgrades;
        match upgrade {
            UpgradeKind::Heal => self.health = self.max_health,
            UpgradeKind::HealthUp => {
                self.max_health += 1;
                self.health += 1;
            }
            UpgradeKind::Damage => self.damage += tuning.damage_bonus,
            UpgradeKind::FireRate => {
                let shortened = self.fire_interval.mul_f32(tuning.fire_interval_factor);
                self.fire_interval = shortened.max(millis(tuning.min_fire_interval_ms));
            }
            UpgradeKind::Speed => self.mover.set_speed(self.mover.speed() + tuning.speed_bonus),
            UpgradeKind::Range => self.turret_range += tuning.range_bonus,
            UpgradeKind::Money => {}
        }
    }
}

impl Damageable for Player {
    fn take_hit(&mut self, amount: i32, _now: Duration) -> HitOutcome {
        if self.health <= 0 {
            return HitOutcome::Ignored;
        }
        self.health -= amount;
        if self.health <= 0 {
            HitOutcome::Killed
        } else {
            HitOutcome::Wounded {
                remaining: self.health,
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_rate_upgrades_bottom_out_at_the_floor() {
        let balance = Balance::default();
        let mut player = Player::new(Vec2::ZERO, &balance);
        for _ in 0..20 {
            player.apply_upgrade(UpgradeKind::FireRate, &balance);
        }
        assert_eq!(player.fire_interval(), Duration::from_millis(100));
    }

    #[test]
    fn health_up_raises_both_values_and_heal_restores() {
        let balance = Balance::default();
        let mut player = Player::new(Vec2::ZERO, &balance);
        let _ = player.take_hit(3, Duration::ZERO);
        player.apply_upgrade(UpgradeKind::HealthUp, &balance);
        assert_eq!((player.health(), player.max_health()), (3, 6));
        player.apply_upgrade(UpgradeKind::Heal, &balance);
        assert_eq!(player.health(), 6);
    }

    #[test]
    fn weapon_cooldown_gates_shots() {
        let balance = Balance::default();
        let mut player = Player::new(Vec2::ZERO, &balance);
        assert!(player.try_fire(Duration::from_millis(10)));
        assert!(!player.try_fire(Duration::from_millis(409)));
        assert!(player.try_fire(Duration::from_millis(410)));
    }

    #[test]
    fn zero_steer_keeps_player_still() {
        let balance = Balance::default();
        let mut player = Player::new(Vec2::new(50.0, 50.0), &balance);
        player.advance(Duration::from_millis(16), &[]);
        assert_eq!(player.center(), Vec2::new(50.0, 50.0));
        player.steer(Vec2::new(3.0, 0.0));
        player.advance(Duration::from_millis(500), &[]);
        assert!((player.center().x - 150.0).abs() < 1e-3);
    }
}
