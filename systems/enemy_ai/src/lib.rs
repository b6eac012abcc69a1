#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Enemy records and the per-archetype behaviour that drives them each tick.
//!
//! Every enemy is a single [`Enemy`] record whose [`Archetype`] selects a
//! movement and attack policy. The system never mutates anything outside the
//! enemy table: projectile launches, player damage, boss transitions and
//! removals are reported as [`AiAction`] values for the world to apply.

mod boss;

use std::time::Duration;

use swarm_td_core::{
    balance::{millis, ArchetypeBalance},
    geometry::rotate_quarter,
    normalize_or, Arena, Archetype, Balance, BossPhase, BossState, Damageable, EconomySink,
    EnemyId, Facing, HitOutcome, ProjectileKind, Rect, RoomRegistry, StaticCollider, Vec2,
    FALLBACK_DIRECTION,
};
use swarm_td_system_collision::{has_line_of_sight, CollisionResponse, Lifetime, Mover, SightProbe};
use tracing::debug;

pub use boss::{smash_reaches, BossBrain};

use boss::BossEffect;

/// Ranged attack cycle of a skeleton.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkeletonCycle {
    /// Chasing while the attack cooldown runs.
    Cooldown {
        /// When the cooldown started.
        since: Duration,
    },
    /// Standing still before releasing a bone.
    Telegraph {
        /// When the telegraph started.
        since: Duration,
    },
}

#[derive(Clone, Debug, PartialEq)]
enum Behavior {
    Melee,
    Flyer,
    Skeleton(SkeletonCycle),
    Boss(BossBrain),
}

/// Persistent wander direction and stuck detection of a chasing enemy.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Wander {
    move_dir: Vec2,
    stuck_for: Duration,
    last_center: Vec2,
}

/// A live or dying enemy.
#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    archetype: Archetype,
    mover: Mover,
    health: i32,
    max_health: i32,
    contact_damage: i32,
    kill_reward: u32,
    lifetime: Lifetime,
    facing: Facing,
    wander: Wander,
    flash_started: Option<Duration>,
    flash_duration: Duration,
    death_time: Option<Duration>,
    contact_ready_at: Duration,
    behavior: Behavior,
}

impl Enemy {
    /// Creates an enemy of `archetype` centred on `center` at simulation time `now`.
    #[must_use]
    pub fn spawn(archetype: Archetype, center: Vec2, now: Duration, balance: &Balance) -> Self {
        let stats = stats_for(archetype, balance);
        let mover = Mover::new(
            center,
            Vec2::new(stats.sprite_width, stats.sprite_height),
            Vec2::new(stats.hitbox_inset_x, stats.hitbox_inset_y),
            CollisionResponse::Push,
        )
        .with_velocity(Vec2::ZERO, stats.speed);
        let lifetime = match archetype {
            Archetype::Boss => Lifetime::new(now, Duration::MAX),
            _ => Lifetime::new(now, millis(balance.enemies.despawn_ms)),
        };
        let behavior = match archetype {
            Archetype::Melee => Behavior::Melee,
            Archetype::Flyer => Behavior::Flyer,
            Archetype::Skeleton => Behavior::Skeleton(SkeletonCycle::Cooldown { since: now }),
            Archetype::Boss => Behavior::Boss(BossBrain::new(now)),
        };

        Self {
            archetype,
            mover,
            health: stats.health,
            max_health: stats.health,
            contact_damage: stats.contact_damage,
            kill_reward: stats.kill_reward,
            lifetime,
            facing: Facing::Down,
            wander: Wander {
                move_dir: FALLBACK_DIRECTION,
                stuck_for: Duration::ZERO,
                last_center: center,
            },
            flash_started: None,
            flash_duration: millis(balance.enemies.flash_duration_ms),
            death_time: None,
            contact_ready_at: now,
            behavior,
        }
    }

    /// Behaviour family.
    #[must_use]
    pub const fn archetype(&self) -> Archetype {
        self.archetype
    }

    /// Movement state.
    #[must_use]
    pub const fn mover(&self) -> &Mover {
        &self.mover
    }

    /// Collision bounds.
    #[must_use]
    pub const fn hitbox(&self) -> &Rect {
        self.mover.hitbox()
    }

    /// Visual bounds.
    #[must_use]
    pub const fn render_rect(&self) -> &Rect {
        self.mover.render_rect()
    }

    /// Centre of the hitbox.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.mover.center()
    }

    /// Current health.
    #[must_use]
    pub const fn health(&self) -> i32 {
        self.health
    }

    /// Health at spawn.
    #[must_use]
    pub const fn max_health(&self) -> i32 {
        self.max_health
    }

    /// Money credited when the enemy dies.
    #[must_use]
    pub const fn kill_reward(&self) -> u32 {
        self.kill_reward
    }

    /// Four-way facing derived from the direction toward the player.
    #[must_use]
    pub const fn facing(&self) -> Facing {
        self.facing
    }

    /// Persistent wander direction.
    #[must_use]
    pub const fn move_dir(&self) -> Vec2 {
        self.wander.move_dir
    }

    /// Current movement speed.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.mover.speed()
    }

    /// Simulation time of death, if dead.
    #[must_use]
    pub const fn death_time(&self) -> Option<Duration> {
        self.death_time
    }

    /// Reports whether the hit flash is showing at `now`.
    #[must_use]
    pub fn is_flashing(&self, now: Duration) -> bool {
        self.flash_started
            .is_some_and(|started| now.saturating_sub(started) <= self.flash_duration)
    }

    /// Boss state machine, if this enemy is the boss.
    #[must_use]
    pub fn boss(&self) -> Option<&BossBrain> {
        match &self.behavior {
            Behavior::Boss(brain) => Some(brain),
            _ => None,
        }
    }

    /// Skeleton attack cycle, if this enemy is a skeleton.
    #[must_use]
    pub fn skeleton_cycle(&self) -> Option<SkeletonCycle> {
        match self.behavior {
            Behavior::Skeleton(cycle) => Some(cycle),
            _ => None,
        }
    }

    /// Multiplies the movement speed by `factor`.
    pub fn multiply_speed(&mut self, factor: f32) {
        self.mover.set_speed(self.mover.speed() * factor);
    }

    /// Divides the movement speed by `factor`.
    pub fn divide_speed(&mut self, factor: f32) {
        if factor != 0.0 {
            self.mover.set_speed(self.mover.speed() / factor);
        }
    }

    /// Teleports the enemy so its hitbox is centred on `center`.
    pub fn place_at(&mut self, center: Vec2) {
        self.mover.place_at(center);
        self.wander.last_center = center;
    }
}

impl Damageable for Enemy {
    fn take_hit(&mut self, amount: i32, now: Duration) -> HitOutcome {
        if self.death_time.is_some() {
            return HitOutcome::Ignored;
        }
        self.health -= amount;
        self.flash_started = Some(now);
        if self.health <= 0 {
            self.death_time = Some(now);
            HitOutcome::Killed
        } else {
            HitOutcome::Wounded {
                remaining: self.health,
            }
        }
    }

    fn is_alive(&self) -> bool {
        self.death_time.is_none()
    }
}

fn stats_for(archetype: Archetype, balance: &Balance) -> &ArchetypeBalance {
    match archetype {
        Archetype::Melee => &balance.enemies.melee,
        Archetype::Flyer => &balance.enemies.flyer,
        Archetype::Skeleton => &balance.enemies.skeleton,
        Archetype::Boss => &balance.boss.body,
    }
}

/// Adds an enemy to `enemies` unless the regular population cap is reached.
///
/// The boss ignores the cap.
pub fn spawn_enemy(
    enemies: &mut Arena<EnemyId, Enemy>,
    archetype: Archetype,
    center: Vec2,
    now: Duration,
    balance: &Balance,
) -> Option<EnemyId> {
    if archetype != Archetype::Boss && enemies.len() >= balance.enemies.max_population {
        debug!(?archetype, "enemy population cap reached");
        return None;
    }
    Some(enemies.insert(Enemy::spawn(archetype, center, now, balance)))
}

/// Applies one hit to `enemy`, crediting the kill and releasing it from its
/// room when the hit is lethal.
pub fn strike(
    id: EnemyId,
    enemy: &mut Enemy,
    amount: i32,
    now: Duration,
    economy: &mut dyn EconomySink,
    rooms: &mut dyn RoomRegistry,
) -> HitOutcome {
    let outcome = enemy.take_hit(amount, now);
    if outcome == HitOutcome::Killed {
        economy.credit_kill(enemy.kill_reward);
        rooms.release_enemy(id);
        debug!(enemy = id.get(), archetype = ?enemy.archetype, "enemy killed");
    }
    outcome
}

/// Why an enemy leaves the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The death pose has been shown long enough.
    Corpse,
    /// The enemy outlived its despawn timer.
    Despawned,
}

/// Side effects requested by the enemy system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AiAction {
    /// Launch a hostile projectile.
    Fire {
        /// Enemy that fired.
        enemy: EnemyId,
        /// Kind of projectile.
        kind: ProjectileKind,
        /// Launch point.
        origin: Vec2,
        /// Unit direction of travel.
        direction: Vec2,
    },
    /// Damage the player.
    DamagePlayer {
        /// Enemy responsible.
        enemy: EnemyId,
        /// Damage to apply.
        amount: i32,
    },
    /// The boss has been defeated.
    Victory {
        /// Boss handle.
        enemy: EnemyId,
    },
    /// The boss entered a new phase.
    PhaseChanged {
        /// Boss handle.
        enemy: EnemyId,
        /// Phase entered.
        phase: BossPhase,
    },
    /// The boss entered a new attack state.
    StateChanged {
        /// Boss handle.
        enemy: EnemyId,
        /// State entered.
        state: BossState,
    },
    /// Remove the enemy at the end of the tick.
    Remove {
        /// Enemy to remove.
        enemy: EnemyId,
        /// Reason for the removal.
        reason: Removal,
    },
}

/// Read-only facts the enemy system needs for one tick.
#[derive(Clone, Copy, Debug)]
pub struct AiContext<'a> {
    /// Simulation time after the tick's clock advance.
    pub now: Duration,
    /// Length of the tick.
    pub dt: Duration,
    /// Player hitbox.
    pub player: Rect,
    /// Static colliders of the current map.
    pub colliders: &'a [StaticCollider],
    /// Balance set of the run.
    pub balance: &'a Balance,
}

/// Enemy behaviour system that reuses its flocking snapshot between ticks.
#[derive(Debug, Default)]
pub struct EnemyAi {
    flyers: Vec<(EnemyId, Vec2)>,
}

impl EnemyAi {
    /// Creates the system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates every enemy in insertion order.
    ///
    /// The output buffer is cleared before being filled. Removals are only
    /// requested; the caller deletes entries once the tick completes.
    pub fn update(
        &mut self,
        enemies: &mut Arena<EnemyId, Enemy>,
        ctx: &AiContext<'_>,
        out: &mut Vec<AiAction>,
    ) {
        out.clear();

        self.flyers.clear();
        self.flyers.extend(
            enemies
                .iter()
                .filter(|(_, enemy)| enemy.archetype == Archetype::Flyer && enemy.is_alive())
                .map(|(id, enemy)| (id, enemy.center())),
        );

        for (id, enemy) in enemies.iter_mut() {
            if matches!(enemy.behavior, Behavior::Boss(_)) {
                update_boss(id, enemy, ctx, out);
            } else {
                self.update_regular(id, enemy, ctx, out);
            }
        }
    }

    fn update_regular(
        &self,
        id: EnemyId,
        enemy: &mut Enemy,
        ctx: &AiContext<'_>,
        out: &mut Vec<AiAction>,
    ) {
        let tuning = &ctx.balance.enemies;
        if enemy.is_alive() {
            match enemy.behavior {
                Behavior::Melee => chase(enemy, ctx),
                Behavior::Flyer => self.swarm(id, enemy, ctx),
                Behavior::Skeleton(cycle) => {
                    let next = skeleton_step(id, enemy, cycle, ctx, out);
                    enemy.behavior = Behavior::Skeleton(next);
                }
                Behavior::Boss(_) => {}
            }
            contact(id, enemy, ctx, out);
        }

        if corpse_expired(enemy, ctx.now, millis(tuning.death_duration_ms)) {
            out.push(AiAction::Remove {
                enemy: id,
                reason: Removal::Corpse,
            });
        } else if enemy.lifetime.expired(ctx.now) {
            out.push(AiAction::Remove {
                enemy: id,
                reason: Removal::Despawned,
            });
        }
    }

    /// Flies straight at the player, bending away from nearby flyers.
    fn swarm(&self, id: EnemyId, enemy: &mut Enemy, ctx: &AiContext<'_>) {
        let center = enemy.center();
        let toward = normalize_or(ctx.player.center() - center, FALLBACK_DIRECTION);
        let radius = ctx.balance.enemies.flock_radius;

        let mut separation = Vec2::ZERO;
        for (other, other_center) in &self.flyers {
            if *other == id {
                continue;
            }
            let offset = center - *other_center;
            let distance = offset.length();
            if distance < radius {
                separation += normalize_or(offset, FALLBACK_DIRECTION) * (radius - distance);
            }
        }

        let speed = enemy.mover.speed();
        enemy
            .mover
            .set_direction(normalize_or(toward * speed + separation, toward));
        enemy.mover.step_free(ctx.dt.as_secs_f32());
        enemy.facing = Facing::from_direction(toward);
    }
}

fn corpse_expired(enemy: &Enemy, now: Duration, death_duration: Duration) -> bool {
    enemy
        .death_time
        .is_some_and(|died| now.saturating_sub(died) >= death_duration)
}

/// Chases the player along the persistent wander direction.
///
/// A clear line of sight re-aims the wander direction at the player. While
/// sight is blocked the enemy keeps its wander direction and, once it has been
/// stuck for long enough, turns it a quarter turn. Nothing guarantees the
/// player is ever reached around arbitrary obstacles.
fn chase(enemy: &mut Enemy, ctx: &AiContext<'_>) {
    let tuning = &ctx.balance.enemies;
    let center = enemy.center();
    let target = ctx.player.center();
    let toward = normalize_or(target - center, FALLBACK_DIRECTION);
    let visible = has_line_of_sight(
        center,
        target,
        SightProbe::every(tuning.sight_step),
        ctx.colliders,
    );
    if visible {
        enemy.wander.move_dir = toward;
        enemy.wander.stuck_for = Duration::ZERO;
    }

    enemy.mover.set_direction(enemy.wander.move_dir);
    enemy.mover.step(ctx.dt.as_secs_f32(), ctx.colliders);

    let moved = enemy.center().distance(enemy.wander.last_center);
    enemy.wander.last_center = enemy.center();
    if moved < tuning.stuck_threshold {
        enemy.wander.stuck_for += ctx.dt;
    } else {
        enemy.wander.stuck_for = Duration::ZERO;
    }
    if enemy.wander.stuck_for > millis(tuning.stuck_timeout_ms) && !visible {
        enemy.wander.move_dir = rotate_quarter(enemy.wander.move_dir);
        enemy.wander.stuck_for = Duration::ZERO;
    }

    enemy.facing = Facing::from_direction(toward);
}

/// Advances the skeleton attack cycle, chasing only while cooling down.
fn skeleton_step(
    id: EnemyId,
    enemy: &mut Enemy,
    cycle: SkeletonCycle,
    ctx: &AiContext<'_>,
    out: &mut Vec<AiAction>,
) -> SkeletonCycle {
    let tuning = &ctx.balance.skeleton;
    match cycle {
        SkeletonCycle::Cooldown { since } => {
            if ctx.now.saturating_sub(since) >= millis(tuning.attack_cooldown_ms) {
                return SkeletonCycle::Telegraph { since: ctx.now };
            }
            chase(enemy, ctx);
            cycle
        }
        SkeletonCycle::Telegraph { since } => {
            if ctx.now.saturating_sub(since) < millis(tuning.shoot_pause_ms) {
                return cycle;
            }
            let origin = enemy.center();
            let direction = normalize_or(ctx.player.center() - origin, FALLBACK_DIRECTION);
            enemy.facing = Facing::from_direction(direction);
            out.push(AiAction::Fire {
                enemy: id,
                kind: ProjectileKind::Bone,
                origin,
                direction,
            });
            SkeletonCycle::Cooldown { since: ctx.now }
        }
    }
}

/// Deals contact damage when the enemy touches the player, once per cooldown.
fn contact(id: EnemyId, enemy: &mut Enemy, ctx: &AiContext<'_>, out: &mut Vec<AiAction>) {
    if enemy.contact_damage <= 0 || ctx.now < enemy.contact_ready_at {
        return;
    }
    if !enemy.hitbox().intersects(&ctx.player) {
        return;
    }
    enemy.contact_ready_at = ctx.now + millis(ctx.balance.enemies.contact_cooldown_ms);
    out.push(AiAction::DamagePlayer {
        enemy: id,
        amount: enemy.contact_damage,
    });
}

/// Runs one boss tick.
///
/// The victory call happens before the state update, so the tick on which
/// health reaches zero still runs one state update.
fn update_boss(id: EnemyId, enemy: &mut Enemy, ctx: &AiContext<'_>, out: &mut Vec<AiAction>) {
    let balance = &ctx.balance.boss;
    let health = enemy.health;
    let max_health = enemy.max_health;

    let Behavior::Boss(brain) = &mut enemy.behavior else {
        return;
    };
    if health <= 0 && brain.declare_victory() {
        out.push(AiAction::Victory { enemy: id });
    }

    let entered = brain.check_phase(health, max_health, balance);
    let idle = brain.is_idle();
    let (state, effect) = brain.advance(ctx.now, ctx.dt, balance);

    for phase in entered {
        enemy.multiply_speed(balance.phase_speed_multiplier);
        debug!(enemy = id.get(), phase = phase.number(), "boss phase changed");
        out.push(AiAction::PhaseChanged { enemy: id, phase });
    }

    if idle && enemy.is_alive() {
        chase(enemy, ctx);
    }

    if let Some(state) = state {
        debug!(enemy = id.get(), ?state, "boss state changed");
        out.push(AiAction::StateChanged { enemy: id, state });
    }

    let origin = enemy.center();
    let target = ctx.player.center();
    match effect {
        Some(BossEffect::Throw) => out.push(AiAction::Fire {
            enemy: id,
            kind: ProjectileKind::Rock,
            origin,
            direction: normalize_or(target - origin, FALLBACK_DIRECTION),
        }),
        Some(BossEffect::Smash) => {
            if smash_reaches(origin, enemy.facing, target, balance) {
                out.push(AiAction::DamagePlayer {
                    enemy: id,
                    amount: balance.smash_damage,
                });
            }
        }
        None => {}
    }

    if enemy.is_alive() {
        contact(id, enemy, ctx, out);
    } else if corpse_expired(enemy, ctx.now, millis(ctx.balance.enemies.death_duration_ms)) {
        out.push(AiAction::Remove {
            enemy: id,
            reason: Removal::Corpse,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarm_td_core::ColliderTag;

    fn context<'a>(
        now_ms: u64,
        player: Vec2,
        colliders: &'a [StaticCollider],
        balance: &'a Balance,
    ) -> AiContext<'a> {
        AiContext {
            now: Duration::from_millis(now_ms),
            dt: Duration::from_millis(16),
            player: Rect::from_center(player, Vec2::new(24.0, 32.0)),
            colliders,
            balance,
        }
    }

    #[test]
    fn health_drops_by_each_hit_and_dies_exactly_at_zero() {
        let balance = Balance::default();
        let mut enemy = Enemy::spawn(Archetype::Melee, Vec2::ZERO, Duration::ZERO, &balance);
        let now = Duration::from_millis(10);
        assert_eq!(enemy.take_hit(2, now), HitOutcome::Wounded { remaining: 3 });
        assert_eq!(enemy.take_hit(2, now), HitOutcome::Wounded { remaining: 1 });
        assert!(enemy.is_alive());
        assert_eq!(enemy.take_hit(1, now), HitOutcome::Killed);
        assert!(!enemy.is_alive());
        assert_eq!(enemy.take_hit(1, now), HitOutcome::Ignored);
        assert_eq!(enemy.health(), 0);
    }

    #[test]
    fn hit_starts_flash_window() {
        let balance = Balance::default();
        let mut enemy = Enemy::spawn(Archetype::Flyer, Vec2::ZERO, Duration::ZERO, &balance);
        let _ = enemy.take_hit(1, Duration::from_millis(1_000));
        assert!(enemy.is_flashing(Duration::from_millis(1_100)));
        assert!(!enemy.is_flashing(Duration::from_millis(1_101)));
    }

    #[test]
    fn melee_walks_toward_visible_player() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let id = spawn_enemy(&mut enemies, Archetype::Melee, Vec2::ZERO, Duration::ZERO, &balance)
            .expect("spawned");
        let ctx = context(16, Vec2::new(200.0, 0.0), &[], &balance);
        let mut out = Vec::new();

        EnemyAi::new().update(&mut enemies, &ctx, &mut out);

        let enemy = enemies.get(id).expect("alive");
        assert!(enemy.center().x > 1.5);
        assert_eq!(enemy.facing(), Facing::Right);
        assert!(out.is_empty());
    }

    #[test]
    fn stuck_enemy_turns_a_quarter_when_sight_is_blocked() {
        let balance = Balance::default();
        let colliders = [StaticCollider::new(
            Rect::new(20.0, -200.0, 20.0, 400.0),
            ColliderTag::Terrain,
        )];
        let mut enemies = Arena::new();
        let id = spawn_enemy(&mut enemies, Archetype::Melee, Vec2::ZERO, Duration::ZERO, &balance)
            .expect("spawned");
        let mut ai = EnemyAi::new();
        let mut out = Vec::new();

        for tick in 1..=20 {
            let ctx = context(tick * 16, Vec2::new(200.0, 0.0), &colliders, &balance);
            ai.update(&mut enemies, &ctx, &mut out);
        }

        let enemy = enemies.get(id).expect("alive");
        assert!(enemy.move_dir().x.abs() < 1e-6);
        assert!((enemy.move_dir().y.abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flyers_push_each_other_apart() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let a = spawn_enemy(
            &mut enemies,
            Archetype::Flyer,
            Vec2::new(0.0, -5.0),
            Duration::ZERO,
            &balance,
        )
        .expect("spawned");
        let b = spawn_enemy(
            &mut enemies,
            Archetype::Flyer,
            Vec2::new(0.0, 5.0),
            Duration::ZERO,
            &balance,
        )
        .expect("spawned");
        let ctx = context(16, Vec2::new(400.0, 0.0), &[], &balance);
        let mut out = Vec::new();

        EnemyAi::new().update(&mut enemies, &ctx, &mut out);

        let gap_after = enemies.get(b).map(Enemy::center).unwrap_or_default().y
            - enemies.get(a).map(Enemy::center).unwrap_or_default().y;
        assert!(gap_after > 10.0);
    }

    #[test]
    fn skeleton_stops_then_fires_once() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let id = spawn_enemy(
            &mut enemies,
            Archetype::Skeleton,
            Vec2::ZERO,
            Duration::ZERO,
            &balance,
        )
        .expect("spawned");
        let mut ai = EnemyAi::new();
        let mut out = Vec::new();
        let player = Vec2::new(300.0, 0.0);

        ai.update(&mut enemies, &context(2_000, player, &[], &balance), &mut out);
        assert!(matches!(
            enemies.get(id).and_then(Enemy::skeleton_cycle),
            Some(SkeletonCycle::Telegraph { .. })
        ));
        let frozen = enemies.get(id).map(Enemy::center);

        ai.update(&mut enemies, &context(2_400, player, &[], &balance), &mut out);
        assert!(out.is_empty());
        assert_eq!(enemies.get(id).map(Enemy::center), frozen);

        ai.update(&mut enemies, &context(2_500, player, &[], &balance), &mut out);
        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0],
            AiAction::Fire {
                kind: ProjectileKind::Bone,
                direction,
                ..
            } if direction == Vec2::new(1.0, 0.0)
        ));
    }

    #[test]
    fn contact_damage_respects_cooldown() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let _ = spawn_enemy(&mut enemies, Archetype::Flyer, Vec2::ZERO, Duration::ZERO, &balance);
        let mut ai = EnemyAi::new();
        let mut out = Vec::new();

        ai.update(&mut enemies, &context(16, Vec2::ZERO, &[], &balance), &mut out);
        assert!(matches!(out[..], [AiAction::DamagePlayer { amount: 1, .. }]));

        ai.update(&mut enemies, &context(32, Vec2::ZERO, &[], &balance), &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn regular_enemies_despawn_after_their_lifetime() {
        let balance = Balance::default();
        let mut enemies = Arena::new();
        let id = spawn_enemy(&mut enemies, Archetype::Melee, Vec2::ZERO, Duration::ZERO, &balance)
            .expect("spawned");
        let mut out = Vec::new();
        EnemyAi::new().update(
            &mut enemies,
            &context(20_000, Vec2::new(5_000.0, 0.0), &[], &balance),
            &mut out,
        );
        assert_eq!(
            out,
            vec![AiAction::Remove {
                enemy: id,
                reason: Removal::Despawned
            }]
        );
    }

    #[test]
    fn population_cap_refuses_extra_spawns() {
        let mut balance = Balance::default();
        balance.enemies.max_population = 2;
        let mut enemies = Arena::new();
        let (at, now) = (Vec2::ZERO, Duration::ZERO);
        let mut spawn = |archetype| spawn_enemy(&mut enemies, archetype, at, now, &balance);
        for _ in 0..2 {
            assert!(spawn(Archetype::Melee).is_some());
        }
        assert!(spawn(Archetype::Flyer).is_none());
        assert!(spawn(Archetype::Boss).is_some());
    }
}
