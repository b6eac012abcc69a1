#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Axis-separated collision resolution and the mover contract shared by
//! bullets, enemies and the player.
//!
//! Movers integrate one axis at a time and resolve against the static
//! collider set after each axis. Resolving horizontally before vertically lets
//! movers slide along walls at the cost of occasional corner snagging; callers
//! rely on that ordering, so it is not a continuous sweep.

use std::{fmt::Debug, time::Duration};

use swarm_td_core::{normalize_or, Rect, StaticCollider, Vec2, FALLBACK_DIRECTION};

/// Edge length of the square probe used by line-of-sight sampling.
pub const PROBE_SIZE: f32 = 2.0;

/// Axis along which a resolution pass corrects the mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    /// Corrects the `x` coordinate only.
    Horizontal,
    /// Corrects the `y` coordinate only.
    Vertical,
}

/// Policy a mover follows when it runs into a static collider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionResponse {
    /// Snap flush to the obstacle and invert the matching direction component.
    Reflect,
    /// Clamp against the obstacle in the direction of travel and keep going.
    Push,
}

/// Continuous-space entity that moves through the static collider set.
#[derive(Clone, Debug, PartialEq)]
pub struct Mover {
    hitbox: Rect,
    previous: Rect,
    render: Rect,
    direction: Vec2,
    speed: f32,
    response: CollisionResponse,
}

impl Mover {
    /// Creates a stationary mover whose render bounds are centred on `center`.
    ///
    /// The hitbox is the render rectangle shrunk by `inset` on every side.
    #[must_use]
    pub fn new(center: Vec2, render_size: Vec2, inset: Vec2, response: CollisionResponse) -> Self {
        let render = Rect::from_center(center, render_size);
        let hitbox = render.inflate(-2.0 * inset.x, -2.0 * inset.y);
        Self {
            hitbox,
            previous: hitbox,
            render,
            direction: Vec2::ZERO,
            speed: 0.0,
            response,
        }
    }

    /// Creates a mover whose hitbox matches its render bounds.
    #[must_use]
    pub fn square(center: Vec2, size: f32, response: CollisionResponse) -> Self {
        Self::new(center, Vec2::splat(size), Vec2::ZERO, response)
    }

    /// Returns the mover with the provided direction and speed.
    #[must_use]
    pub fn with_velocity(mut self, direction: Vec2, speed: f32) -> Self {
        self.direction = direction;
        self.speed = speed;
        self
    }

    /// Collision bounds.
    #[must_use]
    pub const fn hitbox(&self) -> &Rect {
        &self.hitbox
    }

    /// Collision bounds captured at the start of the latest step.
    #[must_use]
    pub const fn previous(&self) -> &Rect {
        &self.previous
    }

    /// Visual bounds, centred on the hitbox.
    #[must_use]
    pub const fn render_rect(&self) -> &Rect {
        &self.render
    }

    /// Centre of the hitbox.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.hitbox.center()
    }

    /// Current direction of travel.
    #[must_use]
    pub const fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Current speed in pixels per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Collision policy of the mover.
    #[must_use]
    pub const fn response(&self) -> CollisionResponse {
        self.response
    }

    /// Replaces the direction of travel.
    pub fn set_direction(&mut self, direction: Vec2) {
        self.direction = direction;
    }

    /// Replaces the speed.
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Teleports the mover so its hitbox is centred on `center`.
    pub fn place_at(&mut self, center: Vec2) {
        self.hitbox.set_center(center);
        self.previous = self.hitbox;
        self.render.set_center(center);
    }

    /// Advances the mover by `dt` seconds, resolving each axis against `colliders`.
    pub fn step(&mut self, dt: f32, colliders: &[StaticCollider]) {
        self.previous = self.hitbox;

        let dx = self.direction.x * self.speed * dt;
        self.hitbox.translate(Vec2::new(dx, 0.0));
        resolve_axis(self, colliders, Axis::Horizontal);

        let dy = self.direction.y * self.speed * dt;
        self.hitbox.translate(Vec2::new(0.0, dy));
        resolve_axis(self, colliders, Axis::Vertical);

        self.sync_render();
    }

    /// Advances the mover by `dt` seconds ignoring static colliders.
    pub fn step_free(&mut self, dt: f32) {
        self.previous = self.hitbox;
        self.hitbox.translate(self.direction * self.speed * dt);
        self.sync_render();
    }

    /// Shifts the mover by an explicit displacement ignoring static colliders.
    pub fn displace(&mut self, delta: Vec2) {
        self.previous = self.hitbox;
        self.hitbox.translate(delta);
        self.sync_render();
    }

    fn sync_render(&mut self) {
        self.render.set_center(self.hitbox.center());
    }
}

/// Corrects `mover` along `axis` against every collider it currently overlaps.
///
/// Colliders that do not intersect the hitbox are skipped. Each overlapping
/// collider is handled in slice order, so an earlier correction may clear a
/// later overlap.
pub fn resolve_axis(mover: &mut Mover, colliders: &[StaticCollider], axis: Axis) {
    for collider in colliders {
        let obstacle = collider.rect();
        if !obstacle.intersects(&mover.hitbox) {
            continue;
        }

        match (mover.response, axis) {
            (CollisionResponse::Reflect, Axis::Horizontal) => {
                if mover.hitbox.right() >= obstacle.left()
                    && mover.previous.right() <= obstacle.left()
                {
                    mover.hitbox.set_right(obstacle.left());
                    mover.direction.x = -mover.direction.x;
                }
                if mover.hitbox.left() <= obstacle.right()
                    && mover.previous.left() >= obstacle.right()
                {
                    mover.hitbox.set_left(obstacle.right());
                    mover.direction.x = -mover.direction.x;
                }
            }
            (CollisionResponse::Reflect, Axis::Vertical) => {
                if mover.hitbox.bottom() >= obstacle.top()
                    && mover.previous.bottom() <= obstacle.top()
                {
                    mover.hitbox.set_bottom(obstacle.top());
                    mover.direction.y = -mover.direction.y;
                }
                if mover.hitbox.top() <= obstacle.bottom()
                    && mover.previous.top() >= obstacle.bottom()
                {
                    mover.hitbox.set_top(obstacle.bottom());
                    mover.direction.y = -mover.direction.y;
                }
            }
            (CollisionResponse::Push, Axis::Horizontal) => {
                if mover.direction.x > 0.0 {
                    mover.hitbox.set_right(obstacle.left());
                }
                if mover.direction.x < 0.0 {
                    mover.hitbox.set_left(obstacle.right());
                }
            }
            (CollisionResponse::Push, Axis::Vertical) => {
                if mover.direction.y < 0.0 {
                    mover.hitbox.set_top(obstacle.bottom());
                }
                if mover.direction.y > 0.0 {
                    mover.hitbox.set_bottom(obstacle.top());
                }
            }
        }
    }
}

/// Finite lifetime measured against the simulation clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifetime {
    spawned_at: Duration,
    duration: Duration,
}

impl Lifetime {
    /// Creates a lifetime that started at `spawned_at`.
    #[must_use]
    pub const fn new(spawned_at: Duration, duration: Duration) -> Self {
        Self {
            spawned_at,
            duration,
        }
    }

    /// Simulation time at which the entity spawned.
    #[must_use]
    pub const fn spawned_at(&self) -> Duration {
        self.spawned_at
    }

    /// Time elapsed since spawn.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Duration {
        now.saturating_sub(self.spawned_at)
    }

    /// Reports whether the lifetime has run out at `now`.
    #[must_use]
    pub fn expired(&self, now: Duration) -> bool {
        self.elapsed(now) >= self.duration
    }

    /// Fraction of the lifetime consumed, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Sampling parameters for line-of-sight checks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SightProbe {
    step: f32,
    size: f32,
}

impl SightProbe {
    /// Creates a probe that samples every `step` pixels with a square of `size`.
    #[must_use]
    pub fn new(step: f32, size: f32) -> Self {
        Self {
            step: step.max(f32::EPSILON),
            size,
        }
    }

    /// Creates a probe with the default probe size.
    #[must_use]
    pub fn every(step: f32) -> Self {
        Self::new(step, PROBE_SIZE)
    }
}

/// Reports whether the straight segment from `from` to `to` is clear of `colliders`.
///
/// The segment is sampled every `probe.step` pixels starting at `from`; each
/// sample tests a small square anchored at the sample point. Coincident
/// endpoints always see each other.
#[must_use]
pub fn has_line_of_sight(
    from: Vec2,
    to: Vec2,
    probe: SightProbe,
    colliders: &[StaticCollider],
) -> bool {
    let offset = to - from;
    let distance = offset.length();
    if distance <= f32::EPSILON {
        return true;
    }
    let direction = normalize_or(offset, FALLBACK_DIRECTION);

    let mut travelled = 0.0;
    while travelled < distance {
        let point = from + direction * travelled;
        let sample = Rect::new(point.x, point.y, probe.size, probe.size);
        if colliders
            .iter()
            .any(|collider| collider.rect().intersects(&sample))
        {
            return false;
        }
        travelled += probe.step;
    }
    true
}

/// Collects the colliders whose bounds touch the box spanning `from` and `to`
/// grown by `margin`.
///
/// The output buffer is cleared before being filled.
pub fn nearby_colliders(
    from: Vec2,
    to: Vec2,
    margin: f32,
    colliders: &[StaticCollider],
    out: &mut Vec<StaticCollider>,
) {
    out.clear();
    let area = Rect::spanning(from, to, margin);
    out.extend(colliders.iter().copied().filter(|collider| {
        let rect = collider.rect();
        area.left() <= rect.right()
            && area.right() >= rect.left()
            && area.top() <= rect.bottom()
            && area.bottom() >= rect.top()
    }));
}

/// Second-stage hit test applied after two rectangles overlap.
///
/// Presentation layers that own sprite masks may refine hits; the simulation
/// only requires the rectangle test.
pub trait HitRefinement: Debug {
    /// Confirms that `projectile` really touches `target`.
    fn confirm(&self, projectile: &Rect, target: &Rect) -> bool;
}

/// Refinement that accepts every rectangle overlap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RectangleHits;

impl HitRefinement for RectangleHits {
    fn confirm(&self, _projectile: &Rect, _target: &Rect) -> bool {
        true
    }
}

/// Returns the first candidate whose rectangle overlaps `probe` and passes `refinement`.
pub fn first_hit<K>(
    probe: &Rect,
    candidates: impl IntoIterator<Item = (K, Rect)>,
    refinement: &dyn HitRefinement,
) -> Option<K> {
    candidates
        .into_iter()
        .find(|(_, rect)| rect.intersects(probe) && refinement.confirm(probe, rect))
        .map(|(key, _)| key)
}
