use proptest::prelude::*;
use swarm_td_core::{ColliderTag, Rect, StaticCollider, Vec2};
use swarm_td_system_collision::{CollisionResponse, Mover};

fn collider_strategy() -> impl Strategy<Value = StaticCollider> {
    (-40_i16..40, -40_i16..40, 4_i16..24, 4_i16..24).prop_map(|(x, y, width, height)| {
        StaticCollider::new(
            Rect::new(
                f32::from(x),
                f32::from(y),
                f32::from(width),
                f32::from(height),
            ),
            ColliderTag::Terrain,
        )
    })
}

proptest! {
    #[test]
    fn pushing_mover_never_ends_inside_a_collider(
        colliders in prop::collection::vec(collider_strategy(), 1..6),
        start_x in -80_i16..80,
        start_y in -80_i16..80,
        dx in -3_i16..=3,
        dy in -3_i16..=3,
    ) {
        let mut mover = Mover::square(
            Vec2::new(f32::from(start_x), f32::from(start_y)),
            6.0,
            CollisionResponse::Push,
        )
        .with_velocity(Vec2::new(f32::from(dx), f32::from(dy)), 1.0);

        prop_assume!(colliders
            .iter()
            .all(|collider| !collider.rect().intersects(mover.hitbox())));

        mover.step(1.0, &colliders);

        for collider in &colliders {
            prop_assert!(
                !collider.rect().intersects(mover.hitbox()),
                "mover {:?} overlaps {:?}",
                mover.hitbox(),
                collider.rect()
            );
        }
    }

    #[test]
    fn reflection_preserves_speed_and_flips_sign_only(
        offset in 1_i16..4,
        speed in 1_i16..6,
    ) {
        let wall = StaticCollider::new(Rect::new(10.0, -100.0, 8.0, 200.0), ColliderTag::Terrain);
        let start_x = 10.0 - 2.0 - f32::from(offset);
        let mut bullet = Mover::square(Vec2::new(start_x, 0.0), 4.0, CollisionResponse::Reflect)
            .with_velocity(Vec2::new(1.0, 0.0), f32::from(speed) + f32::from(offset));

        bullet.step(1.0, &[wall]);

        prop_assert_eq!(bullet.direction(), Vec2::new(-1.0, 0.0));
        prop_assert_eq!(bullet.hitbox().right(), 10.0);
    }
}

#[test]
fn corner_contact_resolves_horizontal_axis_first() {
    let wall = StaticCollider::new(Rect::new(10.0, 10.0, 20.0, 20.0), ColliderTag::Terrain);
    let mut mover = Mover::square(Vec2::new(5.0, 5.0), 6.0, CollisionResponse::Push)
        .with_velocity(Vec2::new(4.0, 4.0), 1.0);

    mover.step(1.0, &[wall]);

    // The horizontal pass passes freely; the vertical pass lands on the top edge.
    assert_eq!(mover.hitbox().left(), 6.0);
    assert_eq!(mover.hitbox().bottom(), 10.0);
}
