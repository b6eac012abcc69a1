//! Scripted player used by the headless runner.

use std::time::Duration;

use swarm_td_core::{Command, DefenseKind, Vec2};
use swarm_td_world::{query, World};

/// Minimum simulated time between two build attempts.
const BUILD_INTERVAL: Duration = Duration::from_secs(4);
/// Distance the autopilot keeps from the nearest enemy.
const STAND_OFF: f32 = 120.0;
/// Enemies closer than this are worth a turret.
const BUILD_RANGE: f32 = 250.0;
/// Targets closer than this count as reached.
const ARRIVAL: f32 = 4.0;

/// Chases targets, shoots the closest enemy and drops turrets when threatened.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    last_build: Option<Duration>,
}

impl Autopilot {
    /// Appends this frame's commands to `out`.
    pub(crate) fn plan(&mut self, world: &World, out: &mut Vec<Command>) {
        let player = query::player(world).position;
        let nearest = query::enemies(world)
            .into_iter()
            .filter(|enemy| enemy.alive)
            .map(|enemy| enemy.position)
            .min_by(|a, b| player.distance(*a).total_cmp(&player.distance(*b)));

        let Some(enemy) = nearest else {
            out.push(Command::SteerPlayer {
                direction: steer_toward(player, explore_target(world, player)),
            });
            return;
        };

        out.push(Command::FirePlayerShot { toward: enemy });
        let distance = player.distance(enemy);
        let direction = if distance < STAND_OFF {
            player - enemy
        } else {
            enemy - player
        };
        out.push(Command::SteerPlayer { direction });

        let now = query::clock(world);
        let ready = self
            .last_build
            .map_or(true, |last| now.saturating_sub(last) >= BUILD_INTERVAL);
        if ready && distance < BUILD_RANGE {
            self.last_build = Some(now);
            out.push(Command::PlaceDefense {
                kind: DefenseKind::Turret,
                position: player,
            });
        }
    }
}

/// Picks the next place worth walking to when no enemy is around.
fn explore_target(world: &World, player: Vec2) -> Option<Vec2> {
    if let Some((_, rect)) = query::pickups(world).first() {
        return Some(rect.center());
    }
    if let Some(portal) = query::portal(world) {
        return Some(portal.center());
    }
    query::rooms(world)
        .into_iter()
        .filter(|room| !room.cleared)
        .map(|room| room.bounds.center())
        .min_by(|a, b| player.distance(*a).total_cmp(&player.distance(*b)))
}

fn steer_toward(player: Vec2, target: Option<Vec2>) -> Vec2 {
    match target {
        Some(target) if player.distance(target) > ARRIVAL => target - player,
        _ => Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrived_autopilot_stands_still() {
        let player = Vec2::new(10.0, 10.0);
        assert_eq!(steer_toward(player, Some(Vec2::new(12.0, 10.0))), Vec2::ZERO);
        assert_eq!(steer_toward(player, None), Vec2::ZERO);
        assert_eq!(
            steer_toward(player, Some(Vec2::new(110.0, 10.0))),
            Vec2::new(100.0, 0.0)
        );
    }

    #[test]
    fn first_frame_steers_without_shooting() {
        let world = World::new(Default::default(), &mut Vec::new()).expect("defaults are valid");
        let mut autopilot = Autopilot::default();
        let mut commands = Vec::new();
        autopilot.plan(&world, &mut commands);
        assert!(matches!(commands.as_slice(), [Command::SteerPlayer { .. }]));
    }
}
