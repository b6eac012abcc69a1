use std::time::Duration;

use swarm_td_core::{
    Arena, Archetype, Balance, BossPhase, BossState, Damageable, EnemyId, Rect, Vec2,
};
use swarm_td_system_enemy_ai::{spawn_enemy, AiAction, AiContext, Enemy, EnemyAi, Removal};

struct BossFixture {
    enemies: Arena<EnemyId, Enemy>,
    boss: EnemyId,
    ai: EnemyAi,
    out: Vec<AiAction>,
    balance: Balance,
}

impl BossFixture {
    fn new() -> Self {
        Self::with_balance(Balance::default())
    }

    fn with_balance(balance: Balance) -> Self {
        let mut enemies = Arena::new();
        let boss = spawn_enemy(
            &mut enemies,
            Archetype::Boss,
            Vec2::new(320.0, 140.0),
            Duration::ZERO,
            &balance,
        )
        .expect("boss ignores the population cap");
        Self {
            enemies,
            boss,
            ai: EnemyAi::new(),
            out: Vec::new(),
            balance,
        }
    }

    fn hit(&mut self, amount: i32) {
        let boss = self.enemies.get_mut(self.boss).expect("boss present");
        let _ = boss.take_hit(amount, Duration::from_millis(1));
    }

    fn tick(&mut self, now_ms: u64) -> &[AiAction] {
        let ctx = AiContext {
            now: Duration::from_millis(now_ms),
            dt: Duration::from_millis(16),
            player: Rect::from_center(Vec2::new(320.0, 420.0), Vec2::new(24.0, 32.0)),
            colliders: &[],
            balance: &self.balance,
        };
        self.ai.update(&mut self.enemies, &ctx, &mut self.out);
        &self.out
    }

    fn speed(&self) -> f32 {
        self.enemies.get(self.boss).map(Enemy::speed).unwrap_or_default()
    }
}

fn phase_changes(actions: &[AiAction]) -> Vec<BossPhase> {
    actions
        .iter()
        .filter_map(|action| match action {
            AiAction::PhaseChanged { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

#[test]
fn exactly_half_health_stays_in_phase_one() {
    let mut arena = BossFixture::new();
    arena.hit(250);
    assert!(phase_changes(arena.tick(16)).is_empty());
    assert_eq!(
        arena.enemies.get(arena.boss).and_then(Enemy::boss).map(|brain| brain.phase()),
        Some(BossPhase::One)
    );
}

#[test]
fn just_below_half_health_enters_phase_two_once() {
    let mut arena = BossFixture::new();
    let base_speed = arena.speed();
    arena.hit(251);

    assert_eq!(phase_changes(arena.tick(16)), vec![BossPhase::Two]);
    let boosted = arena.speed();
    assert!((boosted - base_speed * 1.5).abs() < 1e-4);

    assert!(phase_changes(arena.tick(32)).is_empty());
    assert!(phase_changes(arena.tick(48)).is_empty());
    assert_eq!(arena.speed(), boosted);
}

#[test]
fn lethal_tick_declares_victory_then_still_updates_state() {
    let mut arena = BossFixture::new();
    arena.hit(500);

    let actions = arena.tick(3_000).to_vec();
    assert!(matches!(actions.first(), Some(AiAction::Victory { .. })));
    assert!(actions.iter().any(|action| matches!(
        action,
        AiAction::StateChanged {
            state: BossState::ThrowPre,
            ..
        }
    )));

    let next = arena.tick(3_016).to_vec();
    assert!(!next
        .iter()
        .any(|action| matches!(action, AiAction::Victory { .. })));
    assert!(next.iter().any(|action| matches!(
        action,
        AiAction::Remove {
            reason: Removal::Corpse,
            ..
        }
    )));
}

#[test]
fn smash_hits_player_standing_in_the_cone() {
    let mut balance = Balance::default();
    balance.boss.body.speed = 0.0;
    let smash_damage = balance.boss.smash_damage;
    let mut arena = BossFixture::with_balance(balance);
    arena.hit(300);

    // Phase two unlocks the smash; the boss faces the player straight below it.
    let mut smashes = 0;
    let mut now = 16;
    while now <= 8_000 {
        smashes += arena
            .tick(now)
            .iter()
            .filter(|action| {
                matches!(action, AiAction::DamagePlayer { amount, .. } if *amount == smash_damage)
            })
            .count();
        now += 16;
    }
    assert_eq!(smashes, 1);
}
