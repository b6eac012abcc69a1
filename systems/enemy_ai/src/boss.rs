//! Phased attack state machine of the boss.

use std::time::Duration;

use swarm_td_core::{
    balance::{millis, BossBalance},
    geometry::signed_angle,
    BossPhase, BossState, Facing, Vec2,
};

/// Attack bookkeeping carried by the boss.
#[derive(Clone, Debug, PartialEq)]
pub struct BossBrain {
    phase: BossPhase,
    state: BossState,
    frame: f32,
    last_throw: Duration,
    last_smash: Duration,
    victory_declared: bool,
}

/// Side effects requested by one boss state update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BossEffect {
    Throw,
    Smash,
}

impl BossBrain {
    pub(crate) fn new(now: Duration) -> Self {
        Self {
            phase: BossPhase::One,
            state: BossState::Idle,
            frame: 0.0,
            last_throw: now,
            last_smash: now,
            victory_declared: false,
        }
    }

    /// Current health phase.
    #[must_use]
    pub const fn phase(&self) -> BossPhase {
        self.phase
    }

    /// Current attack state.
    #[must_use]
    pub const fn state(&self) -> BossState {
        self.state
    }

    /// Reports whether the smash cone overlay should be visible.
    #[must_use]
    pub const fn shows_cone(&self) -> bool {
        self.state.shows_cone()
    }

    /// Progress of the running attack animation in `[0, 1]`; zero while idle.
    #[must_use]
    pub fn animation_progress(&self, balance: &BossBalance) -> f32 {
        let frames = match self.state {
            BossState::Idle => return 0.0,
            BossState::ThrowPre | BossState::ThrowCast | BossState::ThrowRecover => {
                balance.throw_frame_count
            }
            BossState::SmashPre | BossState::SmashCast | BossState::SmashRecover => {
                balance.smash_frame_count
            }
        };
        if frames == 0 {
            return 1.0;
        }
        (self.frame / frames as f32).min(1.0)
    }

    /// Records the victory call, reporting whether it had not been made yet.
    pub(crate) fn declare_victory(&mut self) -> bool {
        !std::mem::replace(&mut self.victory_declared, true)
    }

    /// Advances the phase once per crossed threshold, returning the phases entered.
    pub(crate) fn check_phase(
        &mut self,
        health: i32,
        max_health: i32,
        balance: &BossBalance,
    ) -> Vec<BossPhase> {
        let ratio = if max_health > 0 {
            health as f32 / max_health as f32
        } else {
            0.0
        };
        let mut entered = Vec::new();
        if self.phase == BossPhase::One && ratio < balance.phase_two_ratio {
            self.phase = BossPhase::Two;
            entered.push(BossPhase::Two);
        }
        if self.phase == BossPhase::Two && ratio < balance.phase_three_ratio {
            self.phase = BossPhase::Three;
            entered.push(BossPhase::Three);
        }
        entered
    }

    /// Reports whether the idle state should keep chasing this tick.
    pub(crate) fn is_idle(&self) -> bool {
        self.state == BossState::Idle
    }

    /// Runs one state update. Returns the state entered, if any, and the
    /// attack released this tick.
    pub(crate) fn advance(
        &mut self,
        now: Duration,
        dt: Duration,
        balance: &BossBalance,
    ) -> (Option<BossState>, Option<BossEffect>) {
        let frames = balance.animation_fps * dt.as_secs_f32();
        match self.state {
            BossState::Idle => {
                let smash_ready = self.phase >= BossPhase::Two
                    && now.saturating_sub(self.last_smash) >= millis(balance.smash_cooldown_ms);
                let throw_ready =
                    now.saturating_sub(self.last_throw) >= millis(balance.throw_cooldown_ms);
                if smash_ready {
                    (self.enter(BossState::SmashPre), None)
                } else if throw_ready {
                    (self.enter(BossState::ThrowPre), None)
                } else {
                    (None, None)
                }
            }
            BossState::ThrowPre => {
                self.frame += frames;
                if self.frame >= balance.throw_hit_frame as f32 {
                    (self.switch(BossState::ThrowCast), None)
                } else {
                    (None, None)
                }
            }
            BossState::ThrowCast => (self.switch(BossState::ThrowRecover), Some(BossEffect::Throw)),
            BossState::ThrowRecover => {
                self.frame += frames;
                if self.frame >= balance.throw_frame_count as f32 {
                    self.last_throw = now;
                    (self.enter(BossState::Idle), None)
                } else {
                    (None, None)
                }
            }
            BossState::SmashPre => {
                self.frame += frames;
                if self.frame >= balance.smash_hit_frame as f32 {
                    (self.switch(BossState::SmashCast), None)
                } else {
                    (None, None)
                }
            }
            BossState::SmashCast => (self.switch(BossState::SmashRecover), Some(BossEffect::Smash)),
            BossState::SmashRecover => {
                self.frame += frames;
                if self.frame >= balance.smash_frame_count as f32 {
                    self.last_smash = now;
                    (self.enter(BossState::Idle), None)
                } else {
                    (None, None)
                }
            }
        }
    }

    /// Enters `state` with a fresh animation counter.
    fn enter(&mut self, state: BossState) -> Option<BossState> {
        self.frame = 0.0;
        self.switch(state)
    }

    /// Enters `state` keeping the animation counter.
    fn switch(&mut self, state: BossState) -> Option<BossState> {
        self.state = state;
        Some(state)
    }
}

/// Reports whether a smash from `origin` looking along `facing` reaches `target`.
#[must_use]
pub fn smash_reaches(origin: Vec2, facing: Facing, target: Vec2, balance: &BossBalance) -> bool {
    let to_target = target - origin;
    if to_target.length() > balance.smash_range {
        return false;
    }
    let angle = signed_angle(facing.unit(), to_target).abs().to_degrees();
    angle <= balance.smash_angle_deg / 2.0
}
