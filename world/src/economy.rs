//! Money, kill counting and run-level transitions requested by the systems.

use swarm_td_core::{EconomySink, GameFlow};

/// Player purse and kill counter.
#[derive(Debug)]
pub(crate) struct Economy {
    money: u32,
    kills: u32,
}

impl Economy {
    pub(crate) const fn new(money: u32) -> Self {
        Self { money, kills: 0 }
    }

    pub(crate) const fn money(&self) -> u32 {
        self.money
    }

    pub(crate) const fn kills(&self) -> u32 {
        self.kills
    }

    /// Adds money that was not earned by a kill.
    pub(crate) fn grant(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }
}

impl EconomySink for Economy {
    fn credit_kill(&mut self, reward: u32) {
        self.money = self.money.saturating_add(reward);
        self.kills = self.kills.saturating_add(1);
    }

    fn try_spend(&mut self, cost: u32) -> bool {
        match self.money.checked_sub(cost) {
            Some(left) => {
                self.money = left;
                true
            }
            None => false,
        }
    }

    fn refund(&mut self, amount: u32) {
        self.grant(amount);
    }
}

/// Transitions requested during a tick, applied once the tick completes.
#[derive(Debug, Default)]
pub(crate) struct RunFlow {
    victory: bool,
    boss_room: bool,
}

impl RunFlow {
    /// Takes the pending victory flag.
    pub(crate) fn take_victory(&mut self) -> bool {
        std::mem::take(&mut self.victory)
    }

    /// Takes the pending boss room request.
    pub(crate) fn take_boss_room(&mut self) -> bool {
        std::mem::take(&mut self.boss_room)
    }
}

impl GameFlow for RunFlow {
    fn declare_victory(&mut self) {
        self.victory = true;
    }

    fn request_boss_room(&mut self) {
        self.boss_room = true;
    }
}
