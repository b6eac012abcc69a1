//! Registry of player-built walls.

use std::collections::BTreeMap;

use swarm_td_core::{Rect, WallId};

/// Stores built walls and allocates their identifiers.
#[derive(Debug)]
pub(crate) struct WallRegistry {
    entries: BTreeMap<WallId, Rect>,
    next_wall_id: WallId,
}

impl WallRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_wall_id: WallId::new(0),
        }
    }

    /// Records a wall occupying `rect` and returns its identifier.
    pub(crate) fn insert(&mut self, rect: Rect) -> WallId {
        let id = self.next_wall_id;
        self.next_wall_id = WallId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, rect);
        id
    }

    /// Forgets the wall, returning its footprint when it existed.
    pub(crate) fn remove(&mut self, id: WallId) -> Option<Rect> {
        self.entries.remove(&id)
    }

    /// Drops every wall; identifiers keep counting up.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Walls in identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (WallId, &Rect)> {
        self.entries.iter().map(|(id, rect)| (*id, rect))
    }
}
