//! Insertion-ordered entry table addressed by stable integer handles.

use std::{collections::BTreeMap, marker::PhantomData};

/// Handle type that can address an entry inside an [`Arena`].
pub trait ArenaKey: Copy {
    /// Builds a handle from its sequence number.
    fn from_index(index: usize) -> Self;

    /// Sequence number the handle carries.
    fn index(self) -> usize;
}

/// Entry table whose handles never get reused during a run.
///
/// Handles are issued from a monotonically increasing counter, so a handle
/// that outlived its entry resolves to `None` instead of aliasing a newer
/// one. Storage only holds live entries and iteration follows insertion
/// order.
#[derive(Clone, Debug)]
pub struct Arena<K, T> {
    entries: BTreeMap<usize, T>,
    next_index: usize,
    _key: PhantomData<fn() -> K>,
}

impl<K: ArenaKey, T> Arena<K, T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_index: 0,
            _key: PhantomData,
        }
    }

    /// Stores `value`, returning its handle.
    pub fn insert(&mut self, value: T) -> K {
        self.insert_with(|_| value)
    }

    /// Stores the value produced by `build`, which receives the handle in advance.
    pub fn insert_with(&mut self, build: impl FnOnce(K) -> T) -> K {
        let index = self.next_index;
        self.next_index += 1;
        let key = K::from_index(index);
        let _ = self.entries.insert(index, build(key));
        key
    }

    /// Looks up a live entry.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        self.entries.get(&key.index())
    }

    /// Looks up a live entry mutably.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        self.entries.get_mut(&key.index())
    }

    /// Reports whether `key` still refers to a stored entry.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.entries.contains_key(&key.index())
    }

    /// Removes and returns the entry behind `key`.
    pub fn remove(&mut self, key: K) -> Option<T> {
        self.entries.remove(&key.index())
    }

    /// Removes every entry for which `keep` returns `false`.
    pub fn retain(&mut self, mut keep: impl FnMut(K, &mut T) -> bool) {
        self.entries
            .retain(|index, value| keep(K::from_index(*index), value));
    }

    /// Drops every entry. Handles issued earlier stay dead.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the arena holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates live entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.entries
            .iter()
            .map(|(index, value)| (K::from_index(*index), value))
    }

    /// Iterates live entries mutably in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.entries
            .iter_mut()
            .map(|(index, value)| (K::from_index(*index), value))
    }

    /// Handles of all live entries in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        self.entries
            .keys()
            .map(|index| K::from_index(*index))
            .collect()
    }
}

impl<K: ArenaKey, T> Default for Arena<K, T> {
    fn default() -> Self {
        Self::new()
    }
}
