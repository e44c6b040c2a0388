//! Player → arena index shared by the manager and every session.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use doorhunt_types::{ArenaId, PlayerId};

/// Maps each player to the arena whose session they belong to.
///
/// A player is in at most one session at a time. The manager reserves an
/// entry before forwarding a join; sessions release entries themselves
/// whenever a player leaves or a round resets.
#[derive(Debug, Clone, Default)]
pub struct PlayerIndex {
    inner: Arc<DashMap<PlayerId, ArenaId>>,
}

impl PlayerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, player: PlayerId) -> Option<ArenaId> {
        self.inner.get(&player).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.inner.contains_key(&player)
    }

    /// Claims `player` for `arena`. Returns the current arena if the player
    /// is already claimed.
    pub fn reserve(&self, player: PlayerId, arena: ArenaId) -> Result<(), ArenaId> {
        match self.inner.entry(player) {
            Entry::Occupied(existing) => Err(existing.get().clone()),
            Entry::Vacant(slot) => {
                slot.insert(arena);
                Ok(())
            }
        }
    }

    /// Drops the mapping only if it still points at `arena`.
    pub fn release(&self, player: PlayerId, arena: &ArenaId) -> bool {
        self.inner
            .remove_if(&player, |_, current| current == arena)
            .is_some()
    }

    /// Players currently mapped to any session.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Players mapped to `arena`.
    pub fn players_in(&self, arena: &ArenaId) -> Vec<PlayerId> {
        self.inner
            .iter()
            .filter(|entry| entry.value() == arena)
            .map(|entry| *entry.key())
            .collect()
    }
}
