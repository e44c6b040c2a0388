//! Session manager: one session per arena, one session per player.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use doorhunt_arena::{ArenaConfig, ArenaRegistry};
use doorhunt_types::{ArenaId, LocationRef, Outcome, Phase, PlayerId};
use serde::Serialize;

use crate::actor::spawn_session;
use crate::{PlayerIndex, Services, SessionConfig, SessionError, SessionHandle, SessionSnapshot, SessionStatus};

/// A row of the arena list shown to players choosing where to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArenaListing {
    pub id: ArenaId,
    pub display_name: String,
    pub configured: bool,
    pub phase: Phase,
    pub players: usize,
    pub max_players: usize,
}

/// Routes membership and elimination events to the owning session.
///
/// Sessions are created lazily, at most one per arena, and kept alive
/// between rounds. The manager is `Sync`; share it behind an `Arc`.
pub struct SessionManager {
    arenas: Arc<ArenaRegistry>,
    sessions: DashMap<ArenaId, SessionHandle>,
    index: PlayerIndex,
    services: Services,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(arenas: Arc<ArenaRegistry>, services: Services, config: SessionConfig) -> Self {
        Self {
            arenas,
            sessions: DashMap::new(),
            index: PlayerIndex::new(),
            services,
            config: config.validated(),
        }
    }

    pub fn arenas(&self) -> &Arc<ArenaRegistry> {
        &self.arenas
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------------

    /// Returns the arena's session, starting one if none is running.
    pub fn get_or_create_session(&self, arena: &ArenaId) -> Result<SessionHandle, SessionError> {
        let config = self
            .arenas
            .get(arena)
            .ok_or_else(|| SessionError::ArenaUnknown(arena.clone()))?;
        Ok(self.session_for(config))
    }

    /// The arena's session, if one has been started.
    pub fn session(&self, arena: &ArenaId) -> Option<SessionHandle> {
        self.sessions.get(arena).map(|entry| entry.value().clone())
    }

    /// The arena whose session `player` belongs to.
    pub fn session_of(&self, player: PlayerId) -> Option<ArenaId> {
        self.index.get(player)
    }

    fn session_for(&self, arena: Arc<ArenaConfig>) -> SessionHandle {
        match self.sessions.entry(arena.id.clone()) {
            Entry::Occupied(mut existing) => {
                if existing.get().is_closed() {
                    tracing::warn!(arena = %arena.id, "session actor had stopped, restarting");
                    existing.insert(self.spawn(arena));
                }
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                tracing::info!(arena = %arena.id, "session created");
                slot.insert(self.spawn(arena)).clone()
            }
        }
    }

    fn spawn(&self, arena: Arc<ArenaConfig>) -> SessionHandle {
        spawn_session(
            arena,
            self.config.clone(),
            self.services.clone(),
            self.index.clone(),
        )
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Adds `player` to the arena's session.
    ///
    /// The player is claimed in the index before the session sees the
    /// join, so two concurrent joins for one player can't both land.
    pub async fn join(&self, player: PlayerId, arena: &ArenaId) -> Result<Outcome, SessionError> {
        let config = self
            .arenas
            .get(arena)
            .ok_or_else(|| SessionError::ArenaUnknown(arena.clone()))?;
        if !config.is_configured() {
            return Err(SessionError::ArenaNotConfigured(arena.clone()));
        }
        if self.index.reserve(player, arena.clone()).is_err() {
            return Err(SessionError::AlreadyInSession(player));
        }

        let handle = self.session_for(Arc::clone(&config));
        let result = handle.join(player, config).await;
        if result.is_err() {
            self.index.release(player, arena);
        }
        result
    }

    /// Removes `player` from their session, announcing the departure.
    pub async fn leave(&self, player: PlayerId) -> Result<Outcome, SessionError> {
        self.leave_inner(player, false).await
    }

    /// Removes `player` without a broadcast. Unknown players are ignored.
    pub async fn disconnect(&self, player: PlayerId) -> Result<Outcome, SessionError> {
        match self.leave_inner(player, true).await {
            Err(SessionError::NotInSession(_)) => Ok(Outcome::Ignored),
            other => other,
        }
    }

    async fn leave_inner(&self, player: PlayerId, silent: bool) -> Result<Outcome, SessionError> {
        let arena = self
            .index
            .get(player)
            .ok_or(SessionError::NotInSession(player))?;

        // The session releases the entry itself. An entry it doesn't know
        // about belongs to a join still in flight, so it's left alone here.
        let Some(handle) = self.session(&arena) else {
            return Err(SessionError::NotInSession(player));
        };
        let result = handle.leave(player, silent).await;
        if let Err(SessionError::Unavailable(_)) = result {
            self.index.release(player, &arena);
        }
        result
    }

    // -----------------------------------------------------------------------
    // Eliminations
    // -----------------------------------------------------------------------

    /// Routed by the victim's session. Unmapped victims are ignored.
    pub async fn eliminate(
        &self,
        attacker: PlayerId,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        match self.session_of_player(victim) {
            Some(handle) => handle.eliminate(attacker, victim).await,
            None => Ok(Outcome::Ignored),
        }
    }

    pub async fn record_attack(
        &self,
        attacker: PlayerId,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        match self.session_of_player(victim) {
            Some(handle) => handle.record_attack(attacker, victim).await,
            None => Ok(Outcome::Ignored),
        }
    }

    pub async fn resolve_indirect_elimination(
        &self,
        victim: PlayerId,
    ) -> Result<Outcome, SessionError> {
        match self.session_of_player(victim) {
            Some(handle) => handle.resolve_indirect_elimination(victim).await,
            None => Ok(Outcome::Ignored),
        }
    }

    fn session_of_player(&self, player: PlayerId) -> Option<SessionHandle> {
        let arena = self.index.get(player)?;
        self.session(&arena)
    }

    // -----------------------------------------------------------------------
    // Admin
    // -----------------------------------------------------------------------

    /// Aborts the arena's round. A no-op when no session exists.
    pub async fn force_end(&self, arena: &ArenaId) -> Result<Outcome, SessionError> {
        match self.session(arena) {
            Some(handle) => handle.force_end().await,
            None => Ok(Outcome::Ignored),
        }
    }

    pub fn create_arena(
        &self,
        arena: &ArenaId,
        display_name: &str,
    ) -> Result<Arc<ArenaConfig>, SessionError> {
        Ok(self.arenas.create(arena.clone(), display_name)?)
    }

    /// Removes an arena, shutting its session down first.
    pub async fn delete_arena(&self, arena: &ArenaId) -> Result<(), SessionError> {
        self.arenas.remove(arena)?;
        if let Some((_, handle)) = self.sessions.remove(arena) {
            if let Err(e) = handle.shutdown().await {
                tracing::debug!(%arena, error = %e, "session already stopped");
            }
        }
        Ok(())
    }

    /// Changes a numeric arena setting. Running rounds keep their snapshot.
    pub fn apply_setting(
        &self,
        arena: &ArenaId,
        key: &str,
        value: i64,
    ) -> Result<Arc<ArenaConfig>, SessionError> {
        Ok(self.arenas.apply_setting(arena, key, value)?)
    }

    pub fn set_location(
        &self,
        arena: &ArenaId,
        slot: &str,
        location: Option<LocationRef>,
    ) -> Result<Arc<ArenaConfig>, SessionError> {
        Ok(self.arenas.set_location(arena, slot, location)?)
    }

    pub fn set_display_name(
        &self,
        arena: &ArenaId,
        name: &str,
    ) -> Result<Arc<ArenaConfig>, SessionError> {
        Ok(self.arenas.set_display_name(arena, name)?)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Sessions past the recruiting stage.
    pub fn active_round_count(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().status().phase.is_running())
            .count()
    }

    /// Players on any session's roster, as last published.
    ///
    /// Joins still waiting on their session aren't counted.
    pub fn players_in_rounds_count(&self) -> usize {
        self.sessions
            .iter()
            .map(|entry| entry.value().status().players)
            .sum()
    }

    pub fn status(&self, arena: &ArenaId) -> Option<SessionStatus> {
        self.session(arena).map(|handle| handle.status())
    }

    /// Full display snapshot, or `None` if no session has been started.
    pub async fn snapshot(&self, arena: &ArenaId) -> Option<SessionSnapshot> {
        let handle = self.session(arena)?;
        handle.snapshot().await.ok()
    }

    /// Every arena with its live session status, sorted by id.
    pub fn list_arenas(&self) -> Vec<ArenaListing> {
        self.arenas
            .list()
            .into_iter()
            .map(|arena| {
                let status = self.status(&arena.id).unwrap_or_default();
                ArenaListing {
                    id: arena.id.clone(),
                    display_name: arena.display_name.clone(),
                    configured: arena.is_configured(),
                    phase: status.phase,
                    players: status.players,
                    max_players: arena.max_players,
                }
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Shutdown
    // -----------------------------------------------------------------------

    /// Stops every session, returning all players out without broadcasts.
    pub async fn shutdown(&self) {
        let handles: Vec<SessionHandle> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        self.sessions.clear();

        for handle in handles {
            if let Err(e) = handle.shutdown().await {
                tracing::debug!(arena = %handle.arena(), error = %e, "session already stopped");
            }
        }
        tracing::info!(remaining_players = self.index.len(), "all sessions stopped");
    }
}
