//! Collaborator contracts consumed by sessions.
//!
//! The engine doesn't render text, move players, or hand out equipment.
//! It calls out to three collaborators for that:
//!
//! - [`Notifier`]: chat broadcasts and status displays
//! - [`RosterSink`]: relocating players and resetting their state
//! - [`LoadoutProvider`]: equipping players for their role
//!
//! Every call is one-way. A collaborator that fails (returns `Err`) is
//! logged at the [`Services`] boundary and otherwise ignored: the round
//! keeps going. When an integration isn't available, bind the `Noop*`
//! implementation so the session's calls stay unconditional.

use std::sync::Arc;

use doorhunt_types::{ArenaId, LocationRef, PlayerId, Role, StatusUpdate};

/// A collaborator failed to carry out a request.
#[derive(Debug, thiserror::Error)]
#[error("{collaborator} failed: {reason}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub reason: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collaborator,
            reason: reason.into(),
        }
    }
}

/// Delivers text and status to players and displays.
///
/// Must tolerate any or all recipients being unreachable.
pub trait Notifier: Send + Sync + 'static {
    fn broadcast(
        &self,
        arena: &ArenaId,
        recipients: &[PlayerId],
        text: &str,
    ) -> Result<(), CollaboratorError>;

    /// Called on every tick and every phase transition.
    fn update_status(&self, status: &StatusUpdate) -> Result<(), CollaboratorError>;
}

/// Moves players around and clears their per-round state.
pub trait RosterSink: Send + Sync + 'static {
    fn relocate(&self, player: PlayerId, location: &LocationRef) -> Result<(), CollaboratorError>;

    fn reset_player_state(&self, player: PlayerId) -> Result<(), CollaboratorError>;
}

/// Grants role equipment. Called once each time a player becomes a hunter.
pub trait LoadoutProvider: Send + Sync + 'static {
    fn equip(&self, player: PlayerId, role: Role) -> Result<(), CollaboratorError>;
}

// ---------------------------------------------------------------------------
// Null objects
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn broadcast(&self, _: &ArenaId, _: &[PlayerId], _: &str) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn update_status(&self, _: &StatusUpdate) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRosterSink;

impl RosterSink for NoopRosterSink {
    fn relocate(&self, _: PlayerId, _: &LocationRef) -> Result<(), CollaboratorError> {
        Ok(())
    }

    fn reset_player_state(&self, _: PlayerId) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLoadout;

impl LoadoutProvider for NoopLoadout {
    fn equip(&self, _: PlayerId, _: Role) -> Result<(), CollaboratorError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// The collaborators a session talks to, resolved once at startup.
///
/// Cheap to clone. Its methods are the error boundary: failures are logged
/// with `warn!` and swallowed, so the state machine never sees them.
#[derive(Clone)]
pub struct Services {
    notifier: Arc<dyn Notifier>,
    roster: Arc<dyn RosterSink>,
    loadout: Arc<dyn LoadoutProvider>,
}

impl Default for Services {
    fn default() -> Self {
        Self::noop()
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

impl Services {
    pub fn new(
        notifier: Arc<dyn Notifier>,
        roster: Arc<dyn RosterSink>,
        loadout: Arc<dyn LoadoutProvider>,
    ) -> Self {
        Self {
            notifier,
            roster,
            loadout,
        }
    }

    /// Every collaborator bound to its null object.
    pub fn noop() -> Self {
        Self::new(
            Arc::new(NoopNotifier),
            Arc::new(NoopRosterSink),
            Arc::new(NoopLoadout),
        )
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_roster_sink(mut self, roster: Arc<dyn RosterSink>) -> Self {
        self.roster = roster;
        self
    }

    pub fn with_loadout(mut self, loadout: Arc<dyn LoadoutProvider>) -> Self {
        self.loadout = loadout;
        self
    }

    pub(crate) fn broadcast(&self, arena: &ArenaId, recipients: &[PlayerId], text: &str) {
        if recipients.is_empty() {
            return;
        }
        if let Err(e) = self.notifier.broadcast(arena, recipients, text) {
            tracing::warn!(%arena, error = %e, "broadcast failed");
        }
    }

    pub(crate) fn update_status(&self, status: &StatusUpdate) {
        if let Err(e) = self.notifier.update_status(status) {
            tracing::warn!(arena = %status.arena, error = %e, "status update failed");
        }
    }

    pub(crate) fn relocate(&self, player: PlayerId, location: Option<&LocationRef>) {
        let Some(location) = location else {
            tracing::warn!(%player, "no location to relocate to");
            return;
        };
        if let Err(e) = self.roster.relocate(player, location) {
            tracing::warn!(%player, %location, error = %e, "relocate failed");
        }
    }

    pub(crate) fn reset_player_state(&self, player: PlayerId) {
        if let Err(e) = self.roster.reset_player_state(player) {
            tracing::warn!(%player, error = %e, "player reset failed");
        }
    }

    pub(crate) fn equip(&self, player: PlayerId, role: Role) {
        if let Err(e) = self.loadout.equip(player, role) {
            tracing::warn!(%player, %role, error = %e, "equip failed");
        }
    }
}
