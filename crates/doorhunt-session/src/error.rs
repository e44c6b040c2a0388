//! Error types for the session layer.

use doorhunt_arena::ArenaError;
use doorhunt_types::{ArenaId, PlayerId};

/// Why a session operation was rejected.
///
/// Internal races (an elimination for a player who is no longer an evader,
/// a timer that fired after being superseded) are not errors; those
/// operations return [`Outcome::Ignored`](doorhunt_types::Outcome::Ignored).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The arena lacks one or more of its required locations.
    #[error("arena {0} is not fully configured")]
    ArenaNotConfigured(ArenaId),

    /// No arena is registered under this id.
    #[error("arena {0} not found")]
    ArenaUnknown(ArenaId),

    /// The player is already part of a session (this one or another).
    #[error("player {0} is already in a session")]
    AlreadyInSession(PlayerId),

    /// The player is not part of any session.
    #[error("player {0} is not in a session")]
    NotInSession(PlayerId),

    /// The roster is at the arena's maximum.
    #[error("session for arena {0} is full")]
    SessionFull(ArenaId),

    /// The round has already started; joins reopen after it resets.
    #[error("session for arena {0} is already running")]
    SessionBusy(ArenaId),

    /// A configuration edit failed validation.
    #[error("invalid argument: {0}")]
    ArgumentInvalid(String),

    /// The session actor has stopped or its inbox is closed.
    #[error("session for arena {0} is unavailable")]
    Unavailable(ArenaId),
}

impl From<ArenaError> for SessionError {
    fn from(err: ArenaError) -> Self {
        match err {
            ArenaError::Unknown(id) => Self::ArenaUnknown(id),
            other => Self::ArgumentInvalid(other.to_string()),
        }
    }
}
