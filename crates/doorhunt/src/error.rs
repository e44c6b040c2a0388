//! Unified error type for DoorHunt.

use doorhunt_arena::ArenaError;
use doorhunt_session::SessionError;

/// Top-level error that wraps every layer's error.
///
/// `#[from]` on each variant lets `?` convert sub-crate errors directly.
#[derive(Debug, thiserror::Error)]
pub enum DoorHuntError {
    /// An arena could not be registered or edited.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// A session operation was rejected.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The engine configuration could not be parsed.
    #[error("invalid engine config: {0}")]
    Config(#[from] serde_json::Error),
}
