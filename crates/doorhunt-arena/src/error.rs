//! Error types for the arena layer.

use doorhunt_types::ArenaId;

/// Errors raised while reading or editing arena configuration.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// No arena is registered under this id.
    #[error("arena {0} not found")]
    Unknown(ArenaId),

    /// An arena with this id already exists.
    #[error("arena {0} already exists")]
    AlreadyExists(ArenaId),

    /// The key does not name any entry in the setting table.
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),

    /// The key does not name any entry in the location-slot table.
    #[error("unknown location slot '{0}'")]
    UnknownSlot(String),

    /// The value failed the setting's validator.
    #[error("value {value} is not valid for {key}")]
    InvalidValue { key: &'static str, value: i64 },

    /// The config as a whole violates an invariant (e.g. min > max).
    #[error("invalid arena config: {0}")]
    InvalidConfig(String),
}
