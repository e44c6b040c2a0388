//! Engine configuration.

use doorhunt_arena::ArenaDefaults;
use doorhunt_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::DoorHuntError;

/// Everything tunable about an engine, loadable from JSON.
///
/// ```
/// use doorhunt::EngineConfig;
///
/// let config = EngineConfig::from_json_str(r#"{
///     "end_cooldown_secs": 5,
///     "clock": { "tick": 250 },
///     "arena_defaults": { "min_players": 4 }
/// }"#).unwrap();
///
/// assert_eq!(config.session.end_cooldown_secs, 5);
/// assert_eq!(config.session.clock.tick.as_millis(), 250);
/// assert_eq!(config.arena_defaults.min_players, 4);
/// assert_eq!(config.arena_defaults.max_players, 16);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Session timing, clock, and inbox settings.
    #[serde(flatten)]
    pub session: SessionConfig,
    /// Values newly created arenas start with.
    pub arena_defaults: ArenaDefaults,
}

impl EngineConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, DoorHuntError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        self.session = self.session.validated();
        if self.arena_defaults.min_players == 0 {
            tracing::warn!("arena_defaults.min_players must be at least 1, clamping");
            self.arena_defaults.min_players = 1;
        }
        if self.arena_defaults.max_players < self.arena_defaults.min_players {
            tracing::warn!(
                min = self.arena_defaults.min_players,
                max = self.arena_defaults.max_players,
                "arena_defaults.max_players below min_players, raising"
            );
            self.arena_defaults.max_players = self.arena_defaults.min_players;
        }
        self
    }
}
