//! Arena configuration.

use doorhunt_types::{ArenaId, LocationRef};
use serde::{Deserialize, Serialize};

use crate::ArenaError;

// ---------------------------------------------------------------------------
// ArenaDefaults
// ---------------------------------------------------------------------------

/// Values a freshly created arena starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaDefaults {
    pub min_players: usize,
    pub max_players: usize,
    pub recruit_countdown_secs: u32,
    pub prepare_secs: u32,
    pub hide_secs: u32,
    pub live_secs: u32,
}

impl Default for ArenaDefaults {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 16,
            recruit_countdown_secs: 60,
            prepare_secs: 10,
            hide_secs: 30,
            live_secs: 3600,
        }
    }
}

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// Everything a session needs to know about its venue.
///
/// Sessions hold this behind an `Arc` and never mutate it; edits go through
/// the [`ArenaRegistry`](crate::ArenaRegistry) and produce a new snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaConfig {
    pub id: ArenaId,
    pub display_name: String,
    /// Players needed before the recruiting countdown starts. At least 1.
    pub min_players: usize,
    /// Roster capacity. Never below `min_players`.
    pub max_players: usize,
    pub recruit_countdown_secs: u32,
    pub prepare_secs: u32,
    pub hide_secs: u32,
    pub live_secs: u32,
    /// Where joining players wait for the round to start.
    pub lobby: Option<LocationRef>,
    /// Where evaders are placed for hiding, and where hunters are released.
    pub evader_spawn: Option<LocationRef>,
    /// Where hunters are held during the hiding phase.
    pub hunter_holding: Option<LocationRef>,
}

impl ArenaConfig {
    /// Creates an unconfigured arena (no locations) from defaults.
    pub fn new(id: ArenaId, display_name: impl Into<String>, defaults: &ArenaDefaults) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            min_players: defaults.min_players,
            max_players: defaults.max_players,
            recruit_countdown_secs: defaults.recruit_countdown_secs,
            prepare_secs: defaults.prepare_secs,
            hide_secs: defaults.hide_secs,
            live_secs: defaults.live_secs,
            lobby: None,
            evader_spawn: None,
            hunter_holding: None,
        }
    }

    /// Returns `true` when all three locations are set.
    pub fn is_configured(&self) -> bool {
        self.lobby.is_some() && self.evader_spawn.is_some() && self.hunter_holding.is_some()
    }

    /// Checks the player-limit invariant `1 <= min <= max`.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.min_players == 0 {
            return Err(ArenaError::InvalidConfig(format!(
                "min_players must be at least 1 for arena {}",
                self.id
            )));
        }
        if self.min_players > self.max_players {
            return Err(ArenaError::InvalidConfig(format!(
                "min_players {} exceeds max_players {} for arena {}",
                self.min_players, self.max_players, self.id
            )));
        }
        Ok(())
    }
}
