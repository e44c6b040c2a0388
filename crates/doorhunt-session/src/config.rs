//! Per-engine session settings.

use doorhunt_clock::ClockConfig;
use doorhunt_types::LocationRef;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings shared by every session an engine runs.
///
/// Durations are counted in ticks of [`ClockConfig::tick`] (one second by
/// default), the same unit arena phase durations use.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Length of the cooldown phase after a round ends.
    pub end_cooldown_secs: u32,
    /// Pause between the end-of-round announcement and the cooldown.
    pub announce_delay_secs: u32,
    /// Where players go when they leave or a round resets. Falls back to
    /// the arena's lobby when unset.
    pub return_location: Option<LocationRef>,
    pub clock: ClockConfig,
    /// Capacity of each session actor's command inbox.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            end_cooldown_secs: 10,
            announce_delay_secs: 1,
            return_location: None,
            clock: ClockConfig::default(),
            command_buffer: 64,
        }
    }
}

impl SessionConfig {
    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        self.clock = self.clock.validated();
        if self.command_buffer == 0 {
            warn!("command_buffer must be at least 1, clamping");
            self.command_buffer = 1;
        }
        self
    }
}
