//! Round phases and display payloads.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ArenaId;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// The phase of a round.
///
/// ```text
/// Waiting ⇄ Countdown → Preparing → Hiding → Live → Ending → Cooldown → Waiting
/// ```
///
/// - **Waiting**: idle, fewer players than the arena minimum.
/// - **Countdown**: minimum reached, recruiting timer running.
/// - **Preparing**: roles assigned, fixed grace period.
/// - **Hiding**: evaders disperse, hunters held at the holding spawn.
/// - **Live**: hunters released, pursuit timer running.
/// - **Ending**: outcome computed, brief announce window.
/// - **Cooldown**: post-round grace period before everyone is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Waiting,
    Countdown,
    Preparing,
    Hiding,
    Live,
    Ending,
    Cooldown,
}

impl Phase {
    /// Returns `true` while the session still accepts joins.
    pub fn is_joinable(self) -> bool {
        matches!(self, Self::Waiting | Self::Countdown)
    }

    /// Returns `true` for phases in which eliminations count.
    pub fn is_active_play(self) -> bool {
        matches!(self, Self::Hiding | Self::Live)
    }

    /// Returns `true` once roles have been assigned for this round.
    pub fn is_running(self) -> bool {
        !self.is_joinable()
    }

    /// Label shown next to the remaining time on status displays.
    pub fn time_label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Countdown => "Starting in",
            Self::Preparing => "Hunters in",
            Self::Hiding => "Hide time",
            Self::Live => "Time remaining",
            Self::Ending => "Ended",
            Self::Cooldown => "Returning in",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Waiting => "Waiting",
            Self::Countdown => "Countdown",
            Self::Preparing => "Preparing",
            Self::Hiding => "Hiding",
            Self::Live => "Live",
            Self::Ending => "Ending",
            Self::Cooldown => "Cooldown",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// RoundOutcome
// ---------------------------------------------------------------------------

/// Which side won a completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Every evader was eliminated before the pursuit timer ran out.
    HuntersWin,
    /// At least one evader survived the pursuit timer.
    EvadersWin,
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HuntersWin => f.write_str("hunters win"),
            Self::EvadersWin => f.write_str("evaders win"),
        }
    }
}

// ---------------------------------------------------------------------------
// StatusUpdate
// ---------------------------------------------------------------------------

/// Per-tick status pushed to displays on every tick and transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub arena: ArenaId,
    pub phase: Phase,
    pub remaining_secs: u32,
    pub hunters: usize,
    pub evaders: usize,
}

impl StatusUpdate {
    /// Remaining time as `MM:SS`.
    pub fn clock_text(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}
