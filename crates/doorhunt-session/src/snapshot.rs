//! Read-only views of a session for displays.

use std::collections::{BTreeMap, HashMap, HashSet};

use doorhunt_types::{ArenaId, Phase, PlayerId, RoundOutcome};
use serde::Serialize;

/// How the last round went. Kept until the next round assigns roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    pub outcome: RoundOutcome,
    /// Players with at least one credited kill, most kills first.
    pub leaderboard: Vec<(PlayerId, u32)>,
    /// Evaders still standing when the round ended, in join order.
    pub survivors: Vec<PlayerId>,
}

impl RoundSummary {
    pub(crate) fn new(
        outcome: RoundOutcome,
        roster: &[PlayerId],
        evaders: &HashSet<PlayerId>,
        kill_counts: &HashMap<PlayerId, u32>,
    ) -> Self {
        let mut leaderboard: Vec<(PlayerId, u32)> = kill_counts
            .iter()
            .filter(|(_, kills)| **kills > 0)
            .map(|(player, kills)| (*player, *kills))
            .collect();
        leaderboard.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        let survivors = roster
            .iter()
            .filter(|player| evaders.contains(player))
            .copied()
            .collect();

        Self {
            outcome,
            leaderboard,
            survivors,
        }
    }

    /// Announcement lines for the end of the round.
    pub fn lines(&self) -> Vec<String> {
        match self.outcome {
            RoundOutcome::HuntersWin => {
                let mut lines = vec!["Hunters win! Every evader was caught.".to_string()];
                lines.extend(
                    self.leaderboard
                        .iter()
                        .take(3)
                        .enumerate()
                        .map(|(rank, (player, kills))| {
                            format!("#{} {player}: {kills} catches", rank + 1)
                        }),
                );
                lines
            }
            RoundOutcome::EvadersWin => {
                let names: Vec<String> = self.survivors.iter().map(ToString::to_string).collect();
                vec![format!("Evaders win! Survivors: {}", names.join(", "))]
            }
        }
    }
}

/// Everything a display needs to draw one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub arena: ArenaId,
    pub display_name: String,
    pub phase: Phase,
    pub remaining_secs: u32,
    pub max_players: usize,
    /// In join order.
    pub roster: Vec<PlayerId>,
    /// In join order.
    pub hunters: Vec<PlayerId>,
    /// In join order.
    pub evaders: Vec<PlayerId>,
    pub kill_counts: BTreeMap<PlayerId, u32>,
    pub last_summary: Option<RoundSummary>,
}

/// Counters published after every session mutation.
///
/// Small and `Copy`, so the manager can aggregate across sessions without
/// asking each actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionStatus {
    pub phase: Phase,
    pub remaining_secs: u32,
    pub players: usize,
    pub max_players: usize,
    pub hunters: usize,
    pub evaders: usize,
}
