//! Hunter selection.

use doorhunt_types::PlayerId;
use rand::seq::SliceRandom;
use rand::Rng;

/// Result of splitting a roster into hunters and evaders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSplit {
    pub hunters: Vec<PlayerId>,
    pub evaders: Vec<PlayerId>,
}

/// Picks the hunter subset of a roster.
///
/// The roster is shuffled uniformly and the first
/// `max(1, round(len * ratio))` players become hunters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleAssigner {
    ratio: f64,
}

impl Default for RoleAssigner {
    fn default() -> Self {
        Self {
            ratio: Self::DEFAULT_HUNTER_RATIO,
        }
    }
}

impl RoleAssigner {
    /// One hunter for every five players.
    pub const DEFAULT_HUNTER_RATIO: f64 = 0.2;

    /// Creates an assigner with a custom hunter ratio, clamped to `0.0..=1.0`.
    pub fn with_ratio(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
        }
    }

    /// Number of hunters for a roster of `roster_size`. Never below 1.
    pub fn hunter_count(&self, roster_size: usize) -> usize {
        let scaled = (roster_size as f64 * self.ratio).round() as usize;
        scaled.max(1)
    }

    /// Shuffles `roster` with `rng` and splits it.
    pub fn assign<R: Rng + ?Sized>(&self, roster: &[PlayerId], rng: &mut R) -> RoleSplit {
        let mut shuffled = roster.to_vec();
        shuffled.shuffle(rng);
        let cut = self.hunter_count(shuffled.len()).min(shuffled.len());
        let evaders = shuffled.split_off(cut);
        RoleSplit {
            hunters: shuffled,
            evaders,
        }
    }
}
