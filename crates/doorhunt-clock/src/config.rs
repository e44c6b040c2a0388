//! Clock configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::MissedTickBehavior;
use tracing::warn;

/// What a periodic timer does when the runtime falls behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissedTickPolicy {
    /// Drop the missed ticks and continue on the original cadence.
    /// Keeps a stalled runtime from compressing a countdown into a burst.
    #[default]
    Skip,
    /// Deliver every missed tick immediately, then resume the cadence.
    CatchUp,
    /// Restart the cadence from the moment the late tick was delivered.
    Delay,
}

impl MissedTickPolicy {
    pub(crate) fn behavior(self) -> MissedTickBehavior {
        match self {
            Self::Skip => MissedTickBehavior::Skip,
            Self::CatchUp => MissedTickBehavior::Burst,
            Self::Delay => MissedTickBehavior::Delay,
        }
    }
}

/// Configuration shared by every session's clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one tick. Phase timers count down once per tick.
    /// Default: one second.
    #[serde(with = "millis")]
    pub tick: Duration,
    /// Missed-tick handling for periodic timers.
    pub missed_tick: MissedTickPolicy,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            missed_tick: MissedTickPolicy::default(),
        }
    }
}

impl ClockConfig {
    /// Shortest tick accepted. Tokio intervals panic on a zero period.
    pub const MIN_TICK: Duration = Duration::from_millis(1);

    /// Clamps out-of-range values so the config is safe to use.
    pub fn validated(mut self) -> Self {
        if self.tick < Self::MIN_TICK {
            warn!(tick_ms = self.tick.as_millis() as u64, "tick shorter than 1ms, clamping");
            self.tick = Self::MIN_TICK;
        }
        self
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
