//! Virtual-time scheduler for deterministic tests and simulations.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Scheduler, TimerHandle};

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: Duration,
    period: Option<Duration>,
}

#[derive(Debug, Default)]
struct Inner {
    now: Duration,
    next_id: u64,
    timers: BTreeMap<TimerHandle, Entry>,
}

/// A scheduler whose clock only moves when told to.
///
/// Cloning yields another handle to the same clock: hand one clone to the
/// session and keep one to drive time.
///
/// ```
/// use std::time::Duration;
/// use doorhunt_clock::{ManualScheduler, Scheduler};
///
/// let clock = ManualScheduler::new();
/// let mut owned = clock.clone();
/// let timer = owned.schedule_repeating(Duration::from_secs(1));
///
/// let mut fired = Vec::new();
/// clock.advance(Duration::from_secs(3), |h| fired.push(h));
/// assert_eq!(fired, vec![timer, timer, timer]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.inner.lock().now
    }

    /// Number of timers still scheduled.
    pub fn live_timers(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Moves the clock forward by `by`, delivering every timer that falls due
    /// to `deliver` in due order (ties broken by handle age).
    ///
    /// The clock lock is released while `deliver` runs, so the callback may
    /// schedule or cancel timers through another clone. Timers scheduled from
    /// inside the callback fire during this same call if they fall due
    /// before the deadline.
    pub fn advance(&self, by: Duration, mut deliver: impl FnMut(TimerHandle)) {
        let deadline = self.inner.lock().now + by;
        while let Some(handle) = self.pop_due(deadline) {
            deliver(handle);
        }
        self.inner.lock().now = deadline;
    }

    /// Pops the earliest timer due at or before `deadline`, moving the clock
    /// to its due time. Repeating timers are re-armed for their next period.
    pub fn pop_due(&self, deadline: Duration) -> Option<TimerHandle> {
        let mut inner = self.inner.lock();
        let (handle, entry) = inner
            .timers
            .iter()
            .filter(|(_, entry)| entry.due <= deadline)
            .min_by_key(|(handle, entry)| (entry.due, **handle))
            .map(|(handle, entry)| (*handle, *entry))?;

        inner.now = inner.now.max(entry.due);
        match entry.period {
            Some(period) => {
                if let Some(slot) = inner.timers.get_mut(&handle) {
                    slot.due = entry.due + period;
                }
            }
            None => {
                inner.timers.remove(&handle);
            }
        }
        Some(handle)
    }

    fn insert(&self, delay: Duration, period: Option<Duration>) -> TimerHandle {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let handle = TimerHandle::new(inner.next_id);
        let due = inner.now + delay;
        inner.timers.insert(handle, Entry { due, period });
        handle
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        self.insert(delay, None)
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        // A zero period would make `advance` spin forever.
        let interval = interval.max(Duration::from_millis(1));
        self.insert(interval, Some(interval))
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.inner.lock().timers.remove(&handle);
    }

    fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.inner.lock().timers.contains_key(&handle)
    }
}
