//! Timers for DoorHunt sessions.
//!
//! A session never captures itself in a timer closure. Instead it asks a
//! [`Scheduler`] for a timer and gets back a [`TimerHandle`]; when the timer
//! fires, only the handle is delivered. The session compares the delivered
//! handle against the handles it currently holds, so a delivery for a timer
//! that was cancelled (or superseded) in the meantime is simply dropped.
//!
//! Two implementations are provided:
//!
//! - [`TokioScheduler`]: real time. Each timer is a small Tokio task that
//!   pushes its handle into an unbounded channel the session actor selects on.
//! - [`ManualScheduler`]: virtual time. Nothing fires until the owner calls
//!   [`ManualScheduler::advance`], which makes multi-minute rounds testable
//!   in microseconds.
//!
//! # Integration
//!
//! ```ignore
//! let (scheduler, mut fired) = TokioScheduler::new(&ClockConfig::default());
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* handle commands */ }
//!         Some(handle) = fired.recv() => session.on_timer(handle),
//!     }
//! }
//! ```

mod config;
mod manual;
mod tokio_scheduler;

use std::fmt;
use std::time::Duration;

pub use config::{ClockConfig, MissedTickPolicy};
pub use manual::ManualScheduler;
pub use tokio_scheduler::TokioScheduler;

/// Identifies one scheduled timer.
///
/// Handles are never reused by the scheduler that issued them, so a stale
/// handle can always be told apart from a live one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T-{}", self.0)
    }
}

/// Issues one-shot and periodic timers.
///
/// `cancel` must be idempotent: cancelling an unknown, fired, or
/// already-cancelled handle is a no-op.
pub trait Scheduler: Send {
    /// Fires `handle` once after `delay`.
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle;

    /// Fires `handle` every `interval`, first after one full interval.
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle;

    /// Stops a timer. After this returns the handle will not be delivered
    /// again by this scheduler, though a delivery already in flight may
    /// still reach the consumer (which must compare handles).
    fn cancel(&mut self, handle: TimerHandle);

    /// Whether `handle` is still scheduled.
    fn is_scheduled(&self, handle: TimerHandle) -> bool;
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        (**self).schedule_once(delay)
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        (**self).schedule_repeating(interval)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        (**self).cancel(handle)
    }

    fn is_scheduled(&self, handle: TimerHandle) -> bool {
        (**self).is_scheduled(handle)
    }
}
