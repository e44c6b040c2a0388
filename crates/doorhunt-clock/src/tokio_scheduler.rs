//! Real-time scheduler backed by Tokio tasks.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{trace, warn};

use crate::{ClockConfig, MissedTickPolicy, Scheduler, TimerHandle};

/// Scheduler that runs each timer as its own Tokio task.
///
/// Fired handles are pushed into the channel returned by [`TokioScheduler::new`].
/// Cancelling aborts the task; dropping the scheduler aborts every timer it
/// still owns, so a session that goes away can't leak ticking tasks.
///
/// Must be used from within a Tokio runtime.
pub struct TokioScheduler {
    policy: MissedTickPolicy,
    next_id: u64,
    timers: HashMap<TimerHandle, JoinHandle<()>>,
    fired: mpsc::UnboundedSender<TimerHandle>,
}

impl TokioScheduler {
    /// Creates a scheduler and the receiver its timers deliver into.
    pub fn new(config: &ClockConfig) -> (Self, mpsc::UnboundedReceiver<TimerHandle>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            policy: config.missed_tick,
            next_id: 1,
            timers: HashMap::new(),
            fired: tx,
        };
        (scheduler, rx)
    }

    /// Number of timers that have not been cancelled.
    pub fn live_timers(&self) -> usize {
        self.timers.len()
    }

    fn allocate(&mut self) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id);
        self.next_id += 1;
        handle
    }
}

impl Scheduler for TokioScheduler {
    fn schedule_once(&mut self, delay: Duration) -> TimerHandle {
        let handle = self.allocate();
        let tx = self.fired.clone();
        let task = tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tx.send(handle);
        });
        self.timers.insert(handle, task);
        trace!(%handle, delay_ms = delay.as_millis() as u64, "one-shot timer scheduled");
        handle
    }

    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        let interval = if interval < ClockConfig::MIN_TICK {
            warn!(
                interval_ms = interval.as_millis() as u64,
                "repeating interval shorter than 1ms, clamping"
            );
            ClockConfig::MIN_TICK
        } else {
            interval
        };

        let handle = self.allocate();
        let tx = self.fired.clone();
        let behavior = self.policy.behavior();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(behavior);
            loop {
                ticker.tick().await;
                if tx.send(handle).is_err() {
                    // Consumer is gone.
                    break;
                }
            }
        });
        self.timers.insert(handle, task);
        trace!(%handle, interval_ms = interval.as_millis() as u64, "repeating timer scheduled");
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle) {
            task.abort();
            trace!(%handle, "timer cancelled");
        }
    }

    fn is_scheduled(&self, handle: TimerHandle) -> bool {
        self.timers
            .get(&handle)
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort();
        }
    }
}
