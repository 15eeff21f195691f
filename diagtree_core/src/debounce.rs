//! Trailing-edge debouncing of recompute triggers.
//!
//! Each key moves through `Idle -> Pending -> Running -> Idle`. A trigger
//! while `Pending` restarts the quiet period. A trigger while `Running` is
//! remembered and starts exactly one more run as soon as the current one
//! finishes. The job that runs is always the one passed with the latest
//! trigger.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, trace};
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Where a debounced key currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebouncePhase {
    #[default]
    Idle,
    Pending,
    Running,
}

#[derive(Default)]
struct Slot {
    phase: DebouncePhase,
    generation: u64,
    job: Option<Job>,
    rerun: bool,
    timer: Option<JoinHandle<()>>,
}

/// Shared debounce state, keyed by a logical name.
///
/// Cloning shares the state. Timers run on the Tokio runtime that is current
/// when [`schedule`](Self::schedule) is called.
#[derive(Clone, Default)]
pub struct Debouncer {
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `job` once `delay` has passed without another trigger for `key`.
    ///
    /// A zero delay still coalesces triggers issued before the runtime gets
    /// to the pending run.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn schedule<F>(&self, key: &str, delay: Duration, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut slots = self.lock();
        let slot = slots.entry(key.to_string()).or_default();
        slot.job = Some(Box::new(job));

        match slot.phase {
            DebouncePhase::Running => {
                trace!("'{}' is running, queueing one more run", key);
                slot.rerun = true;
                return;
            }
            DebouncePhase::Pending => {
                trace!("'{}' triggered again, restarting its timer", key);
                if let Some(timer) = slot.timer.take() {
                    timer.abort();
                }
            }
            DebouncePhase::Idle => {}
        }

        slot.phase = DebouncePhase::Pending;
        slot.generation = slot.generation.wrapping_add(1);

        let generation = slot.generation;
        let debouncer = self.clone();
        let owned_key = key.to_string();
        slot.timer = Some(tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            debouncer.fire(&owned_key, generation);
        }));
    }

    /// Drops a pending run for `key`. A run already in progress is not affected.
    pub fn cancel(&self, key: &str) {
        let mut slots = self.lock();
        let Some(slot) = slots.get_mut(key) else {
            return;
        };
        match slot.phase {
            DebouncePhase::Pending => {
                if let Some(timer) = slot.timer.take() {
                    timer.abort();
                }
                slot.job = None;
                slot.phase = DebouncePhase::Idle;
            }
            DebouncePhase::Running => {
                slot.rerun = false;
                slot.job = None;
            }
            DebouncePhase::Idle => {}
        }
    }

    /// The current phase of `key`.
    pub fn phase(&self, key: &str) -> DebouncePhase {
        self.lock()
            .get(key)
            .map(|slot| slot.phase)
            .unwrap_or_default()
    }

    fn fire(&self, key: &str, generation: u64) {
        let Some(mut job) = self.begin(key, generation) else {
            return;
        };

        loop {
            // A failing job must not leave the key stuck in `Running`.
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!("Debounced job '{}' panicked", key);
            }
            match self.finish(key) {
                Some(next) => job = next,
                None => return,
            }
        }
    }

    /// Moves a pending slot to running, if this timer is still the current one.
    fn begin(&self, key: &str, generation: u64) -> Option<Job> {
        let mut slots = self.lock();
        let slot = slots.get_mut(key)?;
        if slot.phase != DebouncePhase::Pending || slot.generation != generation {
            trace!("Stale timer for '{}' ignored", key);
            return None;
        }

        slot.timer = None;
        match slot.job.take() {
            Some(job) => {
                slot.phase = DebouncePhase::Running;
                Some(job)
            }
            None => {
                slot.phase = DebouncePhase::Idle;
                None
            }
        }
    }

    /// Ends a run; returns the queued job if a trigger arrived meanwhile.
    fn finish(&self, key: &str) -> Option<Job> {
        let mut slots = self.lock();
        let slot = slots.get_mut(key)?;
        if slot.rerun {
            slot.rerun = false;
            if let Some(job) = slot.job.take() {
                trace!("Running '{}' again for a trigger received mid-run", key);
                return Some(job);
            }
        }
        slot.phase = DebouncePhase::Idle;
        None
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
