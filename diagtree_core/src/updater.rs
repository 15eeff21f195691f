//! Debounced, serialized diagnostics cycles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{error, warn};

use crate::debounce::{DebouncePhase, Debouncer};
use crate::decorator::{CycleOutcome, DiagnosticsDecorator};
use crate::sink::PresentationSink;
use crate::tree::TreeView;

/// Debounce key used for diagnostics cycles.
pub const DIAGNOSTICS_KEY: &str = "diagnostics";

type CycleCallback<T, S> = Arc<dyn Fn(&DiagnosticsDecorator<T, S>, &CycleOutcome) + Send + Sync>;

/// Turns "something changed" notifications into at most one cycle per quiet period.
///
/// Cloning shares the decorator and the debounce state, so any clone may be
/// handed to an event source. Triggers never wait on a running cycle.
pub struct DiagnosticsUpdater<T, S> {
    decorator: Arc<Mutex<DiagnosticsDecorator<T, S>>>,
    debouncer: Debouncer,
    enabled: bool,
    delay: Duration,
    cycle_active: Arc<AtomicBool>,
    on_cycle: Option<CycleCallback<T, S>>,
}

impl<T, S> Clone for DiagnosticsUpdater<T, S> {
    fn clone(&self) -> Self {
        Self {
            decorator: self.decorator.clone(),
            debouncer: self.debouncer.clone(),
            enabled: self.enabled,
            delay: self.delay,
            cycle_active: self.cycle_active.clone(),
            on_cycle: self.on_cycle.clone(),
        }
    }
}

impl<T, S> DiagnosticsUpdater<T, S>
where
    T: TreeView + 'static,
    S: PresentationSink + 'static,
{
    pub fn new(decorator: DiagnosticsDecorator<T, S>) -> Self {
        let enabled = decorator.config().enable;
        let delay = decorator.config().debounce_duration();
        Self {
            decorator: Arc::new(Mutex::new(decorator)),
            debouncer: Debouncer::new(),
            enabled,
            delay,
            cycle_active: Arc::new(AtomicBool::new(false)),
            on_cycle: None,
        }
    }

    /// Called after every cycle, while the decorator is still locked.
    pub fn on_cycle<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DiagnosticsDecorator<T, S>, &CycleOutcome) + Send + Sync + 'static,
    {
        self.on_cycle = Some(Arc::new(callback));
        self
    }

    /// Requests a cycle after the configured quiet period.
    ///
    /// Returns immediately, also while a cycle is running, and may be called
    /// from an `on_cycle` callback. Does nothing while the feature is disabled.
    /// A cycle that finds the tree view unloaded is skipped. Must be called
    /// from within a Tokio runtime.
    pub fn update(&self) {
        if !self.enabled {
            return;
        }

        let decorator = self.decorator.clone();
        let cycle_active = self.cycle_active.clone();
        let on_cycle = self.on_cycle.clone();
        self.debouncer.schedule(DIAGNOSTICS_KEY, self.delay, move || {
            run_cycle(&decorator, &cycle_active, on_cycle.as_deref());
        });
    }

    /// Drops a requested cycle that has not started yet.
    pub fn cancel(&self) {
        self.debouncer.cancel(DIAGNOSTICS_KEY);
    }

    /// Removes every marker right away, without waiting for a cycle.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Runs `f` with exclusive access to the decorator.
    pub fn with_decorator<R>(&self, f: impl FnOnce(&mut DiagnosticsDecorator<T, S>) -> R) -> R {
        f(&mut self.lock())
    }

    /// Where the pending cycle for this updater currently is.
    pub fn phase(&self) -> DebouncePhase {
        self.debouncer.phase(DIAGNOSTICS_KEY)
    }

    fn lock(&self) -> MutexGuard<'_, DiagnosticsDecorator<T, S>> {
        lock_decorator(&self.decorator)
    }
}

fn run_cycle<T, S>(
    decorator: &Mutex<DiagnosticsDecorator<T, S>>,
    cycle_active: &AtomicBool,
    on_cycle: Option<&(dyn Fn(&DiagnosticsDecorator<T, S>, &CycleOutcome) + Send + Sync)>,
) where
    T: TreeView,
    S: PresentationSink,
{
    let overlapping = cycle_active.swap(true, Ordering::SeqCst);
    if overlapping {
        error!("Diagnostics cycle started while another one was still running");
    }
    debug_assert!(!overlapping, "overlapping diagnostics cycles");

    let mut decorator = lock_decorator(decorator);
    let outcome = decorator.refresh();
    if let Some(callback) = on_cycle {
        callback(&*decorator, &outcome);
    }
    drop(decorator);

    cycle_active.store(false, Ordering::SeqCst);
}

fn lock_decorator<T, S>(
    decorator: &Mutex<DiagnosticsDecorator<T, S>>,
) -> MutexGuard<'_, DiagnosticsDecorator<T, S>> {
    decorator.lock().unwrap_or_else(|poisoned| {
        warn!("Diagnostics state was poisoned by a panicking cycle, continuing with it");
        PoisonError::into_inner(poisoned)
    })
}
