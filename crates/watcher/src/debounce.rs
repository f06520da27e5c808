//! Cancel-and-replace debouncing
//!
//! A `DebounceCoordinator` owns a single pending slot. Every `debounce`
//! call supersedes whatever is pending, so a burst of calls collapses into
//! the last action, run once after the delay has passed with no newer call.
//!
//! A scheduled task checks that it still owns the slot when it starts and
//! again, under the slot lock, right before it runs. Superseded tasks are
//! also aborted, but the generation check is what guarantees a cancelled
//! action never runs. Actions execute on the blocking pool.

use crate::WatchError;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace, warn};

/// Deferred work handed to the coordinator
pub type Action = Box<dyn FnOnce() -> anyhow::Result<()> + Send + 'static>;

/// Debounce timing configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    /// Quiet period before an action fires (default: 500ms)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Upper bound on how long `flush` waits for a running action (default: 50ms)
    #[serde(default = "default_grace_ms")]
    pub grace_ms: u64,
}

impl DebounceConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }

    /// Check ranges: delay 1-60000ms, grace 0-5000ms
    pub fn validate(&self) -> Result<(), WatchError> {
        if !(1..=60_000).contains(&self.delay_ms) {
            return Err(WatchError::InvalidConfig(format!(
                "delay_ms must be between 1 and 60000, got {}",
                self.delay_ms
            )));
        }
        if self.grace_ms > 5_000 {
            return Err(WatchError::InvalidConfig(format!(
                "grace_ms must be at most 5000, got {}",
                self.grace_ms
            )));
        }
        Ok(())
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            grace_ms: default_grace_ms(),
        }
    }
}

fn default_delay_ms() -> u64 {
    500
}

fn default_grace_ms() -> u64 {
    50
}

/// Counters since construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Accepted `debounce` calls
    pub scheduled: u64,
    /// Pending actions dropped by a newer call, `flush` or `dispose`
    pub cancelled: u64,
    /// Actions that ran and returned `Ok`
    pub executed: u64,
    /// Actions that returned `Err` or panicked
    pub failed: u64,
}

impl std::ops::Add for DebounceStats {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            scheduled: self.scheduled + other.scheduled,
            cancelled: self.cancelled + other.cancelled,
            executed: self.executed + other.executed,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Default)]
struct Counters {
    scheduled: AtomicU64,
    cancelled: AtomicU64,
    executed: AtomicU64,
    failed: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> DebounceStats {
        DebounceStats {
            scheduled: self.scheduled.load(Ordering::SeqCst),
            cancelled: self.cancelled.load(Ordering::SeqCst),
            executed: self.executed.load(Ordering::SeqCst),
            failed: self.failed.load(Ordering::SeqCst),
        }
    }
}

/// A scheduled, not yet started action
struct Scheduled {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct Slot {
    next_generation: u64,
    pending: Option<Scheduled>,
    running: Option<u64>,
    disposed: bool,
}

struct Shared {
    slot: Mutex<Slot>,
    /// Held while an action executes; `flush` acquires it to wait for completion
    run_lock: tokio::sync::Mutex<()>,
    counters: Counters,
}

impl Shared {
    fn owns_slot(&self, generation: u64) -> bool {
        self.slot
            .lock()
            .pending
            .as_ref()
            .is_some_and(|task| task.generation == generation)
    }

    fn cancel(&self, task: Scheduled) {
        task.handle.abort();
        self.counters.cancelled.fetch_add(1, Ordering::SeqCst);
        trace!(generation = task.generation, "Cancelled pending action");
    }
}

/// Coalesces bursts of calls into one deferred action
///
/// `debounce` never blocks: it swaps the pending slot under a short lock and
/// spawns the delayed task on the runtime captured at construction. The
/// lock is never held across the delay or the action.
pub struct DebounceCoordinator {
    shared: Arc<Shared>,
    runtime: Handle,
    delay: Duration,
    grace: Duration,
}

impl DebounceCoordinator {
    /// Create a coordinator on the current Tokio runtime
    pub fn new(config: &DebounceConfig) -> Result<Self, WatchError> {
        let runtime = Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
        Ok(Self::with_runtime(config, runtime))
    }

    /// Create a coordinator that spawns onto `runtime`
    pub fn with_runtime(config: &DebounceConfig, runtime: Handle) -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot::default()),
                run_lock: tokio::sync::Mutex::new(()),
                counters: Counters::default(),
            }),
            runtime,
            delay: config.delay(),
            grace: config.grace(),
        }
    }

    /// Schedule `action` after the configured delay, replacing any pending one
    ///
    /// Returns false (and drops `action`) once the coordinator is disposed.
    pub fn debounce<F>(&self, action: F) -> bool
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        self.debounce_after(self.delay, action)
    }

    /// Like [`debounce`](Self::debounce) with a per-call delay
    pub fn debounce_after<F>(&self, delay: Duration, action: F) -> bool
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        let mut slot = self.shared.slot.lock();
        if slot.disposed {
            debug!("Ignoring debounce on disposed coordinator");
            return false;
        }

        if let Some(previous) = slot.pending.take() {
            self.shared.cancel(previous);
        }

        slot.next_generation += 1;
        let generation = slot.next_generation;
        let handle = self.runtime.spawn(run_after(
            Arc::clone(&self.shared),
            generation,
            delay,
            Box::new(action),
        ));
        slot.pending = Some(Scheduled { generation, handle });
        self.shared.counters.scheduled.fetch_add(1, Ordering::SeqCst);

        trace!(generation, delay_ms = delay.as_millis() as u64, "Scheduled debounced action");
        true
    }

    /// Cancel the pending action and let any running one settle
    ///
    /// The pending action will never run. If an action is executing right
    /// now, waits for it to finish, for at most the grace period. Returns
    /// whether a pending action was cancelled; the caller decides whether to
    /// perform the work itself.
    pub async fn flush(&self) -> bool {
        let cancelled = {
            let mut slot = self.shared.slot.lock();
            if slot.disposed {
                return false;
            }
            match slot.pending.take() {
                Some(task) => {
                    self.shared.cancel(task);
                    true
                }
                None => false,
            }
        };

        if tokio::time::timeout(self.grace, self.shared.run_lock.lock())
            .await
            .is_err()
        {
            warn!(
                grace_ms = self.grace.as_millis() as u64,
                "Debounced action still running after grace period"
            );
        }

        cancelled
    }

    /// Cancel pending work and refuse all further calls
    pub fn dispose(&self) {
        let mut slot = self.shared.slot.lock();
        if slot.disposed {
            return;
        }
        slot.disposed = true;
        if let Some(task) = slot.pending.take() {
            self.shared.cancel(task);
        }
        debug!("Debounce coordinator disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.slot.lock().disposed
    }

    /// True while an action waits out its delay
    pub fn is_pending(&self) -> bool {
        self.shared.slot.lock().pending.is_some()
    }

    /// True while an action executes
    pub fn is_running(&self) -> bool {
        self.shared.slot.lock().running.is_some()
    }

    pub fn stats(&self) -> DebounceStats {
        self.shared.counters.snapshot()
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn grace_period(&self) -> Duration {
        self.grace
    }
}

impl Drop for DebounceCoordinator {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_after(shared: Arc<Shared>, generation: u64, delay: Duration, action: Action) {
    if !shared.owns_slot(generation) {
        trace!(generation, "Superseded before delay started");
        return;
    }

    tokio::time::sleep(delay).await;

    // Actions never overlap. Taking the run lock before the final check
    // means a `flush` that cancelled us first is never followed by our action.
    let _running = shared.run_lock.lock().await;
    {
        let mut slot = shared.slot.lock();
        match slot.pending.take() {
            Some(task) if task.generation == generation => {
                slot.running = Some(generation);
            }
            other => {
                slot.pending = other;
                trace!(generation, "Superseded before firing");
                return;
            }
        }
    }

    // Actions may block (a store flushing to disk), so keep them off the workers
    match tokio::task::spawn_blocking(action).await {
        Ok(Ok(())) => {
            shared.counters.executed.fetch_add(1, Ordering::SeqCst);
            debug!(generation, "Debounced action completed");
        }
        Ok(Err(e)) => {
            shared.counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!(generation, "Debounced action failed: {:#}", e);
        }
        Err(e) if e.is_panic() => {
            shared.counters.failed.fetch_add(1, Ordering::SeqCst);
            error!(generation, "Debounced action panicked");
        }
        Err(e) => {
            shared.counters.failed.fetch_add(1, Ordering::SeqCst);
            error!(generation, "Debounced action did not complete: {}", e);
        }
    }

    let mut slot = shared.slot.lock();
    if slot.running == Some(generation) {
        slot.running = None;
    }
}
