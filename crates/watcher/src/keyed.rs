//! Per-key debouncing
//!
//! One `DebounceCoordinator` per key, created on first use. Bursts on
//! different keys never cancel each other.

use crate::debounce::{DebounceConfig, DebounceCoordinator, DebounceStats};
use crate::WatchError;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Debouncer with an independent pending slot per key
pub struct KeyedDebouncer<K>
where
    K: Eq + Hash,
{
    coordinators: DashMap<K, Arc<DebounceCoordinator>>,
    config: DebounceConfig,
    runtime: Handle,
    disposed: AtomicBool,
}

impl<K> KeyedDebouncer<K>
where
    K: Eq + Hash + Clone,
{
    /// Create a keyed debouncer on the current Tokio runtime
    pub fn new(config: DebounceConfig) -> Result<Self, WatchError> {
        let runtime = Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
        Ok(Self {
            coordinators: DashMap::new(),
            config,
            runtime,
            disposed: AtomicBool::new(false),
        })
    }

    /// Debounce `action` under `key`, superseding only that key's pending action
    pub fn debounce<F>(&self, key: K, action: F) -> bool
    where
        F: FnOnce() -> anyhow::Result<()> + Send + 'static,
    {
        if self.disposed.load(Ordering::SeqCst) {
            return false;
        }
        let coordinator = self.coordinator(key);

        // `dispose` may have walked the map before this coordinator was inserted.
        if self.disposed.load(Ordering::SeqCst) {
            coordinator.dispose();
            return false;
        }
        coordinator.debounce(action)
    }

    /// Flush one key; returns whether a pending action was cancelled
    pub async fn flush(&self, key: &K) -> bool {
        // Never hold a map guard across an await.
        let coordinator = self.coordinators.get(key).map(|entry| Arc::clone(entry.value()));
        match coordinator {
            Some(coordinator) => coordinator.flush().await,
            None => false,
        }
    }

    /// Flush every key; returns how many pending actions were cancelled
    pub async fn flush_all(&self) -> usize {
        let coordinators: Vec<_> = self
            .coordinators
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut cancelled = 0;
        for coordinator in coordinators {
            if coordinator.flush().await {
                cancelled += 1;
            }
        }
        cancelled
    }

    /// Dispose and forget the coordinator for `key`
    pub fn remove(&self, key: &K) -> bool {
        match self.coordinators.remove(key) {
            Some((_, coordinator)) => {
                coordinator.dispose();
                true
            }
            None => false,
        }
    }

    /// Keys with an action waiting out its delay
    pub fn pending_keys(&self) -> Vec<K> {
        self.coordinators
            .iter()
            .filter(|entry| entry.value().is_pending())
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Totals across the keys currently tracked
    pub fn stats(&self) -> DebounceStats {
        self.coordinators
            .iter()
            .fold(DebounceStats::default(), |total, entry| total + entry.value().stats())
    }

    /// Dispose every coordinator and refuse further calls
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        for entry in self.coordinators.iter() {
            entry.value().dispose();
        }
        debug!(keys = self.coordinators.len(), "Keyed debouncer disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.coordinators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.is_empty()
    }

    fn coordinator(&self, key: K) -> Arc<DebounceCoordinator> {
        let entry = self.coordinators.entry(key).or_insert_with(|| {
            Arc::new(DebounceCoordinator::with_runtime(
                &self.config,
                self.runtime.clone(),
            ))
        });
        Arc::clone(entry.value())
    }
}
