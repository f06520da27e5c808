//! Persistence interface for memos
//!
//! Stores receive snapshots, never live `Memo`s. `upsert` is idempotent
//! and keyed by memo id, so replaying the same save is harmless.

use crate::memo::{MemoId, MemoSnapshot};
use anyhow::Result;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Storage backend for memo snapshots
pub trait MemoStore: Send + Sync {
    /// Insert or replace the memo with `memo.id`
    fn upsert(&self, memo: &MemoSnapshot) -> Result<()>;

    /// Fetch one memo
    fn get(&self, id: &MemoId) -> Result<Option<MemoSnapshot>>;

    /// All memos in display order (see [`sort_for_display`])
    fn list(&self) -> Result<Vec<MemoSnapshot>>;

    /// Remove a memo; returns false if it did not exist
    fn delete(&self, id: &MemoId) -> Result<bool>;
}

/// Pinned first, then higher priority, then most recently updated
pub fn sort_for_display(memos: &mut [MemoSnapshot]) {
    memos.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then(b.priority.cmp(&a.priority))
            .then(b.updated_at.cmp(&a.updated_at))
            .then(a.id.cmp(&b.id))
    });
}

/// Volatile store backed by a concurrent map
#[derive(Debug, Default)]
pub struct InMemoryStore {
    memos: DashMap<MemoId, MemoSnapshot>,
    writes: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `upsert` calls so far
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.memos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memos.is_empty()
    }
}

impl MemoStore for InMemoryStore {
    fn upsert(&self, memo: &MemoSnapshot) -> Result<()> {
        self.memos.insert(memo.id.clone(), memo.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn get(&self, id: &MemoId) -> Result<Option<MemoSnapshot>> {
        Ok(self.memos.get(id).map(|entry| entry.value().clone()))
    }

    fn list(&self) -> Result<Vec<MemoSnapshot>> {
        let mut memos: Vec<_> = self.memos.iter().map(|entry| entry.value().clone()).collect();
        sort_for_display(&mut memos);
        Ok(memos)
    }

    fn delete(&self, id: &MemoId) -> Result<bool> {
        Ok(self.memos.remove(id).is_some())
    }
}
