//! Memo data model for Memoboard
//!
//! This crate provides:
//! - `Memo`, a change-tracked record that keeps `updated_at` current
//! - Observer registration for field change notifications
//! - Injectable clocks (system and manual)
//! - The `MemoStore` persistence interface and an in-memory store

pub mod clock;
pub mod memo;
pub mod store;

// Re-exports
pub use clock::{Clock, ManualClock, SystemClock};
pub use memo::{
    Change, FieldUpdate, Memo, MemoField, MemoId, MemoSnapshot, ObserverId, TIMESTAMP_FORMAT,
    UNTITLED,
};
pub use store::{InMemoryStore, MemoStore};

/// Result type for memo operations
pub type Result<T> = anyhow::Result<T>;
