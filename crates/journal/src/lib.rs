//! Durable memo storage
//!
//! This crate provides:
//! - `MemoJournal`, a sled-backed `MemoStore`
//! - Id prefix resolution for short memo references

pub mod journal;

// Re-exports
pub use journal::MemoJournal;

/// Result type for journal operations
pub type Result<T> = anyhow::Result<T>;
