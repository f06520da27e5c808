//! Change watching and debounced persistence for Memoboard
//!
//! This crate provides:
//! - Cancel-and-replace debouncing (configurable delay, default 500ms)
//! - Per-key debouncing so every memo gets its own pending slot
//! - `AutoSaver`, which turns memo change notifications into coalesced saves

pub mod autosave;
pub mod debounce;
pub mod keyed;

pub use autosave::AutoSaver;
pub use debounce::{DebounceConfig, DebounceCoordinator, DebounceStats};
pub use keyed::KeyedDebouncer;

use thiserror::Error;

/// Errors raised while setting up debouncing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WatchError {
    /// Coordinators spawn onto the Tokio runtime they were created in
    #[error("no Tokio runtime is running; create the coordinator from inside a runtime")]
    NoRuntime,

    /// Configuration outside the accepted ranges
    #[error("invalid debounce config: {0}")]
    InvalidConfig(String),
}
