//! Debounced auto-save for memos
//!
//! `AutoSaver` subscribes to a memo's change notifications and turns each
//! one into a debounced upsert of the memo's current snapshot, keyed by
//! memo id. Typing into a memo therefore produces one save per pause, not
//! one per keystroke.
//!
//! A debounced save has no other trigger, so hosts must call
//! [`AutoSaver::save_now`] or [`AutoSaver::shutdown`] on close, exit or
//! focus loss.

use crate::debounce::{DebounceConfig, DebounceStats};
use crate::keyed::KeyedDebouncer;
use crate::WatchError;
use anyhow::{Context, Result};
use memo_core::{Memo, MemoField, MemoId, MemoSnapshot, MemoStore, ObserverId};
use std::sync::Arc;
use tracing::{debug, trace};

/// Connects memo notifications to a store through per-memo debouncing
pub struct AutoSaver {
    debouncer: Arc<KeyedDebouncer<MemoId>>,
    store: Arc<dyn MemoStore>,
}

impl AutoSaver {
    /// Create an auto-saver on the current Tokio runtime
    pub fn new(store: Arc<dyn MemoStore>, config: DebounceConfig) -> Result<Self, WatchError> {
        config.validate()?;
        Ok(Self {
            debouncer: Arc::new(KeyedDebouncer::new(config)?),
            store,
        })
    }

    /// Save `memo` automatically after every burst of edits
    ///
    /// Returns the observer id; pass it to `Memo::unsubscribe` to detach.
    pub fn attach(&self, memo: &mut Memo) -> ObserverId {
        let debouncer = Arc::clone(&self.debouncer);
        let store = Arc::clone(&self.store);
        debug!(memo = %memo.id(), "Attaching auto-save");

        memo.subscribe(move |memo, field| {
            trace!(memo = %memo.id(), %field, "Memo changed");
            // Every change ends with an `UpdatedAt` notification
            if field == MemoField::UpdatedAt {
                schedule_save(&debouncer, &store, memo.snapshot());
            }
        })
    }

    /// Stop saving `memo` and forget its debounce slot
    ///
    /// A save still waiting out its delay is dropped; call
    /// [`save_now`](Self::save_now) first to keep it.
    pub fn detach(&self, memo: &mut Memo, observer: ObserverId) -> bool {
        let unsubscribed = memo.unsubscribe(observer);
        self.debouncer.remove(memo.id());
        debug!(memo = %memo.id(), "Detached auto-save");
        unsubscribed
    }

    /// Debounce a save of `snapshot`, replacing any pending save of the same memo
    pub fn schedule(&self, snapshot: MemoSnapshot) -> bool {
        schedule_save(&self.debouncer, &self.store, snapshot)
    }

    /// Drop any pending save of `memo` and write its current state now
    pub async fn save_now(&self, memo: &Memo) -> Result<()> {
        self.debouncer.flush(memo.id()).await;
        self.store
            .upsert(&memo.snapshot())
            .with_context(|| format!("Failed to save memo {}", memo.id()))?;
        debug!(memo = %memo.id(), "Saved memo");
        Ok(())
    }

    /// Flush everything, save `memos` explicitly, then stop accepting work
    pub async fn shutdown<'a, I>(&self, memos: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Memo>,
    {
        let cancelled = self.debouncer.flush_all().await;
        debug!(cancelled, "Flushed pending saves for shutdown");

        for memo in memos {
            self.store
                .upsert(&memo.snapshot())
                .with_context(|| format!("Failed to save memo {}", memo.id()))?;
        }

        self.debouncer.dispose();
        Ok(())
    }

    /// Memos with a save still waiting out its delay
    pub fn pending(&self) -> Vec<MemoId> {
        self.debouncer.pending_keys()
    }

    pub fn stats(&self) -> DebounceStats {
        self.debouncer.stats()
    }

    pub fn store(&self) -> &Arc<dyn MemoStore> {
        &self.store
    }
}

fn schedule_save(
    debouncer: &KeyedDebouncer<MemoId>,
    store: &Arc<dyn MemoStore>,
    snapshot: MemoSnapshot,
) -> bool {
    let store = Arc::clone(store);
    debouncer.debounce(snapshot.id.clone(), move || {
        store
            .upsert(&snapshot)
            .with_context(|| format!("Failed to save memo {}", snapshot.id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use memo_core::{FieldUpdate, InMemoryStore, ManualClock};
    use std::time::Duration;
    use tokio::time::sleep;

    fn config() -> DebounceConfig {
        DebounceConfig {
            delay_ms: 100,
            grace_ms: 50,
        }
    }

    fn saver() -> (AutoSaver, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let saver = AutoSaver::new(store.clone(), config()).unwrap();
        (saver, store)
    }

    /// Store whose writes always fail
    struct BrokenStore;

    impl MemoStore for BrokenStore {
        fn upsert(&self, _memo: &MemoSnapshot) -> Result<()> {
            anyhow::bail!("read-only volume")
        }

        fn get(&self, _id: &MemoId) -> Result<Option<MemoSnapshot>> {
            Ok(None)
        }

        fn list(&self) -> Result<Vec<MemoSnapshot>> {
            Ok(Vec::new())
        }

        fn delete(&self, _id: &MemoId) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_saves_once() {
        let (saver, store) = saver();
        let mut memo = Memo::create("", "");
        saver.attach(&mut memo);

        let mut text = String::new();
        for ch in "hello world".chars() {
            text.push(ch);
            memo.set_content(text.clone());
            sleep(Duration::from_millis(30)).await;
        }
        assert_eq!(store.write_count(), 0);
        assert_eq!(saver.pending(), vec![memo.id().clone()]);

        sleep(Duration::from_millis(200)).await;

        assert_eq!(store.write_count(), 1);
        let saved = store.get(memo.id()).unwrap().unwrap();
        assert_eq!(saved.content, "hello world");
        assert_eq!(saved, memo.snapshot());
        assert!(saver.pending().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_noop_edit_does_not_schedule() {
        let (saver, store) = saver();
        let mut memo = Memo::create("Same", "");
        saver.attach(&mut memo);

        memo.set_title("Same");
        sleep(Duration::from_millis(300)).await;

        assert_eq!(store.write_count(), 0);
        assert_eq!(saver.stats().scheduled, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_cancels_pending_and_writes() {
        let (saver, store) = saver();
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        ));
        let mut memo = Memo::create_with_clock("draft", "", clock);
        saver.attach(&mut memo);

        memo.set_title("final");
        saver.save_now(&memo).await.unwrap();
        assert_eq!(store.write_count(), 1);

        sleep(Duration::from_millis(300)).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.get(memo.id()).unwrap().unwrap().title, "final");
    }

    #[tokio::test(start_paused = true)]
    async fn test_memos_debounce_independently() {
        let (saver, store) = saver();
        let mut first = Memo::create("first", "");
        let mut second = Memo::create("second", "");
        saver.attach(&mut first);
        saver.attach(&mut second);

        first.set_content("a");
        second.set_content("b");
        sleep(Duration::from_millis(300)).await;

        assert_eq!(store.len(), 2);
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_saves_and_stops() {
        let (saver, store) = saver();
        let mut memo = Memo::create("", "");
        saver.attach(&mut memo);

        memo.set_tags("todo");
        saver.shutdown([&memo]).await.unwrap();
        assert_eq!(store.write_count(), 1);

        memo.set_tags("done");
        sleep(Duration::from_millis(300)).await;
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.get(memo.id()).unwrap().unwrap().tags, "todo");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_absorbed() {
        let saver = AutoSaver::new(Arc::new(BrokenStore), config()).unwrap();
        let mut memo = Memo::create("", "");
        saver.attach(&mut memo);

        memo.set_title("lost");
        sleep(Duration::from_millis(300)).await;
        assert_eq!(saver.stats().failed, 1);

        memo.set_title("again");
        sleep(Duration::from_millis(300)).await;
        assert_eq!(saver.stats().failed, 2);

        assert!(saver.save_now(&memo).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_memo_is_not_saved() {
        let (saver, store) = saver();
        let mut memo = Memo::create("", "");
        let observer = saver.attach(&mut memo);

        assert!(memo.unsubscribe(observer));
        memo.set_content("private");
        sleep(Duration::from_millis(300)).await;

        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_edit_schedules_one_save() {
        let (saver, store) = saver();
        let mut memo = Memo::create("", "");
        saver.attach(&mut memo);

        memo.set_title("once");
        assert_eq!(saver.stats().scheduled, 1);

        memo.set(FieldUpdate::UpdatedAt(memo.updated_at() + chrono::Duration::seconds(1)));
        assert_eq!(saver.stats().scheduled, 2);

        sleep(Duration::from_millis(300)).await;
        let stats = saver.stats();
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.executed, 1);
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_releases_debounce_slot() {
        let (saver, store) = saver();
        let mut memo = Memo::create("", "");
        let observer = saver.attach(&mut memo);

        memo.set_content("draft");
        assert_eq!(saver.debouncer.len(), 1);

        assert!(saver.detach(&mut memo, observer));
        assert!(saver.debouncer.is_empty());
        assert_eq!(memo.observer_count(), 0);
        assert!(!saver.detach(&mut memo, observer));

        memo.set_content("after");
        sleep(Duration::from_millis(300)).await;
        assert_eq!(store.write_count(), 0);
        assert!(saver.debouncer.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_invalid_config() {
        let store = Arc::new(InMemoryStore::new());
        let result = AutoSaver::new(store, DebounceConfig { delay_ms: 0, grace_ms: 50 });
        assert!(matches!(result, Err(WatchError::InvalidConfig(_))));
    }
}
