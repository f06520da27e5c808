//! Memo journal using sled

use anyhow::{Context, Result};
use memo_core::store::sort_for_display;
use memo_core::{MemoId, MemoSnapshot, MemoStore};
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use tracing::debug;

/// Record layout version written with every value
const RECORD_FORMAT: u8 = 1;

#[derive(Serialize, Deserialize)]
struct StoredMemo {
    format: u8,
    memo: MemoSnapshot,
}

/// On-disk memo store keyed by memo id
pub struct MemoJournal {
    /// Sled database
    db: Db,
}

impl MemoJournal {
    /// Open or create a journal in `dir`
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
        let db = sled::open(dir.join("memos.db")).context("Failed to open memo database")?;

        debug!(memos = db.len(), "Opened memo journal");
        Ok(Self { db })
    }

    /// Ids starting with `prefix`, in id order
    pub fn resolve_prefix(&self, prefix: &str) -> Result<Vec<MemoId>> {
        let mut ids = Vec::new();
        for item in self.db.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let id = std::str::from_utf8(&key).context("Memo id is not valid UTF-8")?;
            ids.push(MemoId::new(id));
        }
        Ok(ids)
    }

    /// Number of stored memos
    pub fn count(&self) -> usize {
        self.db.len()
    }

    fn encode(memo: &MemoSnapshot) -> Result<Vec<u8>> {
        let record = StoredMemo {
            format: RECORD_FORMAT,
            memo: memo.clone(),
        };
        bincode::serialize(&record).context("Failed to serialize memo")
    }

    fn decode(bytes: &[u8]) -> Result<MemoSnapshot> {
        let record: StoredMemo =
            bincode::deserialize(bytes).context("Failed to deserialize memo")?;
        if record.format != RECORD_FORMAT {
            anyhow::bail!("Unsupported memo record format: {}", record.format);
        }
        Ok(record.memo)
    }
}

impl MemoStore for MemoJournal {
    fn upsert(&self, memo: &MemoSnapshot) -> Result<()> {
        let value = Self::encode(memo)?;
        self.db.insert(memo.id.as_str().as_bytes(), value)?;

        // Flush to ensure durability
        self.db.flush()?;
        Ok(())
    }

    fn get(&self, id: &MemoId) -> Result<Option<MemoSnapshot>> {
        match self.db.get(id.as_str().as_bytes())? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    fn list(&self) -> Result<Vec<MemoSnapshot>> {
        let mut memos = Vec::with_capacity(self.db.len());
        for item in self.db.iter() {
            let (_, value) = item?;
            memos.push(Self::decode(&value)?);
        }
        sort_for_display(&mut memos);
        Ok(memos)
    }

    fn delete(&self, id: &MemoId) -> Result<bool> {
        let removed = self.db.remove(id.as_str().as_bytes())?.is_some();
        self.db.flush()?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::Memo;
    use tempfile::TempDir;

    #[test]
    fn test_upsert_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let journal = MemoJournal::open(temp_dir.path()).unwrap();

        let mut memo = Memo::create("Standup", "notes");
        memo.set_tags("work,daily");
        journal.upsert(&memo.snapshot()).unwrap();

        let stored = journal.get(memo.id()).unwrap().unwrap();
        assert_eq!(stored, memo.snapshot());
        assert_eq!(journal.count(), 1);
    }

    #[test]
    fn test_upsert_is_keyed_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let journal = MemoJournal::open(temp_dir.path()).unwrap();

        let mut memo = Memo::create("v1", "");
        journal.upsert(&memo.snapshot()).unwrap();
        journal.upsert(&memo.snapshot()).unwrap();
        memo.set_title("v2");
        journal.upsert(&memo.snapshot()).unwrap();

        assert_eq!(journal.count(), 1);
        assert_eq!(journal.get(memo.id()).unwrap().unwrap().title, "v2");
    }

    #[test]
    fn test_persists_across_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let memo = Memo::create("Durable", "still here");

        {
            let journal = MemoJournal::open(temp_dir.path()).unwrap();
            journal.upsert(&memo.snapshot()).unwrap();
        }

        let journal = MemoJournal::open(temp_dir.path()).unwrap();
        let stored = journal.get(memo.id()).unwrap().unwrap();
        assert_eq!(stored.content, "still here");
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let journal = MemoJournal::open(temp_dir.path()).unwrap();
        let memo = Memo::create("temp", "");
        journal.upsert(&memo.snapshot()).unwrap();

        assert!(journal.delete(memo.id()).unwrap());
        assert!(!journal.delete(memo.id()).unwrap());
        assert!(journal.get(memo.id()).unwrap().is_none());
    }

    #[test]
    fn test_list_pinned_first() {
        let temp_dir = TempDir::new().unwrap();
        let journal = MemoJournal::open(temp_dir.path()).unwrap();

        let plain = Memo::create("plain", "");
        let mut pinned = Memo::create("pinned", "");
        pinned.set_pinned(true);
        journal.upsert(&plain.snapshot()).unwrap();
        journal.upsert(&pinned.snapshot()).unwrap();

        let titles: Vec<_> = journal.list().unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, vec!["pinned", "plain"]);
    }

    #[test]
    fn test_resolve_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let journal = MemoJournal::open(temp_dir.path()).unwrap();
        let memo = Memo::create("find me", "");
        journal.upsert(&memo.snapshot()).unwrap();

        let id = memo.id().as_str();
        assert_eq!(journal.resolve_prefix(&id[..10]).unwrap(), vec![memo.id().clone()]);
        assert!(journal.resolve_prefix("ZZZZZZZZ").unwrap().is_empty());
    }
}
