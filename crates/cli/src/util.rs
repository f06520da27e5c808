//! Shared utilities for CLI commands

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use memo_core::MemoId;
use memo_journal::MemoJournal;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved configuration and locations for one invocation
pub struct AppContext {
    pub config: SystemConfig,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
}

impl AppContext {
    /// Resolve config and data locations; explicit arguments win over the file
    pub fn resolve(data_dir: Option<PathBuf>, config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path,
            None => system_config::config_file_path()
                .context("Could not determine config file path")?,
        };
        let config = system_config::load(&config_path)?;
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config.data_dir()?,
        };

        Ok(Self {
            config,
            config_path,
            data_dir,
        })
    }

    pub fn open_journal(&self) -> Result<Arc<MemoJournal>> {
        let journal = MemoJournal::open(&self.data_dir).with_context(|| {
            format!("Failed to open memo journal in {}", self.data_dir.display())
        })?;
        Ok(Arc::new(journal))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Resolve a memo reference to an id
/// Supports:
/// - Full id: "01HN8XYZ..."
/// - Unique id prefix of at least 4 characters: "01HN8"
pub fn resolve_memo_ref(reference: &str, journal: &MemoJournal) -> Result<MemoId> {
    let reference = reference.trim().to_ascii_uppercase();
    if reference.len() < 4 {
        anyhow::bail!("Memo reference '{}' is too short (need at least 4 characters)", reference);
    }

    let mut matching = journal.resolve_prefix(&reference)?;
    if matching.len() > 1 {
        anyhow::bail!(
            "Ambiguous memo prefix '{}': matches {} memos",
            reference,
            matching.len()
        );
    }
    matching
        .pop()
        .with_context(|| format!("Memo not found: {}", reference))
}

/// First 8 characters of an id
pub fn short_id(id: &MemoId) -> &str {
    let id = id.as_str();
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// First line of `content`, cut to `max_chars`
pub fn preview(content: &str, max_chars: usize) -> String {
    let first_line = content.lines().next().unwrap_or("");
    let mut preview: String = first_line.chars().take(max_chars).collect();
    if first_line.chars().count() > max_chars || content.lines().nth(1).is_some() {
        preview.push('…');
    }
    preview
}

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts: DateTime<Utc>) -> String {
    let elapsed = Utc::now().signed_duration_since(ts);
    let seconds = elapsed.num_seconds();

    if seconds < 0 {
        "in the future".to_string()
    } else if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}
