//! Edit a memo with debounced auto-save

use crate::util::{self, AppContext};
use anyhow::{Context, Result};
use clap::Args;
use memo_core::{Change, Memo, MemoField, MemoStore};
use memo_watcher::AutoSaver;
use owo_colors::OwoColorize;

/// Field edits shared by `new` and `edit`
#[derive(Args, Debug, Default, Clone)]
pub struct MemoEdits {
    /// Title
    #[arg(long)]
    pub title: Option<String>,

    /// Body text
    #[arg(long)]
    pub content: Option<String>,

    /// Comma-separated tags
    #[arg(long)]
    pub tags: Option<String>,

    /// Category
    #[arg(long)]
    pub category: Option<String>,

    /// Priority (higher sorts first)
    #[arg(long, allow_hyphen_values = true)]
    pub priority: Option<i32>,

    /// Pin the memo
    #[arg(long, conflicts_with = "unpin")]
    pub pin: bool,

    /// Unpin the memo
    #[arg(long)]
    pub unpin: bool,
}

impl MemoEdits {
    /// Apply every requested edit; returns the fields that actually changed
    pub fn apply(&self, memo: &mut Memo) -> Vec<MemoField> {
        let mut changed = Vec::new();
        let mut record = |change: Change| {
            changed.extend(
                change
                    .fields()
                    .iter()
                    .copied()
                    .filter(|field| *field != MemoField::UpdatedAt),
            );
        };

        if let Some(title) = &self.title {
            record(memo.set_title(title.as_str()));
        }
        if let Some(content) = &self.content {
            record(memo.set_content(content.as_str()));
        }
        if let Some(tags) = &self.tags {
            record(memo.set_tags(tags.as_str()));
        }
        if let Some(category) = &self.category {
            record(memo.set_category(category.as_str()));
        }
        if let Some(priority) = self.priority {
            record(memo.set_priority(priority));
        }
        if self.pin {
            record(memo.set_pinned(true));
        }
        if self.unpin {
            record(memo.set_pinned(false));
        }

        changed
    }
}

pub async fn run(ctx: &AppContext, reference: &str, edits: &MemoEdits) -> Result<()> {
    // 1. Load the memo
    let journal = ctx.open_journal()?;
    let id = util::resolve_memo_ref(reference, &journal)?;
    let snapshot = journal
        .get(&id)?
        .with_context(|| format!("Memo not found: {}", id))?;
    let mut memo = Memo::from_snapshot(snapshot);

    // 2. Route every change through the auto-saver
    let saver = AutoSaver::new(journal.clone(), ctx.config.autosave.clone())?;
    saver.attach(&mut memo);

    // 3. Apply edits
    let changed = edits.apply(&mut memo);
    if changed.is_empty() {
        println!("{}", "No changes".dimmed());
        return Ok(());
    }

    // 4. Save on exit: a pending debounced save has no other trigger
    saver.shutdown([&memo]).await?;

    let fields: Vec<_> = changed.iter().map(|field| field.name()).collect();
    println!(
        "{} Updated {} ({})",
        "✓".green(),
        util::short_id(memo.id()).cyan(),
        fields.join(", ")
    );
    Ok(())
}
