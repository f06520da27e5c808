//! Simulated typing with debounced auto-save
//!
//! Appends `text` to a memo one character at a time. Every keystroke is a
//! change notification; the auto-saver collapses each burst into one write.

use crate::util::{self, AppContext};
use anyhow::{Context, Result};
use memo_core::{Memo, MemoStore};
use memo_watcher::AutoSaver;
use owo_colors::OwoColorize;
use std::time::Duration;
use tracing::info;

pub async fn run(ctx: &AppContext, reference: &str, text: &str, interval_ms: u64) -> Result<()> {
    let journal = ctx.open_journal()?;
    let id = util::resolve_memo_ref(reference, &journal)?;
    let snapshot = journal
        .get(&id)?
        .with_context(|| format!("Memo not found: {}", id))?;

    let saver = AutoSaver::new(journal.clone(), ctx.config.autosave.clone())?;
    let mut memo = Memo::from_snapshot(snapshot);
    saver.attach(&mut memo);

    let interval = Duration::from_millis(interval_ms);
    let mut content = memo.content().to_string();
    let mut typed = 0usize;

    for ch in text.chars() {
        content.push(ch);
        memo.set_content(content.as_str());
        typed += 1;
        tokio::time::sleep(interval).await;
    }

    let stats = saver.stats();
    saver.shutdown([&memo]).await?;
    info!(typed, executed = stats.executed, cancelled = stats.cancelled, "Typing finished");

    println!(
        "{} Typed {} characters into {}",
        "✓".green(),
        typed,
        util::short_id(memo.id()).yellow()
    );
    println!(
        "  {} debounced saves, {} superseded",
        stats.executed,
        stats.cancelled
    );
    println!("  {}", util::preview(memo.content(), 60).dimmed());
    Ok(())
}
