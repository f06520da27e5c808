//! Show memo details

use crate::util::{self, AppContext};
use anyhow::{Context, Result};
use memo_core::{Memo, MemoStore};
use owo_colors::OwoColorize;

/// Show everything stored for one memo
pub async fn run(ctx: &AppContext, reference: &str, json: bool) -> Result<()> {
    let journal = ctx.open_journal()?;
    let id = util::resolve_memo_ref(reference, &journal)?;
    let snapshot = journal
        .get(&id)?
        .with_context(|| format!("Memo not found: {}", id))?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&snapshot).context("Failed to serialize memo")?;
        println!("{}", rendered);
        return Ok(());
    }

    let memo = Memo::from_snapshot(snapshot);

    println!("{} {}", "memo".yellow().bold(), memo.id().as_str().cyan());
    println!("{} {}", "Title:     ".dimmed(), memo.display_title().bold());
    println!(
        "{} {} ({})",
        "Created:   ".dimmed(),
        memo.created_at().format("%Y-%m-%d %H:%M:%S UTC"),
        util::format_relative_time(memo.created_at()).dimmed()
    );
    println!(
        "{} {} ({})",
        "Updated:   ".dimmed(),
        memo.formatted_updated_at(),
        util::format_relative_time(memo.updated_at()).dimmed()
    );
    println!(
        "{} {}",
        "Pinned:    ".dimmed(),
        if memo.is_pinned() { "yes" } else { "no" }
    );
    println!("{} {}", "Priority:  ".dimmed(), memo.priority());

    if !memo.category().is_empty() {
        println!("{} {}", "Category:  ".dimmed(), memo.category());
    }
    if memo.has_tags() {
        println!("{} {}", "Tags:      ".dimmed(), memo.tag_list().join(", ").cyan());
    }

    if !memo.content().is_empty() {
        println!();
        for line in memo.content().lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}
