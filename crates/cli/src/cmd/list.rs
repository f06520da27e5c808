//! List memos

use crate::util::{self, AppContext};
use anyhow::Result;
use memo_core::{Memo, MemoStore};
use owo_colors::OwoColorize;

pub async fn run(ctx: &AppContext, tag: Option<&str>) -> Result<()> {
    let journal = ctx.open_journal()?;

    let memos: Vec<Memo> = journal
        .list()?
        .into_iter()
        .map(Memo::from_snapshot)
        .filter(|memo| tag.map_or(true, |tag| memo.tag_list().contains(&tag)))
        .collect();

    if memos.is_empty() {
        println!("{}", "No memos".dimmed());
        return Ok(());
    }

    for memo in &memos {
        let marker = if memo.is_pinned() { "*" } else { " " };
        println!(
            "{} {} {}",
            util::short_id(memo.id()).yellow(),
            marker.magenta(),
            memo.summary()
        );

        let preview = util::preview(memo.content(), 60);
        if !preview.is_empty() {
            println!("           {}", preview.dimmed());
        }
        if memo.has_tags() {
            println!("           {}", memo.tag_list().join(", ").cyan());
        }
    }

    println!();
    println!("{} memos", memos.len());
    Ok(())
}
