//! Create a memo

use crate::cmd::edit::MemoEdits;
use crate::util::{self, AppContext};
use anyhow::Result;
use memo_core::{Memo, MemoStore};
use owo_colors::OwoColorize;

pub async fn run(ctx: &AppContext, edits: &MemoEdits) -> Result<()> {
    let journal = ctx.open_journal()?;

    let mut memo = Memo::create(
        edits.title.clone().unwrap_or_default(),
        edits.content.clone().unwrap_or_default(),
    );
    edits.apply(&mut memo);

    journal.upsert(&memo.snapshot())?;

    println!(
        "{} Created {} {}",
        "✓".green(),
        util::short_id(memo.id()).cyan(),
        memo.display_title().bold()
    );
    println!("{}", memo.id().as_str().dimmed());
    Ok(())
}
