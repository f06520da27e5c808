//! Delete a memo

use crate::util::{self, AppContext};
use anyhow::Result;
use memo_core::MemoStore;
use owo_colors::OwoColorize;

pub async fn run(ctx: &AppContext, reference: &str) -> Result<()> {
    let journal = ctx.open_journal()?;
    let id = util::resolve_memo_ref(reference, &journal)?;

    if journal.delete(&id)? {
        println!("{} Deleted {}", "✓".green(), util::short_id(&id).cyan());
    } else {
        println!("{}", format!("Memo {} was already gone", id).yellow());
    }
    Ok(())
}
