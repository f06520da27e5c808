//! Memoboard CLI - memo command

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cmd;
mod system_config;
mod util;

use cmd::edit::MemoEdits;
use util::AppContext;

/// Memoboard - Memos that save themselves
#[derive(Parser)]
#[command(name = "memo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding the memo database
    #[arg(long, global = true, env = "MEMO_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, env = "MEMO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a memo
    New {
        #[command(flatten)]
        edits: MemoEdits,
    },
    /// List memos, pinned first
    List {
        /// Only memos carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Show one memo
    Show {
        /// Memo id or unique id prefix
        memo: String,
        /// Print the stored record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit memo fields
    Edit {
        /// Memo id or unique id prefix
        memo: String,
        #[command(flatten)]
        edits: MemoEdits,
    },
    /// Append text one keystroke at a time through the auto-saver
    Type {
        /// Memo id or unique id prefix
        memo: String,
        /// Text to append
        text: String,
        /// Pause between keystrokes (default: 50)
        #[arg(long, default_value = "50")]
        interval_ms: u64,
    },
    /// Delete a memo
    Delete {
        /// Memo id or unique id prefix
        memo: String,
    },
    /// View and edit configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List all configuration values
    List,
    /// Get a configuration value
    Get {
        /// Key, e.g. autosave.delay_ms
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Key, e.g. autosave.delay_ms
        key: String,
        /// New value
        value: String,
    },
    /// Show the config file path
    Path {
        /// Create the file with defaults if missing
        #[arg(long)]
        create: bool,
    },
    /// Print an annotated example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = AppContext::resolve(cli.data_dir, cli.config)?;

    match cli.command {
        Commands::New { edits } => cmd::new::run(&ctx, &edits).await,
        Commands::List { tag } => cmd::list::run(&ctx, tag.as_deref()).await,
        Commands::Show { memo, json } => cmd::show::run(&ctx, &memo, json).await,
        Commands::Edit { memo, edits } => cmd::edit::run(&ctx, &memo, &edits).await,
        Commands::Type { memo, text, interval_ms } => {
            cmd::typing::run(&ctx, &memo, &text, interval_ms).await
        }
        Commands::Delete { memo } => cmd::delete::run(&ctx, &memo).await,
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::List => cmd::config::run_list(&ctx).await,
            ConfigCommands::Get { key } => cmd::config::run_get(&ctx, &key).await,
            ConfigCommands::Set { key, value } => cmd::config::run_set(&ctx, &key, &value).await,
            ConfigCommands::Path { create } => cmd::config::run_path(&ctx, create).await,
            ConfigCommands::Example => cmd::config::run_example().await,
        },
    }
}
