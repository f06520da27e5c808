//! Configuration management command
//!
//! Provides CLI interface to view and edit the memoboard configuration.

use crate::system_config::{self, SystemConfig};
use crate::util::AppContext;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Every key `get` and `set` understand
pub const KEYS: &[&str] = &["autosave.delay_ms", "autosave.grace_ms", "storage.data_dir"];

/// List all configuration values
pub async fn run_list(ctx: &AppContext) -> Result<()> {
    let config = &ctx.config;

    println!("{}", "Memoboard Configuration".bold());
    println!(
        "{}: {}\n",
        "Location".dimmed(),
        ctx.config_path.display().dimmed()
    );

    println!("{}", "[autosave]".yellow());
    println!(
        "  {} = {} {}",
        "delay_ms".cyan(),
        config.autosave.delay_ms,
        "(quiet period before saving)".dimmed()
    );
    println!(
        "  {} = {} {}",
        "grace_ms".cyan(),
        config.autosave.grace_ms,
        "(flush wait for a running save)".dimmed()
    );

    println!("\n{}", "[storage]".yellow());
    match &config.storage.data_dir {
        Some(dir) => println!("  {} = {}", "data_dir".cyan(), dir.display()),
        None => println!(
            "  {} = {} {}",
            "data_dir".cyan(),
            ctx.data_dir().display(),
            "(default)".dimmed()
        ),
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  delay_ms: 1-60000");
    println!("  grace_ms: 0-5000");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(ctx: &AppContext, key: &str) -> Result<()> {
    println!("{}", get_value(&ctx.config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(ctx: &AppContext, key: &str, value: &str) -> Result<()> {
    let mut config = ctx.config.clone();
    set_value(&mut config, key, value)?;

    // Validate before saving
    config.validate().context("Invalid configuration value")?;

    system_config::save(&ctx.config_path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(ctx: &AppContext, create: bool) -> Result<()> {
    let config_path = &ctx.config_path;

    if create && system_config::init_if_missing(config_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    println!("{}", system_config::example_config());
    Ok(())
}

fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "autosave.delay_ms" => config.autosave.delay_ms.to_string(),
        "autosave.grace_ms" => config.autosave.grace_ms.to_string(),
        "storage.data_dir" => config
            .storage
            .data_dir
            .as_ref()
            .map(|dir| dir.display().to_string())
            .unwrap_or_default(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Known keys: {}",
            key,
            KEYS.join(", ")
        ),
    };
    Ok(value)
}

fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "autosave.delay_ms" => {
            config.autosave.delay_ms = value
                .parse()
                .context("Invalid value: must be a positive integer")?;
        }
        "autosave.grace_ms" => {
            config.autosave.grace_ms = value
                .parse()
                .context("Invalid value: must be a non-negative integer")?;
        }
        "storage.data_dir" => {
            config.storage.data_dir = if value.is_empty() {
                None
            } else {
                Some(PathBuf::from(value))
            };
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Known keys: {}",
            key,
            KEYS.join(", ")
        ),
    }
    Ok(())
}
