//! Settings management command
//!
//! Provides CLI interface to view and edit the settings file.

use anyhow::{Context, Result};
use cli_lib::settings;
use owo_colors::OwoColorize;

/// List all settings
pub async fn run_list() -> Result<()> {
    let config = settings::load()?;
    let config_path = settings::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Settings".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[hackernews]".yellow());
    println!("  {} = {}", "base_url".cyan(), config.hackernews.base_url);
    println!(
        "  {} = {} {}",
        "request_timeout_secs".cyan(),
        config.hackernews.request_timeout_secs,
        format!("({}s)", config.hackernews.request_timeout_secs).dimmed()
    );
    println!("  {} = {}", "user_agent".cyan(), config.hackernews.user_agent);
    println!("  {} = {}", "page_size".cyan(), config.hackernews.page_size);

    println!("\n{}", "[animator]".yellow());
    println!(
        "  {} = {} {}",
        "anchor_interval".cyan(),
        config.animator.anchor_interval,
        "(actions between snapshots)".dimmed()
    );
    println!("  {} = {}", "max_anchors".cyan(), config.animator.max_anchors);

    println!("\n{}", "Valid Ranges:".bold());
    println!("  request_timeout_secs: 1+");
    println!("  page_size: 1-1000");
    println!("  anchor_interval: 1-100,000");
    println!("  max_anchors: 1-1024");

    Ok(())
}

/// Get a single setting
pub async fn run_get(key: &str) -> Result<()> {
    let config = settings::load()?;
    println!("{}", config.get(key)?);
    Ok(())
}

/// Set a single setting
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = settings::load()?;
    config.set(key, value)?;

    // Validate before saving
    config.validate()
        .context("Invalid configuration value")?;

    settings::save(&config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    Ok(())
}

/// Show the settings file path and optionally create it
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = settings::config_file_path()
        .context("Could not determine config file path")?;

    if create && settings::init_if_missing()? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example settings
pub async fn run_example() -> Result<()> {
    println!("{}", settings::example_config());
    Ok(())
}
