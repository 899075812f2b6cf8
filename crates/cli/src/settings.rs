//! User settings
//!
//! Stored as TOML under the platform config directory. Missing sections and
//! keys fall back to their defaults, so a partial file is always valid.

use animator::AnchorPolicy;
use anyhow::{Context, Result};
use hackernews::HackerNewsConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the settings location
pub const CONFIG_ENV: &str = "READER_CONFIG";

/// Every key accepted by `get` and `set`
pub const KEYS: &[&str] = &[
    "hackernews.base_url",
    "hackernews.request_timeout_secs",
    "hackernews.user_agent",
    "hackernews.page_size",
    "animator.anchor_interval",
    "animator.max_anchors",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hackernews: HackerNewsConfig,
    pub animator: AnchorPolicy,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.hackernews.validate().context("Invalid [hackernews] settings")?;

        if !(1..=100_000).contains(&self.animator.anchor_interval) {
            anyhow::bail!(
                "animator.anchor_interval must be between 1 and 100000, got {}",
                self.animator.anchor_interval
            );
        }
        if !(1..=1024).contains(&self.animator.max_anchors) {
            anyhow::bail!(
                "animator.max_anchors must be between 1 and 1024, got {}",
                self.animator.max_anchors
            );
        }
        Ok(())
    }

    /// Current value of `key` as a string
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "hackernews.base_url" => self.hackernews.base_url.clone(),
            "hackernews.request_timeout_secs" => self.hackernews.request_timeout_secs.to_string(),
            "hackernews.user_agent" => self.hackernews.user_agent.clone(),
            "hackernews.page_size" => self.hackernews.page_size.to_string(),
            "animator.anchor_interval" => self.animator.anchor_interval.to_string(),
            "animator.max_anchors" => self.animator.max_anchors.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'reader config list' to see available keys.",
                key
            ),
        };
        Ok(value)
    }

    /// Parse `value` into `key`; does not validate ranges
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "hackernews.base_url" => self.hackernews.base_url = value.to_string(),
            "hackernews.request_timeout_secs" => {
                self.hackernews.request_timeout_secs = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            "hackernews.user_agent" => self.hackernews.user_agent = value.to_string(),
            "hackernews.page_size" => {
                self.hackernews.page_size = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            "animator.anchor_interval" => {
                self.animator.anchor_interval = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            "animator.max_anchors" => {
                self.animator.max_anchors = value
                    .parse()
                    .context("Invalid value: must be a positive integer")?;
            }
            _ => anyhow::bail!(
                "Unknown config key: {}. Use 'reader config list' to see available keys.",
                key
            ),
        }
        Ok(())
    }
}

/// Location of the settings file
///
/// `$READER_CONFIG` wins; otherwise `<config dir>/threadreader/config.toml`.
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("threadreader").join("config.toml"))
}

/// Load settings from the default location
pub fn load() -> Result<Settings> {
    let path = config_file_path().context("Could not determine config file path")?;
    load_from(&path)
}

/// Load settings from `path`; a missing file yields defaults
pub fn load_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: Settings = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    settings
        .validate()
        .with_context(|| format!("Invalid settings in {}", path.display()))?;
    Ok(settings)
}

/// Save settings to the default location
pub fn save(settings: &Settings) -> Result<()> {
    let path = config_file_path().context("Could not determine config file path")?;
    save_to(settings, &path)
}

pub fn save_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
    fs::write(path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Write the example file if nothing exists yet; returns whether it did
pub fn init_if_missing() -> Result<bool> {
    let path = config_file_path().context("Could not determine config file path")?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, example_config())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Commented settings file with every default spelled out
pub fn example_config() -> String {
    let defaults = Settings::default();
    format!(
        r#"# Thread reader settings

[hackernews]
# Algolia API origin
base_url = "{base_url}"
# Per-request timeout (1+ seconds)
request_timeout_secs = {timeout}
user_agent = "{user_agent}"
# Stories per listing page (1-1000)
page_size = {page_size}

[animator]
# Snapshot the drawing state every N logged actions (1-100000)
anchor_interval = {interval}
# Upper bound on kept snapshots (1-1024)
max_anchors = {max_anchors}
"#,
        base_url = defaults.hackernews.base_url,
        timeout = defaults.hackernews.request_timeout_secs,
        user_agent = defaults.hackernews.user_agent,
        page_size = defaults.hackernews.page_size,
        interval = defaults.animator.anchor_interval,
        max_anchors = defaults.animator.max_anchors,
    )
}
