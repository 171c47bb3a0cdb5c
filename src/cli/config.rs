//! Configuration management using the `config` crate for hierarchical
//! discovery and merging.
//!
//! ## Configuration Sources (in precedence order, highest to lowest):
//! 1. **CLI flags** - Highest precedence (merged separately in [`merge`])
//! 2. **Environment variables** - Middle precedence (via `RULEGATE_*` prefix)
//! 3. **Config files** - Lowest precedence
//!
//! ## Config File Discovery (in merge order, later overrides earlier):
//! 1. `~/.config/rulegate/config.toml` (user config directory)
//! 2. `./rulegate.toml` in the current directory
//! 3. Explicit `--config` path (if provided and exists - overrides all above)

use crate::cli::args::Args;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure loaded from config files.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneralConfig {
    /// Default report format ("text" or "json")
    pub format: Option<String>,
}

/// Engine evaluation settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EngineConfig {
    /// Evaluation timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Final resolved settings after merging config files, env, and CLI flags.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub format: String,
    pub timeout: Option<Duration>,
}

fn discover_config_paths(explicit_path: &PathBuf) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(user_config) = get_user_config_path() {
        paths.push(user_config);
    }

    let current_dir_config = PathBuf::from("rulegate.toml");
    if current_dir_config.exists() {
        paths.push(current_dir_config);
    }

    // Explicit --config path (highest precedence)
    if explicit_path != &PathBuf::from("rulegate.toml") && explicit_path.exists() {
        paths.push(explicit_path.clone());
    }

    paths
}

fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|config_dir| config_dir.join("rulegate").join("config.toml"))
        .filter(|path| path.exists())
}

/// Load configuration from discovered config files and environment variables.
pub fn load(args: &Args) -> Result<Config> {
    let mut builder = config::Config::builder();

    for config_path in discover_config_paths(&args.config) {
        builder = builder.add_source(config::File::from(config_path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("RULEGATE")
            .separator("_")
            .try_parsing(true),
    );

    let settings = builder.build().context("Failed to build configuration")?;

    settings
        .try_deserialize()
        .context("Failed to deserialize configuration")
}

/// Merge CLI flags over file/env configuration.
pub fn merge(args: &Args, config: &Config) -> MergedConfig {
    let format = args.format.map(|f| f.as_str().to_owned()).unwrap_or_else(|| {
        config
            .general
            .format
            .clone()
            .unwrap_or_else(|| "text".to_owned())
    });

    let timeout = args
        .timeout_ms
        .or(config.engine.timeout_ms)
        .map(Duration::from_millis);

    MergedConfig { format, timeout }
}
