// src/config.rs

//! Configuration loading utilities.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Load configuration from a TOML file.
///
/// Falls back to defaults if loading fails.
pub fn load_config(path: &Path) -> Config {
    Config::load_or_default(path)
}

/// Load and validate configuration, failing on any problem.
///
/// Used by the `validate` command, where a silent fallback to defaults
/// would hide the mistake being checked for.
pub fn load_validated(path: &Path) -> Result<Config> {
    let config = Config::load(path)
        .map_err(|e| AppError::config(format!("{}: {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}
