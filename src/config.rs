use std::path::{Path, PathBuf};

use anyhow::Context;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::lifecycle::TimerMode;

/// Settings loaded from the TOML config file. Everything has a default, so
/// a missing file just means defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user: UserConfig,
    pub timer: TimerConfig,
}

/// The acting user. Single-tenant tool, so identity is a config entry
/// rather than a login: a display name for assignee attribution and an
/// admin flag that gates rating.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub name: String,
    pub admin: bool,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            name: "operator".to_string(),
            admin: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    pub mode: TimerMode,
}

/// Default config file location, alongside the platform config dir.
pub fn find_default_config_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("com", "titan", "titan")?;
    let mut path = PathBuf::from(dirs.config_dir());
    path.push("config.toml");
    Some(path)
}

/// Load the config file, falling back to defaults when it does not exist.
pub fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path.map(PathBuf::from).or_else(find_default_config_file) {
        Some(p) => p,
        None => return Ok(Config::default()),
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = toml::from_str(&text)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}
