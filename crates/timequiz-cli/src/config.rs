//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use timequiz_core::model::DEFAULT_DURATION_SECS;

/// Top-level timequiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimequizConfig {
    /// Quiz file or directory of quiz files.
    #[serde(default = "default_bank_dir")]
    pub bank_dir: PathBuf,
    /// Where quiz progress and results are stored.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Time allowed per quiz, in seconds.
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
}

fn default_bank_dir() -> PathBuf {
    PathBuf::from("quizzes")
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".timequiz")
}
fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

impl Default for TimequizConfig {
    fn default() -> Self {
        Self {
            bank_dir: default_bank_dir(),
            data_dir: default_data_dir(),
            duration_secs: default_duration(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `timequiz.toml` in the current directory
/// 2. `~/.config/timequiz/config.toml`
///
/// Environment variable overrides: `TIMEQUIZ_BANK`, `TIMEQUIZ_DATA_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<TimequizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("timequiz.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<TimequizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => TimequizConfig::default(),
    };

    if let Ok(bank) = std::env::var("TIMEQUIZ_BANK") {
        config.bank_dir = PathBuf::from(bank);
    }
    if let Ok(data_dir) = std::env::var("TIMEQUIZ_DATA_DIR") {
        config.data_dir = PathBuf::from(data_dir);
    }

    config.bank_dir = resolve_path(&config.bank_dir);
    config.data_dir = resolve_path(&config.data_dir);

    anyhow::ensure!(
        config.duration_secs >= 1,
        "duration_secs must be at least 1"
    );

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("timequiz"))
}
