use anyhow::{Context, Result};
use serde::Deserialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::config::DEFAULT_CONFIG_SUFFIX;

/// Optional daemon settings, read from the working directory at startup.
pub const SETTINGS_FILE_NAME: &str = "tipmacro.toml";
pub const DEFAULT_TRIGGER_PATH: &str = "tip.txt";
pub const DEFAULT_CONFIG_DIR: &str = ".";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Deserialize, PartialEq)]
pub struct Settings {
    /// File written by the tip source. Watched for writes.
    #[serde(default = "default_trigger_path")]
    pub trigger_path: PathBuf,
    /// Directory scanned for per-game config files.
    #[serde(default = "default_config_dir")]
    pub config_dir: PathBuf,
    /// File-name suffix that marks a per-game config file.
    #[serde(default = "default_config_suffix")]
    pub config_suffix: String,
    /// `tracing` filter directive, e.g. "info" or "tipmacro_daemon=debug".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            trigger_path: default_trigger_path(),
            config_dir: default_config_dir(),
            config_suffix: default_config_suffix(),
            log_level: default_log_level(),
        }
    }
}

/// Reads the daemon settings: where the trigger file and game configs live,
/// which suffix marks a game config, and the log filter.
///
/// A missing file means "run with defaults". A file that exists but cannot be
/// read, or is not valid TOML, is an error.
pub fn load_or_default(path: &Path) -> Result<Settings> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => {
            return Err(e).with_context(|| format!("cannot read {}", path.display()));
        }
    };
    toml::from_str(&content).with_context(|| format!("invalid settings in {}", path.display()))
}

fn default_trigger_path() -> PathBuf {
    PathBuf::from(DEFAULT_TRIGGER_PATH)
}

fn default_config_dir() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_DIR)
}

fn default_config_suffix() -> String {
    DEFAULT_CONFIG_SUFFIX.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
