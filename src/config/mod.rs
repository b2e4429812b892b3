//! Application configuration for kubedig

use crate::cli::OutputFormat;
use crate::error::{DigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Width used for human output when neither the CLI nor the config file sets one
pub const DEFAULT_OUTPUT_WIDTH: usize = 140;

/// Application configuration stored in ~/.kdig/config.toml
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default output format
    #[serde(default)]
    pub output: OutputFormat,

    /// Whether to use colors in human output
    #[serde(default = "default_true")]
    pub colors: bool,

    /// Maximum width of human output
    #[serde(default = "default_output_width")]
    pub output_width: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputFormat::default(),
            colors: true,
            output_width: DEFAULT_OUTPUT_WIDTH,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_output_width() -> usize {
    DEFAULT_OUTPUT_WIDTH
}

/// Get the kdig config directory (~/.kdig)
pub fn config_dir() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|h| h.join(".kdig"))
        .ok_or_else(|| DigError::Config("Could not determine home directory".to_string()))
}

/// Load application config from ~/.kdig/config.toml
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_dir()?.join("config.toml"))
}

/// Load application config from an explicit path, defaults when the file is absent
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = toml::from_str(&content)?;
    if config.output_width == 0 {
        return Err(DigError::Config("output_width must be positive".to_string()));
    }
    Ok(config)
}
