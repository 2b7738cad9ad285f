use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use xdg::BaseDirectories;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ranges: RangesConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RangesConfig {
    /// Merge commenting ranges that end up adjacent in the reconstructed
    /// document. Off by default; hosts that render per-hunk gutters want
    /// the ranges kept separate.
    pub coalesce: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Config file path: ~/.config/prdoc/config.toml
    fn config_path() -> PathBuf {
        BaseDirectories::with_prefix("prdoc")
            .map(|dirs| dirs.get_config_home())
            .unwrap_or_else(|_| PathBuf::from(".config"))
            .join("config.toml")
    }
}
