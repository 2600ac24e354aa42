// src/config.rs

//! Configuration for `cellmetrics`.
//!
//! Settings are read from a JSON document. Every section carries
//! `#[serde(default)]`, so a file only needs to name the values it changes:
//!
//! ```json
//! { "fallback": { "cell_height_px": 18 }, "output": { "format": "json" } }
//! ```

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use log::{debug, error};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "CELLMETRICS_CONFIG";

const CONFIG_DIR_NAME: &str = "cellmetrics";
const CONFIG_FILE_NAME: &str = "config.json";

/// Process-wide configuration, loaded on first use.
pub static CONFIG: Lazy<Config> = Lazy::new(|| match Config::load() {
    Ok(config) => config,
    Err(e) => {
        error!("Failed to load configuration, using defaults: {:#}", e);
        Config::default()
    }
});

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Cell size to report when the terminal gives no usable pixel size.
    pub fallback: FallbackConfig,
    pub output: OutputConfig,
}

/// Cell size used when the terminal does not report its pixel dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FallbackConfig {
    pub cell_width_px: u16,
    pub cell_height_px: u16,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        // 8x16 VGA text mode cell.
        FallbackConfig {
            cell_width_px: 8,
            cell_height_px: 16,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Json,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid configuration document")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_json_str(&text).with_context(|| format!("parsing {}", path.display()))
    }

    /// Loads the first configuration file found, or defaults if there is none.
    ///
    /// A path given through `CELLMETRICS_CONFIG` must exist.
    pub fn load() -> Result<Self> {
        if let Some(explicit) = std::env::var_os(CONFIG_PATH_ENV) {
            return Self::from_file(Path::new(&explicit));
        }

        match default_config_path() {
            Some(path) if path.is_file() => {
                debug!("Loading configuration from {}", path.display());
                Self::from_file(&path)
            }
            Some(path) => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }
}

/// `$XDG_CONFIG_HOME/cellmetrics/config.json`, or the same under `$HOME/.config`.
pub fn default_config_path() -> Option<PathBuf> {
    config_path_from(
        std::env::var_os("XDG_CONFIG_HOME"),
        std::env::var_os("HOME"),
    )
}

/// Empty variables count as unset.
fn config_path_from(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg_config_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|v| !v.is_empty())
                .map(|home| PathBuf::from(home).join(".config"))
        })?;
    Some(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
