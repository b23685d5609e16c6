//! Configuration loading and library folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// TOML configuration file contents
///
/// All fields are optional; missing values fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Library root folder (database and exported files live here)
    pub library_folder: Option<String>,

    /// Import pipeline settings
    #[serde(default)]
    pub import: ImportConfig,
}

/// Import pipeline settings from the `[import]` TOML table
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Timeout for the external encode call, in seconds
    pub encode_timeout_secs: u64,

    /// Maximum edge length of generated thumbnails, in pixels
    pub thumbnail_max_edge: u32,

    /// Bounded fan-out for the file pre-read phase
    pub read_concurrency: usize,

    /// Model identifier passed to the external encoder
    pub encode_model: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            encode_timeout_secs: 30,
            thumbnail_max_edge: 256,
            read_concurrency: 8,
            encode_model: "vibe-encoder-v4".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from a TOML string
    pub fn from_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load configuration from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str(&contents)
    }
}

/// Library folder resolution priority order:
/// 1. Explicit argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_library_folder(
    explicit: Option<&str>,
    env_var_name: &str,
    config: Option<&TomlConfig>,
) -> Result<PathBuf> {
    // Priority 1: Explicit argument
    if let Some(path) = explicit {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Some(config) = config {
        if let Some(folder) = &config.library_folder {
            return Ok(PathBuf::from(folder));
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_library_folder())
}

/// Get default configuration file path for the platform
pub fn default_config_path() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("vibelib").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
}

/// Get OS-dependent default library folder path
pub fn default_library_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("vibelib"))
        .unwrap_or_else(|| PathBuf::from("./vibelib_data"))
}
