use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default spot footprint along x, in yard units.
pub const DEFAULT_SPOT_WIDTH: f64 = 2.0;
/// Default spot footprint along y, in yard units.
pub const DEFAULT_SPOT_HEIGHT: f64 = 1.0;

fn default_store() -> PathBuf {
    PathBuf::from("yardgrid.json")
}
fn default_spot_width() -> f64 {
    DEFAULT_SPOT_WIDTH
}
fn default_spot_height() -> f64 {
    DEFAULT_SPOT_HEIGHT
}
fn default_verbose() -> bool {
    false
}

/// Settings read from `yardgrid.toml`. Command-line flags take precedence.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FileConfig {
    /// JSON snapshot the CLI loads and saves
    #[serde(default = "default_store")]
    pub store: PathBuf,
    #[serde(default = "default_spot_width")]
    pub spot_width: f64,
    #[serde(default = "default_spot_height")]
    pub spot_height: f64,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            store: default_store(),
            spot_width: default_spot_width(),
            spot_height: default_spot_height(),
            verbose: default_verbose(),
        }
    }
}

impl FileConfig {
    /// First parseable config on the search path, if any
    pub fn load() -> Option<Self> {
        for path in get_config_paths() {
            if path.exists()
                && let Ok(contents) = std::fs::read_to_string(&path)
            {
                match toml::from_str(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to parse config file {:?}: {}", path, e);
                    }
                }
            }
        }
        None
    }

    /// Load an explicitly named file. Unlike [`FileConfig::load`], a missing
    /// or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

fn get_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    paths.push(PathBuf::from("yardgrid.toml"));
    paths.push(PathBuf::from(".yardgrid.toml"));

    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("yardgrid").join("config.toml"));
        paths.push(config_dir.join("yardgrid.toml"));
    }

    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".yardgrid.toml"));
        paths.push(home.join(".config").join("yardgrid").join("config.toml"));
    }

    paths
}
