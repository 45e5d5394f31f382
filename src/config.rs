// Configuration loaded from config.yaml

use crate::filter::Filter;
use crate::ids::{IdGenerator, SequentialIds, UuidV7Ids};
use crate::store::DEFAULT_SLOT;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";

/// How new task ids are generated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdScheme {
    #[default]
    Uuid,
    Sequential,
}

impl IdScheme {
    pub fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdScheme::Uuid => Box::new(UuidV7Ids),
            IdScheme::Sequential => Box::new(SequentialIds::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the slot file
    pub store_path: PathBuf,
    pub slot_name: String,
    pub id_scheme: IdScheme,
    /// Filter used by `list` when none is given
    pub default_filter: Filter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            slot_name: DEFAULT_SLOT.to_string(),
            id_scheme: IdScheme::default(),
            default_filter: Filter::default(),
        }
    }
}

impl Config {
    /// Default location: `<config dir>/todostore/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one the default location is
    /// tried, and a missing file there yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(eyre!("Config file not found: {}", path.display()));
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_yaml(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse config YAML")
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
