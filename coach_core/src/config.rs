//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/trnr/config.toml`.

use crate::templates::TemplateSummary;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub trainer: TrainerConfig,

    #[serde(default)]
    pub plans: PlansConfig,

    #[serde(default)]
    pub templates: TemplatesConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Trainer identity stamped onto created plans
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainerConfig {
    #[serde(default = "default_trainer_id")]
    pub id: String,

    #[serde(default)]
    pub display_name: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            id: default_trainer_id(),
            display_name: String::new(),
        }
    }
}

/// Plan defaults configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlansConfig {
    /// Applied when a plan file omits its end date
    #[serde(default = "default_duration_weeks")]
    pub default_duration_weeks: u32,
}

impl Default for PlansConfig {
    fn default() -> Self {
        Self {
            default_duration_weeks: default_duration_weeks(),
        }
    }
}

/// Extra template registry entries
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct TemplatesConfig {
    #[serde(default)]
    pub custom: Vec<TemplateSummary>,
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("trnr")
}

fn default_trainer_id() -> String {
    "local-trainer".into()
}

fn default_duration_weeks() -> u32 {
    4
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("trnr").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
