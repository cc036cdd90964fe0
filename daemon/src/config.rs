use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use crate::validate_enum;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralSettings,

    #[serde(default)]
    pub assets: AssetSettings,

    #[serde(default)]
    pub rotation: RotationSettings,

    #[serde(default)]
    pub preferences: PreferenceSettings,
}

/// General daemon settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Where the video assets come from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AssetSettings {
    /// Files, directories or glob patterns
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            sources: default_sources(),
            extensions: default_extensions(),
        }
    }
}

fn default_sources() -> Vec<String> {
    vec!["~/Videos/backdrops".to_string()]
}
fn default_extensions() -> Vec<String> {
    vec![
        "mp4".to_string(),
        "webm".to_string(),
        "ogv".to_string(),
        "mkv".to_string(),
        "mov".to_string(),
    ]
}

/// Automatic rotation settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationSettings {
    /// Seconds between automatic video changes
    #[serde(default = "default_interval")]
    pub interval: u64,
}

impl Default for RotationSettings {
    fn default() -> Self {
        Self {
            interval: default_interval(),
        }
    }
}

fn default_interval() -> u64 {
    900
} // 15 minutes

/// Preference store settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreferenceSettings {
    /// Override for the preferences file location
    #[serde(default)]
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded configuration from {}", path.display());
        config.validate()?;

        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    fn config_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Failed to get config directory")?
            .join("backdrop"))
    }

    /// Resolve where preferences are persisted
    pub fn preferences_path(&self) -> Result<PathBuf> {
        match self.preferences.path {
            Some(ref path) => Ok(PathBuf::from(shellexpand::tilde(path).to_string())),
            None => Ok(Self::config_dir()?.join("preferences.json")),
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        self.validate_log_level(&self.general.log_level)?;

        if self.rotation.interval == 0 {
            anyhow::bail!("Rotation interval must be at least one second");
        }

        if self.assets.extensions.is_empty() {
            anyhow::bail!("At least one video extension is required");
        }

        Ok(())
    }

    fn validate_log_level(&self, level: &str) -> Result<()> {
        validate_enum!(level, "trace", "debug", "info", "warn", "error")
    }
}
