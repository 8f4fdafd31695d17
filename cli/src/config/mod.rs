use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use personas_core::{ApiConfig, PersonaService, Profile};

/// CLI preferences. The same file also carries the `[api]` section, which the core library
/// reads on its own together with `PERSONAS_API__*` variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub ui: UiConfig,
    pub logging: LoggingConfig,

    /// File this configuration was read from (or would be)
    #[serde(skip)]
    pub path: PathBuf,

    /// Profile forced on the command line
    #[serde(skip)]
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub color_enabled: bool,
    /// Prompt for missing fields and confirmations
    pub interactive: bool,
    pub default_output_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color_enabled: true,
            interactive: true,
            default_output_format: "table".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Configured level, `warn` when unparsable
    pub fn level(&self) -> tracing::Level {
        self.level.parse().unwrap_or(tracing::Level::WARN)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ui: UiConfig::default(),
            logging: LoggingConfig::default(),
            path: Self::get_config_path().unwrap_or_else(|_| PathBuf::from("personas.toml")),
            profile: None,
        }
    }
}

impl CliConfig {
    /// Load configuration from file or fall back to defaults
    pub fn load(config_override: Option<&Path>, profile: Option<Profile>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        let mut config = if config_path.exists() {
            debug!("Loading configuration from: {}", config_path.display());
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;

            toml::from_str::<CliConfig>(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            debug!("Config file not found, using default configuration");
            Self::default()
        };

        config.path = config_path;
        config.profile = profile;
        Ok(config)
    }

    /// Get the configuration file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .context("Failed to determine config directory")?;

        Ok(config_dir.join("personas").join("config.toml"))
    }

    /// Resolve the API settings from this file, the environment and the profile.
    pub fn api_config(&self) -> Result<Arc<ApiConfig>> {
        let api = ApiConfig::load(Some(&self.path), self.profile)
            .context("Failed to load API configuration")?;
        debug!(base_url = api.base_url(), profile = %api.profile(), "API configuration resolved");
        Ok(Arc::new(api))
    }

    pub fn service(&self) -> Result<PersonaService> {
        PersonaService::from_config(self.api_config()?).context("Failed to create API client")
    }
}
