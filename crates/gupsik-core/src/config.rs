use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;
use crate::types::{LocaleIdentity, MealSlot};

/// Environment variable that overrides `neis.api_key`.
pub const API_KEY_ENV: &str = "NEIS_API_KEY";

const API_KEY_PLACEHOLDER: &str = "YOUR_NEIS_API_KEY";
const DEFAULT_BASE_URL: &str = "https://open.neis.go.kr/hub";
// 경상북도교육청 / 경덕중학교
const DEFAULT_EDU_CODE: &str = "R10";
const DEFAULT_SCHOOL_CODE: &str = "8791090";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the selection store; the config file's own
    /// directory when the file leaves it out
    #[serde(default)]
    pub config_dir: PathBuf,

    /// NEIS open API settings
    pub neis: NeisConfig,

    /// Persisted selection settings
    #[serde(default)]
    pub store: StoreConfig,
}

/// NEIS open API settings consumed by the query builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeisConfig {
    /// API key issued by open.neis.go.kr
    #[serde(default = "default_api_key")]
    pub api_key: String,

    /// Base URL of the hub; endpoint names are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Education office code used when no school is selected
    pub default_edu_code: String,

    /// School code used when no school is selected
    pub default_school_code: String,

    /// Meal slot used when a query names none
    #[serde(default)]
    pub default_meal_slot: MealSlot,
}

impl NeisConfig {
    /// Check if the API key is set (not the placeholder)
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_key.starts_with("YOUR_")
    }

    /// Locale used when neither the caller nor a persisted selection names one
    pub fn default_locale(&self) -> LocaleIdentity {
        LocaleIdentity::new(&self.default_edu_code, &self.default_school_code)
    }
}

impl Default for NeisConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            base_url: default_base_url(),
            default_edu_code: DEFAULT_EDU_CODE.to_string(),
            default_school_code: DEFAULT_SCHOOL_CODE.to_string(),
            default_meal_slot: MealSlot::Lunch,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// File name of the key-value store, relative to `config_dir`
    #[serde(default = "default_store_file")]
    pub file_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file_name: default_store_file(),
        }
    }
}

fn default_api_key() -> String {
    API_KEY_PLACEHOLDER.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_store_file() -> String {
    "selection.json".to_string()
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gupsik")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            neis: NeisConfig::default(),
            store: StoreConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing.
    ///
    /// `NEIS_API_KEY` overrides the file's api key in memory only; it is never
    /// written back to disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        Self::load_with_key(path, std::env::var(API_KEY_ENV).ok())
    }

    fn load_with_key(path: &Path, env_key: Option<String>) -> Result<Self> {
        let file_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let mut config: Config =
                toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;
            if config.config_dir.as_os_str().is_empty() {
                config.config_dir = file_dir;
            }
            config
        } else {
            let config = Self {
                config_dir: file_dir,
                ..Self::default()
            };
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            config
        };

        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            config.neis.api_key = key;
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; errors fail the load.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.neis.base_url, "neis.base_url", &mut result);

        if self.neis.default_edu_code.trim().is_empty() {
            result.add_error("neis.default_edu_code", "Education office code must not be empty");
        }

        if self.neis.default_school_code.trim().is_empty() {
            result.add_error("neis.default_school_code", "School code must not be empty");
        }

        if self.store.file_name.trim().is_empty() {
            result.add_error("store.file_name", "Store file name must not be empty");
        }

        // NEIS answers keyless requests with sample data only
        if !self.neis.is_configured() {
            result.add_warning(
                "neis.api_key",
                format!("API key not configured - set it in config.toml or {}", API_KEY_ENV),
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.query().is_some() {
                    result.add_error(field_name, "URL must not carry a query string");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Path of the key-value store holding the selected school
    pub fn store_path(&self) -> PathBuf {
        self.config_dir.join(&self.store.file_name)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("gupsik");

        Ok(config_dir.join("config.toml"))
    }
}
