use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use prep_core::colour::DEFAULT_PALETTE;
use prep_core::similarity::DEFAULT_THRESHOLD;
use prep_core::DEFAULT_ROW_HEIGHT;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Directory holding the saved session
    pub data_dir: ConfigValue<PathBuf>,
    /// Recipe catalogue: a JSON file path or an http(s) base URL
    pub recipe_source: ConfigValue<Option<String>>,
    /// Rows per column when showing a dish's bags
    pub row_height: ConfigValue<usize>,
    /// Minimum similarity for names to merge in the remaining view
    pub similarity_threshold: ConfigValue<f64>,
    /// Colours handed to dishes without an explicit colour
    pub palette: ConfigValue<Vec<String>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    recipe_source: Option<String>,
    row_height: Option<usize>,
    similarity_threshold: Option<f64>,
    palette: Option<Vec<String>>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut data_dir = ConfigValue::new(Self::default_data_dir(), ConfigSource::Default);
        let mut recipe_source = ConfigValue::new(None, ConfigSource::Default);
        let mut row_height = ConfigValue::new(DEFAULT_ROW_HEIGHT, ConfigSource::Default);
        let mut similarity_threshold = ConfigValue::new(DEFAULT_THRESHOLD, ConfigSource::Default);
        let mut palette = ConfigValue::new(
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect(),
            ConfigSource::Default,
        );
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.data_dir {
                // Resolve relative paths against config file's directory
                let resolved = if dir.is_relative() {
                    path.parent().map(|p| p.join(&dir)).unwrap_or(dir)
                } else {
                    dir
                };
                data_dir = ConfigValue::new(resolved, ConfigSource::File);
            }
            if let Some(source) = file_config.recipe_source {
                recipe_source = ConfigValue::new(Some(source), ConfigSource::File);
            }
            if let Some(height) = file_config.row_height {
                row_height = ConfigValue::new(height, ConfigSource::File);
            }
            if let Some(threshold) = file_config.similarity_threshold {
                if !(0.0..=1.0).contains(&threshold) {
                    return Err(ConfigError::InvalidValue(
                        "similarity_threshold".into(),
                        threshold.to_string(),
                    ));
                }
                similarity_threshold = ConfigValue::new(threshold, ConfigSource::File);
            }
            if let Some(colours) = file_config.palette.filter(|p| !p.is_empty()) {
                palette = ConfigValue::new(colours, ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("PREPBAG_DATA_DIR") {
            data_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(source) = std::env::var("PREPBAG_RECIPE_SOURCE") {
            recipe_source = ConfigValue::new(Some(source), ConfigSource::Environment);
        }
        if let Ok(height) = std::env::var("PREPBAG_ROW_HEIGHT") {
            let parsed = height
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PREPBAG_ROW_HEIGHT".into(), height))?;
            row_height = ConfigValue::new(parsed, ConfigSource::Environment);
        }

        Ok(Self {
            data_dir,
            recipe_source,
            row_height,
            similarity_threshold,
            palette,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/prepbag/
    /// - macOS: ~/Library/Application Support/prepbag/
    /// - Windows: %APPDATA%/prepbag/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prepbag")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/prepbag/
    /// - macOS: ~/Library/Application Support/prepbag/
    /// - Windows: %APPDATA%/prepbag/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prepbag")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidValue(String, String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidValue(key, value) => {
                write!(f, "Invalid value for {}: '{}'", key, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
