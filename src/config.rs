use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

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

/// Document store connection settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StoreConfig {
    /// Cloud project that owns the database
    pub project_id: Option<String>,
    /// Database id (default: "(default)")
    pub database_id: Option<String>,
    /// OAuth access token, e.g. from `gcloud auth print-access-token`
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Emulator address (e.g. "localhost:8080"); plain HTTP, no real auth
    pub emulator_host: Option<String>,
}

impl StoreConfig {
    /// Returns true if a project is set
    pub fn is_configured(&self) -> bool {
        self.project_id.is_some()
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Root folder for folder-mode export/import
    pub export_dir: ConfigValue<PathBuf>,
    /// Single-file structure snapshot
    pub structure_file: ConfigValue<PathBuf>,
    /// Convert timestamps to UTC+7 strings and sharedWith maps to arrays
    pub normalize_timestamps: ConfigValue<bool>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Store configuration
    pub store: StoreConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    export_dir: Option<PathBuf>,
    structure_file: Option<PathBuf>,
    normalize_timestamps: Option<bool>,
    store: Option<StoreConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut export_dir = ConfigValue::new(PathBuf::from("collections"), ConfigSource::Default);
        let mut structure_file = ConfigValue::new(
            PathBuf::from("exported_structure").join("db_structure.json"),
            ConfigSource::Default,
        );
        let mut normalize_timestamps = ConfigValue::new(true, ConfigSource::Default);
        let mut config_file = None;
        let mut store = StoreConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(dir) = file_config.export_dir {
                export_dir = ConfigValue::new(resolve(&path, dir), ConfigSource::File);
            }
            if let Some(file) = file_config.structure_file {
                structure_file = ConfigValue::new(resolve(&path, file), ConfigSource::File);
            }
            if let Some(normalize) = file_config.normalize_timestamps {
                normalize_timestamps = ConfigValue::new(normalize, ConfigSource::File);
            }
            if let Some(store_config) = file_config.store {
                store = store_config;
            }
        }

        // Apply environment variable overrides
        if let Ok(dir) = std::env::var("DOCMIRROR_EXPORT_DIR") {
            export_dir = ConfigValue::new(PathBuf::from(dir), ConfigSource::Environment);
        }
        if let Ok(file) = std::env::var("DOCMIRROR_STRUCTURE_FILE") {
            structure_file = ConfigValue::new(PathBuf::from(file), ConfigSource::Environment);
        }
        if let Ok(flag) = std::env::var("DOCMIRROR_NORMALIZE_TIMESTAMPS") {
            match parse_bool(&flag) {
                Some(normalize) => {
                    normalize_timestamps =
                        ConfigValue::new(normalize, ConfigSource::Environment);
                }
                None => {
                    tracing::warn!(
                        "Ignoring DOCMIRROR_NORMALIZE_TIMESTAMPS={:?}: expected true or false",
                        flag
                    );
                }
            }
        }
        // Store env var overrides
        if let Ok(project) = std::env::var("DOCMIRROR_PROJECT_ID") {
            store.project_id = Some(project);
        } else if let Ok(project) = std::env::var("GOOGLE_CLOUD_PROJECT") {
            if store.project_id.is_none() {
                store.project_id = Some(project);
            }
        }
        if let Ok(database) = std::env::var("DOCMIRROR_DATABASE_ID") {
            store.database_id = Some(database);
        }
        if let Ok(token) = std::env::var("DOCMIRROR_ACCESS_TOKEN") {
            store.access_token = Some(token);
        }
        if let Ok(host) = std::env::var("FIRESTORE_EMULATOR_HOST") {
            store.emulator_host = Some(host);
        }

        Ok(Self {
            export_dir,
            structure_file,
            normalize_timestamps,
            config_file,
            store,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/docmirror/
    /// - macOS: ~/Library/Application Support/docmirror/
    /// - Windows: %APPDATA%/docmirror/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("docmirror")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

/// Resolve relative paths against the config file's directory
fn resolve(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
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
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ReadError(_, e) => Some(e),
            ConfigError::ParseError(_, e) => Some(e),
        }
    }
}
