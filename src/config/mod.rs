//! Configuration management for autobox
//!
//! This module handles loading, parsing, and managing configuration from various sources:
//! - Configuration files (TOML format)
//! - Environment variables
//! - Command-line arguments
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::complete::{DEFAULT_MAX_ROWS, LookupMode, Triggers};
use crate::error::{ConfigError, Result};

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "AUTOBOX_LOG_LEVEL";

/// Environment variable overriding the candidate file
pub const ENV_CANDIDATES: &str = "AUTOBOX_CANDIDATES";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Trigger symbols
    #[serde(default)]
    pub triggers: TriggersConfig,

    /// Suggestion list configuration
    #[serde(default)]
    pub suggestions: SuggestionsConfig,

    /// Candidate lookup configuration
    #[serde(default)]
    pub lookup: LookupConfig,

    /// Candidate data source
    #[serde(default)]
    pub candidates: CandidatesConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Trigger symbol configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggersConfig {
    /// Hashtag symbol (one character)
    #[serde(default = "default_hashtag")]
    pub hashtag: String,

    /// At-mention symbol (one character)
    #[serde(default = "default_at_mention")]
    pub at_mention: String,

    /// Relation symbol (two distinct characters)
    #[serde(default = "default_relation")]
    pub relation: String,
}

/// Suggestion list configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsConfig {
    /// Maximum number of rows shown
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

/// Candidate lookup configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Blocking lookups inside the reaction, or deferred to a background task
    #[serde(default)]
    pub mode: LookupMode,

    /// Upper bound for a deferred lookup in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// Candidate data source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidatesConfig {
    /// TOML or JSON candidate file; the built-in samples are used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

/// Display and output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Path to log file (None for stderr)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_hashtag() -> String {
    Triggers::DEFAULT_HASHTAG.to_string()
}

fn default_at_mention() -> String {
    Triggers::DEFAULT_AT_MENTION.to_string()
}

fn default_relation() -> String {
    Triggers::DEFAULT_RELATION.to_string()
}

fn default_max_rows() -> usize {
    DEFAULT_MAX_ROWS
}

fn default_timeout_ms() -> u64 {
    500
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    true
}

impl Default for TriggersConfig {
    fn default() -> Self {
        Self {
            hashtag: default_hashtag(),
            at_mention: default_at_mention(),
            relation: default_relation(),
        }
    }
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            max_rows: default_max_rows(),
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            mode: LookupMode::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_path: None,
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.display().to_string()),
            _ => ConfigError::Generic(format!("{}: {e}", path.display())),
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::InvalidFormat(format!("{}: {e}", path.display())))?;
        Ok(config)
    }

    /// Load configuration from the file and the environment
    ///
    /// An explicit `path` must exist; the default path is optional and falls
    /// back to defaults when missing.
    ///
    /// # Arguments
    /// * `path` - Configuration file given on the command line, if any
    ///
    /// # Returns
    /// * `Result<Config>` - Merged configuration or error
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides
    ///
    /// # Arguments
    /// * `var` - Looks up an environment variable by name
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(level) = var(ENV_LOG_LEVEL) {
            self.logging.level = level.parse()?;
        }
        if let Some(file) = var(ENV_CANDIDATES).filter(|f| !f.is_empty()) {
            self.candidates.file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".autobox")
            .join("config.toml")
    }

    /// Save configuration to a file
    ///
    /// # Arguments
    /// * `path` - Path where to save the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Generic(format!("Failed to serialize config: {e}")).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        self.triggers()?;

        if self.suggestions.max_rows == 0 {
            return Err(ConfigError::InvalidValue {
                field: "suggestions.max_rows".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        if self.lookup.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "lookup.timeout_ms".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Build the trigger symbol registry
    pub fn triggers(&self) -> Result<Triggers> {
        let triggers = Triggers::new(
            &self.triggers.hashtag,
            &self.triggers.at_mention,
            &self.triggers.relation,
        )?;
        Ok(triggers)
    }

    /// Get lookup timeout as Duration
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup.timeout_ms)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
