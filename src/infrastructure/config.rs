//! Configuration management
//!
//! Two layers:
//! - Startup parameters (listen address, real handle, template root) from
//!   positional arguments with environment fallback, or from a dotenv file.
//! - Tuning knobs from an optional config.toml.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment fallback for the listen address
pub const ENV_LISTEN_URL: &str = "LISTEN_URL";
/// Environment fallback for the real handle
pub const ENV_REAL_NAME: &str = "MY_REAL_TELEGRAM_USERNAME";
/// Template root, env-file mode only
pub const ENV_ROOT_PATH: &str = "ROOT_PATH";

/// Upper bound for the generation interval and the cooldown window and jitter
pub const MAX_DURATION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Command line
#[derive(Debug, Clone, Parser)]
#[command(name = "decoy-board", version, about = "Hourly-regenerated decoy leaderboard")]
pub struct StartupArgs {
    /// Listen address; empty falls back to $LISTEN_URL
    #[arg(required_unless_present = "env_file", conflicts_with = "env_file")]
    pub listen_url: Option<String>,

    /// Real handle to inject; empty falls back to $MY_REAL_TELEGRAM_USERNAME
    #[arg(required_unless_present = "env_file", conflicts_with = "env_file")]
    pub real_name: Option<String>,

    /// Directory containing templates/index.html
    #[arg(required_unless_present = "env_file", conflicts_with = "env_file")]
    pub root_path: Option<PathBuf>,

    /// Tuning file (defaults to $CONFIG_PATH, then config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read startup parameters from a dotenv file instead of arguments
    #[arg(long)]
    pub env_file: Option<PathBuf>,
}

/// Resolved startup parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Startup {
    pub listen_addr: String,
    pub real_name: String,
    pub root_path: PathBuf,
}

impl StartupArgs {
    /// Resolve startup parameters against the process environment
    ///
    /// In env-file mode the file is read without touching the process
    /// environment, and its values take precedence over it.
    pub fn resolve(&self) -> Result<Startup, ConfigError> {
        let Some(path) = &self.env_file else {
            return self.resolve_with(|key| std::env::var(key).ok());
        };

        let file = read_env_file(path)?;
        self.resolve_with(|key| file.get(key).cloned().or_else(|| std::env::var(key).ok()))
    }

    /// Resolve startup parameters with a custom variable lookup
    pub fn resolve_with<F>(&self, lookup: F) -> Result<Startup, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.env_file.is_some() {
            return Ok(Startup {
                listen_addr: lookup(ENV_LISTEN_URL).ok_or(ConfigError::Missing(ENV_LISTEN_URL))?,
                real_name: lookup(ENV_REAL_NAME).ok_or(ConfigError::Missing(ENV_REAL_NAME))?,
                root_path: lookup(ENV_ROOT_PATH)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(".")),
            });
        }

        let (Some(listen_url), Some(real_name), Some(root_path)) =
            (&self.listen_url, &self.real_name, &self.root_path)
        else {
            return Err(ConfigError::Arguments);
        };

        Ok(Startup {
            listen_addr: or_env(listen_url, ENV_LISTEN_URL, &lookup),
            real_name: or_env(real_name, ENV_REAL_NAME, &lookup),
            root_path: root_path.clone(),
        })
    }
}

/// Parse a dotenv file into a map
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_error = |e: dotenvy::Error| {
        ConfigError::EnvFile(format!("{}: {}", path.display(), e))
    };

    dotenvy::from_path_iter(path)
        .map_err(env_file_error)?
        .map(|item| item.map_err(env_file_error))
        .collect()
}

fn or_env<F>(value: &str, key: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if value.is_empty() {
        lookup(key).unwrap_or_default()
    } else {
        value.to_string()
    }
}

/// Tuning configuration
///
/// Loaded from config.toml at startup. Every field has a default, so an
/// absent file is the same as an empty one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP front end settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Mount GET /products-csv
    #[serde(default = "default_true")]
    pub csv_export: bool,
}

/// Injection window preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// One day window, up to four hours of jitter
    #[default]
    Daily,
    /// One week window, up to two days of jitter
    Weekly,
}

impl Profile {
    pub fn base_window(self) -> Duration {
        match self {
            Profile::Daily => Duration::from_secs(24 * 60 * 60),
            Profile::Weekly => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }

    pub fn jitter(self) -> Duration {
        match self {
            Profile::Daily => Duration::from_secs(4 * 60 * 60),
            Profile::Weekly => Duration::from_secs(48 * 60 * 60),
        }
    }
}

/// Generator settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorConfig {
    #[serde(default)]
    pub profile: Profile,

    /// Seconds between generation cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Overrides the profile's base window
    #[serde(default)]
    pub base_window_secs: Option<u64>,

    /// Overrides the profile's jitter bound
    #[serde(default)]
    pub jitter_secs: Option<u64>,

    /// Give synthetic records a UUID
    #[serde(default = "default_true")]
    pub emit_ids: bool,

    /// Fixed RNG seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Enables rolling file logs under this directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            csv_export: default_true(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            interval_secs: default_interval_secs(),
            base_window_secs: None,
            jitter_secs: None,
            emit_ids: default_true(),
            seed: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            dir: None,
        }
    }
}

impl GeneratorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn base_window(&self) -> Duration {
        self.base_window_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.profile.base_window())
    }

    pub fn jitter(&self) -> Duration {
        self.jitter_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.profile.jitter())
    }

    /// Reject values the generator cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "generator.interval_secs must be positive".to_string(),
            ));
        }

        let bounded = [
            ("generator.interval_secs", Some(self.interval_secs)),
            ("generator.base_window_secs", self.base_window_secs),
            ("generator.jitter_secs", self.jitter_secs),
        ];
        for (name, value) in bounded {
            if value.is_some_and(|secs| secs > MAX_DURATION_SECS) {
                return Err(ConfigError::Invalid(format!(
                    "{name} exceeds {MAX_DURATION_SECS} seconds"
                )));
            }
        }

        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    60 * 60
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from $CONFIG_PATH or config.toml
    ///
    /// If the file doesn't exist, returns default configuration.
    /// # Errors
    /// Returns error if file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration from an explicit path, defaults if absent
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.generator.validate()?;
        Ok(config)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to load env file {0}")]
    EnvFile(String),

    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("Please supply the correct arguments")]
    Arguments,
}
