use std::path::{Path, PathBuf};

use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

/// Prefix shared by every environment variable the application reads
pub const ENV_PREFIX: &str = "PORTFOLIO_";

/// Configuration for the application
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Path of the SQLite database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    /// Where log lines go. Nothing is logged when unset
    #[serde(default)]
    pub log_file: Option<PathBuf>,
    /// `EnvFilter` directive, e.g. `info` or `portfolio_manager=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("portfolio.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// This function will:
    /// 1. Load variables from .env file if it exists
    /// 2. Deserialize `PORTFOLIO_*` environment variables into Config struct
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::prefixed(ENV_PREFIX).from_env::<Config>()?;

        Ok(config)
    }

    /// Build a Config from explicit key/value pairs instead of the process environment
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config = envy::prefixed(ENV_PREFIX).from_iter::<_, Config>(vars)?;
        Ok(config)
    }

    /// Apply command line overrides on top of the environment
    pub fn with_overrides(mut self, database: Option<PathBuf>, log_file: Option<PathBuf>) -> Self {
        if let Some(path) = database {
            self.database_path = path;
        }
        if log_file.is_some() {
            self.log_file = log_file;
        }
        self
    }

    pub fn database_path(&self) -> &Path {
        &self.database_path
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    dotenv().ok();

    let config = Config::load()?;

    Ok(config)
}
