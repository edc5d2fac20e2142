//! YAML run configuration.
//!
//! Loaded once at startup from `config.yml`. Secrets may come from the
//! environment instead of the file; the CLI loads `.env` before calling
//! [`AppConfig::load`].

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::collector::CollectorOptions;
use crate::window::{DateWindow, WindowError};

pub const DEFAULT_CONFIG_PATH: &str = "config.yml";
pub const API_KEY_ENV: &str = "ALPHAVANTAGE_API_KEY";
pub const DB_PASSWORD_ENV: &str = "STOCKDUMP_DB_PASSWORD";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error reading configuration file: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Missing configuration value: {0}")]
    Missing(&'static str),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Invalid date_range: {0}")]
    DateRange(#[from] WindowError),
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub companies: Vec<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    pub database: DatabaseTarget,
    /// Accepted for compatibility with older config files; unused.
    #[serde(default)]
    pub spark: Option<SparkConfig>,
    #[serde(default)]
    pub date_range: Option<DateRangeConfig>,
    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Mysql,
    Sqlite,
}

/// Where the price table lives. Read once, never mutated.
#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseTarget {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub dbname: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: Option<String>,
    /// Database file for the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for DatabaseTarget {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            host: default_host(),
            port: default_port(),
            dbname: String::new(),
            user: String::new(),
            password: None,
            path: None,
        }
    }
}

impl DatabaseTarget {
    /// Connection URL without credentials.
    pub fn url(&self) -> String {
        format!("mysql://{}:{}/{}", self.host, self.port, self.dbname)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SparkConfig {
    #[serde(default)]
    pub jars_path: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DateRangeConfig {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    #[serde(default)]
    pub skip_final_delay: bool,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_secs: default_delay_secs(),
            skip_final_delay: false,
            base_url: default_base_url(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_delay_secs() -> u64 {
    12
}

fn default_base_url() -> String {
    "https://www.alphavantage.co".to_string()
}

impl AppConfig {
    /// Read and validate the file at `path`, applying environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.to_path_buf()),
            _ => ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        Self::from_yaml_with_env(&content, |key| std::env::var(key).ok())
    }

    /// Parse and validate YAML, consulting `env` for overrides.
    pub fn from_yaml_with_env(
        content: &str,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config: AppConfig = serde_yml::from_str(content)?;

        if let Some(key) = env(API_KEY_ENV).filter(|v| !v.is_empty()) {
            config.api_key = Some(key);
        }
        if let Some(password) = env(DB_PASSWORD_ENV) {
            config.database.password = Some(password);
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&mut self) -> Result<(), ConfigError> {
        if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
            return Err(ConfigError::Missing("api_key"));
        }

        let mut seen = HashSet::new();
        let mut companies = Vec::with_capacity(self.companies.len());
        for raw in &self.companies {
            let ticker = raw.trim();
            if ticker.is_empty() {
                return Err(ConfigError::Invalid("companies contains a blank ticker".to_string()));
            }
            if seen.insert(ticker.to_string()) {
                companies.push(ticker.to_string());
            } else {
                tracing::warn!("Ignoring duplicate ticker {}", ticker);
            }
        }
        if companies.is_empty() {
            tracing::warn!("No companies configured; nothing will be fetched");
        }
        self.companies = companies;

        match self.database.backend {
            Backend::Mysql if self.database.dbname.is_empty() => {
                return Err(ConfigError::Missing("database.dbname"));
            }
            Backend::Sqlite if self.database.path.is_none() => {
                return Err(ConfigError::Missing("database.path"));
            }
            _ => {}
        }

        if let Some(jars) = self.spark.as_ref().and_then(|s| s.jars_path.as_deref()) {
            tracing::debug!("Ignoring spark.jars_path {}", jars);
        }

        Ok(())
    }

    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    /// The explicit window for a full reload.
    pub fn historical_window(&self) -> Result<DateWindow, ConfigError> {
        let range = self
            .date_range
            .as_ref()
            .ok_or(ConfigError::Missing("date_range"))?;
        Ok(DateWindow::parse(&range.start_date, &range.end_date)?)
    }

    pub fn collector_options(&self) -> CollectorOptions {
        CollectorOptions {
            delay: Duration::from_secs(self.fetch.delay_secs),
            skip_final_delay: self.fetch.skip_final_delay,
        }
    }
}
