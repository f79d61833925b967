use anyhow::{anyhow, Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

use crate::track_selector::TrackType;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Source language code (two-letter)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (two-letter)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Preferred flavour among same-language source tracks
    #[serde(default)]
    pub track_type: TrackType,

    /// Whether to draw a progress bar while translating
    #[serde(default = "default_true")]
    pub show_progress: bool,

    /// Translation service config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Remote translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: Service URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: API key, empty when the service needs none
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Max concurrent requests
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,

    // @field: Attempts per request, first try included
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    // @field: Base backoff in ms, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: String::new(),
            concurrent_requests: default_concurrent_requests(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the `log` facade
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "fr".to_string()
}

fn default_endpoint() -> String {
    "http://localhost:5000".to_string()
}

fn default_concurrent_requests() -> usize {
    5
}

fn default_max_attempts() -> u32 {
    10
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Read a config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Load the config at `path`, writing a default one first if it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        // Membership is checked against the service's language list at run time
        for (role, code) in [("source", &self.source_language), ("target", &self.target_language)] {
            if code.trim().is_empty() {
                return Err(anyhow!("{}_language must not be empty", role));
            }
        }

        if self.translation.concurrent_requests == 0 {
            return Err(anyhow!("translation.concurrent_requests must be at least 1"));
        }

        if self.translation.max_attempts == 0 {
            return Err(anyhow!("translation.max_attempts must be at least 1"));
        }

        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: '{}'", self.translation.endpoint))?;

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_language: default_target_language(),
            track_type: TrackType::default(),
            show_progress: true,
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
