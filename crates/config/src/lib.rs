//! Configuration loading, validation, and management for Plansmith.
//!
//! Loads configuration from `~/.plansmith/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.plansmith/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion/embedding endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chat model used for schedule generation
    #[serde(default = "default_model")]
    pub model: String,

    /// Model used to embed document chunks and queries
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Per-call timeout for provider requests, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// SQLite database file (defaults to `~/.plansmith/plansmith.db`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<String>,

    /// Generate/validate/retry loop settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Document chunking settings
    #[serde(default)]
    pub ingestion: IngestionConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_request_timeout_secs() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("database_path", &self.database_path)
            .field("generation", &self.generation)
            .field("ingestion", &self.ingestion)
            .finish()
    }
}

/// Settings for one schedule generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Total completion calls allowed per request (not retries beyond the first)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Passages at or above this distance are discarded
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,

    /// Temperature for the first attempt
    #[serde(default = "default_first_attempt_temperature")]
    pub first_attempt_temperature: f32,

    /// Temperature for corrective retries
    #[serde(default = "default_retry_temperature")]
    pub retry_temperature: f32,

    /// How many passages to request from the document index
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_max_retries() -> u32 {
    3
}
fn default_relevance_threshold() -> f32 {
    1.0
}
fn default_first_attempt_temperature() -> f32 {
    0.7
}
fn default_retry_temperature() -> f32 {
    0.5
}
fn default_top_k() -> usize {
    5
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            relevance_threshold: default_relevance_threshold(),
            first_attempt_temperature: default_first_attempt_temperature(),
            retry_temperature: default_retry_temperature(),
            top_k: default_top_k(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    100
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.plansmith/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `PLANSMITH_API_KEY`, then `OPENAI_API_KEY` (only if no key in the file)
    /// - `PLANSMITH_API_URL`
    /// - `PLANSMITH_MODEL`
    /// - `PLANSMITH_DB`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if config.api_key.is_none() {
            config.api_key = std::env::var("PLANSMITH_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(url) = std::env::var("PLANSMITH_API_URL") {
            config.api_url = url;
        }

        if let Ok(model) = std::env::var("PLANSMITH_MODEL") {
            config.model = model;
        }

        if let Ok(path) = std::env::var("PLANSMITH_DB") {
            config.database_path = Some(path);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".plansmith")
    }

    /// Resolved SQLite database path.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("plansmith.db"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generation;

        if g.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_retries must be at least 1".into(),
            ));
        }

        if g.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "generation.top_k must be at least 1".into(),
            ));
        }

        for (name, t) in [
            ("first_attempt_temperature", g.first_attempt_temperature),
            ("retry_temperature", g.retry_temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(ConfigError::ValidationError(format!(
                    "generation.{name} must be between 0.0 and 2.0"
                )));
            }
        }

        if g.relevance_threshold <= 0.0 {
            return Err(ConfigError::ValidationError(
                "generation.relevance_threshold must be > 0".into(),
            ));
        }

        if self.ingestion.chunk_size == 0
            || self.ingestion.chunk_overlap >= self.ingestion.chunk_size
        {
            return Err(ConfigError::ValidationError(
                "ingestion.chunk_overlap must be smaller than ingestion.chunk_size".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            request_timeout_secs: default_request_timeout_secs(),
            database_path: None,
            generation: GenerationConfig::default(),
            ingestion: IngestionConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
