//! Operational configuration loaded from TOML.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(String),
    #[error("failed to parse config file: {0}")]
    Parse(String),
}

/// ACWR window configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AcwrConfig {
    /// Acute window in days
    pub acute_days: usize,
    /// Chronic window in days
    pub chronic_days: usize,
}

impl Default for AcwrConfig {
    fn default() -> Self {
        Self {
            acute_days: 7,
            chronic_days: 28,
        }
    }
}

/// Durable-store limits.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum serialized document size in bytes
    pub max_document_bytes: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: 1_000_000,
        }
    }
}

/// AI provider call bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Per-call deadline in seconds
    pub timeout_secs: u64,
    /// Chat retries after the first failed attempt
    pub chat_max_retries: u32,
    /// Base backoff between chat attempts in milliseconds; attempt `n`
    /// waits `base * (n + 1)`
    pub chat_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            chat_max_retries: 2,
            chat_backoff_ms: 1000,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// ACWR windows
    pub acwr: AcwrConfig,
    /// Store limits
    pub store: StoreConfig,
    /// Provider bounds
    pub provider: ProviderConfig,
    /// Locale for user-facing strings (BCP 47 language tag)
    pub locale: String,
}

impl CoreConfig {
    /// Load from a TOML file.
    pub fn load(path: &PathBuf) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let mut config: CoreConfig =
            toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?;
        if config.locale.is_empty() {
            config.locale = default_locale();
        }
        Ok(config)
    }

    /// Load from the default path, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|err| {
                tracing::warn!(%err, "falling back to default config");
                Self::with_defaults()
            }),
            _ => Self::with_defaults(),
        }
    }

    /// Defaults with the locale filled in.
    pub fn with_defaults() -> Self {
        Self {
            locale: default_locale(),
            ..Self::default()
        }
    }

    /// Default config file path for this platform.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("io", "peakform", "peakform")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn default_locale() -> String {
    "en".to_string()
}
