//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Site;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and pacing behavior settings
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Search terms and sites to query
    #[serde(default)]
    pub search: SearchConfig,

    /// Job store location
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.collector.user_agent.trim().is_empty() {
            return Err(AppError::validation("collector.user_agent is empty"));
        }
        if self.collector.timeout_secs == 0 {
            return Err(AppError::validation("collector.timeout_secs must be > 0"));
        }
        if self.collector.delay_min_ms > self.collector.delay_max_ms {
            return Err(AppError::validation(
                "collector.delay_min_ms must not exceed collector.delay_max_ms",
            ));
        }
        if self.search.terms.is_empty() {
            return Err(AppError::validation("No search terms defined"));
        }
        if self.search.terms.iter().any(|t| t.trim().is_empty()) {
            return Err(AppError::validation("search.terms contains a blank term"));
        }
        if self.search.sites.is_empty() {
            return Err(AppError::validation("No sites defined"));
        }
        if self.storage.file.trim().is_empty() {
            return Err(AppError::validation("storage.file is empty"));
        }
        Ok(())
    }
}

/// HTTP client and pacing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Lower bound of the pause between search terms
    #[serde(default = "defaults::delay_min")]
    pub delay_min_ms: u64,

    /// Upper bound of the pause between search terms
    #[serde(default = "defaults::delay_max")]
    pub delay_max_ms: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            delay_min_ms: defaults::delay_min(),
            delay_max_ms: defaults::delay_max(),
        }
    }
}

/// What to search for and where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "defaults::terms")]
    pub terms: Vec<String>,

    #[serde(default = "defaults::sites")]
    pub sites: Vec<Site>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            terms: defaults::terms(),
            sites: defaults::sites(),
        }
    }
}

/// Job store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// File name of the job store, relative to the storage directory
    #[serde(default = "defaults::store_file")]
    pub file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            file: defaults::store_file(),
        }
    }
}

mod defaults {
    use crate::models::Site;

    // Collector defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobads/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn delay_min() -> u64 {
        3000
    }
    pub fn delay_max() -> u64 {
        5000
    }

    // Search defaults
    pub fn terms() -> Vec<String> {
        [
            "Analyytikko",
            "Analyst",
            "Physics",
            "Fysiikka",
            "Fyysikko",
            "Science",
            "M.Sc",
            "FM",
            "Entry",
            "First",
            "Graduate",
            "Associate",
            "Matlab",
            "Tohtorikoulutettava",
            "Doctoral",
            "Materials",
            "Materiaali",
            "Diplomi",
            "Machine learning",
            "Koneoppiminen",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
    pub fn sites() -> Vec<Site> {
        Site::ALL.to_vec()
    }

    // Storage defaults
    pub fn store_file() -> String {
        "jobads.json".into()
    }
}
