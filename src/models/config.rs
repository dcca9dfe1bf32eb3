//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable consulted when `enrichment.api_key` is unset.
pub const API_KEY_ENV: &str = "JOBMON_API_KEY";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Feed fetching behavior
    #[serde(default)]
    pub collector: CollectorConfig,

    /// Enrichment service settings
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Persistence settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Configured feed sources, fetched in listed order
    #[serde(default = "defaults::sources")]
    pub sources: Vec<SourceInfo>,
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
        if self.collector.description_max_chars == 0 {
            return Err(AppError::validation(
                "collector.description_max_chars must be > 0",
            ));
        }
        if self.enrichment.endpoint.trim().is_empty() {
            return Err(AppError::validation("enrichment.endpoint is empty"));
        }
        if self.enrichment.request_timeout_secs == 0 {
            return Err(AppError::validation(
                "enrichment.request_timeout_secs must be > 0",
            ));
        }
        if self.enrichment.max_batch_size == 0 {
            return Err(AppError::validation(
                "enrichment.max_batch_size must be > 0",
            ));
        }
        if self.sources.is_empty() {
            return Err(AppError::validation("No sources defined"));
        }
        for source in &self.sources {
            if source.name.trim().is_empty() {
                return Err(AppError::validation("Source with empty name"));
            }
            url::Url::parse(&source.url)
                .map_err(|e| AppError::validation(format!("Source {}: {}", source.name, e)))?;
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collector: CollectorConfig::default(),
            enrichment: EnrichmentConfig::default(),
            store: StoreConfig::default(),
            sources: defaults::sources(),
        }
    }
}

/// Feed fetching behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Politeness delay between successive source fetches, milliseconds
    #[serde(default = "defaults::source_delay")]
    pub source_delay_ms: u64,

    /// Description length cap, in grapheme clusters
    #[serde(default = "defaults::description_max_chars")]
    pub description_max_chars: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            source_delay_ms: defaults::source_delay(),
            description_max_chars: defaults::description_max_chars(),
        }
    }
}

/// Enrichment service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Chat-completions endpoint URL
    #[serde(default = "defaults::endpoint")]
    pub endpoint: String,

    /// Bearer token; falls back to the `JOBMON_API_KEY` environment
    /// variable when unset
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier sent with each request
    #[serde(default = "defaults::model")]
    pub model: String,

    /// Per-request timeout in seconds
    #[serde(default = "defaults::request_timeout")]
    pub request_timeout_secs: u64,

    /// Minimum delay between consecutive service calls, milliseconds
    #[serde(default = "defaults::call_delay")]
    pub call_delay_ms: u64,

    /// Maximum records enriched per run (bounds external-service cost)
    #[serde(default = "defaults::max_batch_size")]
    pub max_batch_size: usize,

    /// Sampling temperature
    #[serde(default = "defaults::temperature")]
    pub temperature: f32,

    /// Response token cap
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,

    /// Description prefix length sent in the prompt, grapheme clusters
    #[serde(default = "defaults::prompt_max_chars")]
    pub prompt_max_chars: usize,
}

impl EnrichmentConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            endpoint: defaults::endpoint(),
            api_key: None,
            model: defaults::model(),
            request_timeout_secs: defaults::request_timeout(),
            call_delay_ms: defaults::call_delay(),
            max_batch_size: defaults::max_batch_size(),
            temperature: defaults::temperature(),
            max_tokens: defaults::max_tokens(),
            prompt_max_chars: defaults::prompt_max_chars(),
        }
    }
}

/// Persistence and export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file location
    #[serde(default = "defaults::db_path")]
    pub db_path: String,

    /// Directory for CSV exports
    #[serde(default = "defaults::export_dir")]
    pub export_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::db_path(),
            export_dir: defaults::export_dir(),
        }
    }
}

/// A configured feed source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Source display name (unique in the store)
    pub name: String,

    /// Feed endpoint URL
    pub url: String,
}

mod defaults {
    use super::SourceInfo;

    // Collector defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; jobmon/0.1)".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn source_delay() -> u64 {
        1000
    }
    pub fn description_max_chars() -> usize {
        300
    }

    // Enrichment defaults
    pub fn endpoint() -> String {
        "https://api.groq.com/openai/v1/chat/completions".into()
    }
    pub fn model() -> String {
        "llama-3.1-8b-instant".into()
    }
    pub fn request_timeout() -> u64 {
        20
    }
    pub fn call_delay() -> u64 {
        3000
    }
    pub fn max_batch_size() -> usize {
        20
    }
    pub fn temperature() -> f32 {
        0.2
    }
    pub fn max_tokens() -> u32 {
        256
    }
    pub fn prompt_max_chars() -> usize {
        400
    }

    // Store defaults
    pub fn db_path() -> String {
        "data/jobs.db".into()
    }
    pub fn export_dir() -> String {
        "outputs".into()
    }

    // Source defaults
    pub fn sources() -> Vec<SourceInfo> {
        vec![
            SourceInfo {
                name: "RemoteOK".to_string(),
                url: "https://remoteok.com/remote-jobs.rss".to_string(),
            },
            SourceInfo {
                name: "WeWorkRemotely".to_string(),
                url: "https://weworkremotely.com/categories/remote-data-science-jobs.rss"
                    .to_string(),
            },
        ]
    }
}
