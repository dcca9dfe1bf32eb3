// src/error.rs

//! Unified error handling for the job monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for job monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Feed XML parsing failed
    #[error("Feed parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Database operation failed. Fatal for the run: a swallowed write
    /// failure would make the at-most-once guarantee unobservable.
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Fetching a single feed source failed
    // Named `source_name` because thiserror reserves `source` for the
    // error cause chain.
    #[error("Fetch error for {source_name}: {message}")]
    Fetch {
        source_name: String,
        message: String,
    },

    /// The enrichment backend failed or returned unusable content
    #[error("Enrichment error: {0}")]
    Enrichment(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a fetch error tagged with the source name.
    pub fn fetch(source_name: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            source_name: source_name.into(),
            message: message.to_string(),
        }
    }

    /// Create an enrichment error.
    pub fn enrichment(message: impl fmt::Display) -> Self {
        Self::Enrichment(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_names_the_source() {
        let error = AppError::fetch("RemoteOK", "connection refused");
        assert_eq!(
            error.to_string(),
            "Fetch error for RemoteOK: connection refused"
        );
    }

    #[test]
    fn test_fetch_error_has_no_cause_chain() {
        use std::error::Error;
        let error = AppError::fetch("RemoteOK", "connection refused");
        assert!(error.source().is_none());
    }
}
