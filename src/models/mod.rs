// src/models/mod.rs

//! Domain models for the job monitor.
//!
//! This module contains all data structures used throughout the
//! application, organized by their primary purpose.

mod category;
mod config;
mod job;
mod posting;

// Re-export all public types
pub use category::Category;
pub use config::{
    API_KEY_ENV, CollectorConfig, Config, EnrichmentConfig, SourceInfo, StoreConfig,
};
pub use job::{StoreStats, StoredJob};
pub use posting::{EnrichedPosting, Posting};
