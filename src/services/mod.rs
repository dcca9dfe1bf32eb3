// src/services/mod.rs

//! Services for collecting and enriching postings.

pub mod collector;
pub mod enrichment;
pub mod feed;

pub use collector::{CollectOutcome, SourceCollector, dedupe};
pub use enrichment::{EnrichmentClient, HttpScoringBackend, ScoringBackend};
pub use feed::{RawItem, parse_rss};
