// src/services/collector.rs

//! Source collector service.
//!
//! Fetches configured feed sources, normalizes entries into postings,
//! and deduplicates across sources.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{Config, Posting, SourceInfo};
use crate::services::feed;
use crate::utils::{http, truncate_graphemes};

/// Summary of a collection pass.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Deduplicated postings in first-seen order
    pub postings: Vec<Posting>,
    /// Sources that failed to fetch or parse
    pub source_failures: usize,
    /// Postings dropped as duplicates
    pub duplicates: usize,
}

/// Service for collecting postings from configured feed sources.
pub struct SourceCollector {
    config: Arc<Config>,
    client: Client,
}

impl SourceCollector {
    /// Create a new collector with the given configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_client(&config.collector)?;
        Ok(Self { config, client })
    }

    /// Fetch all configured sources and return the deduplicated batch.
    ///
    /// Sources are fetched sequentially in configured order with a
    /// politeness delay between fetches. A failing source is logged and
    /// contributes zero postings; it never aborts the collection.
    pub async fn collect(&self, sources: &[SourceInfo]) -> CollectOutcome {
        let delay = Duration::from_millis(self.config.collector.source_delay_ms);
        let mut gathered = Vec::new();
        let mut outcome = CollectOutcome::default();

        for (i, source) in sources.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.fetch_source(source).await {
                Ok(postings) => {
                    log::info!("{}: {} postings", source.name, postings.len());
                    gathered.extend(postings);
                }
                Err(error) => {
                    outcome.source_failures += 1;
                    log::warn!("Failed to collect {}: {}", source.name, error);
                }
            }
        }

        let before = gathered.len();
        outcome.postings = dedupe(gathered);
        outcome.duplicates = before - outcome.postings.len();
        log::info!(
            "Collected {} unique postings ({} duplicates dropped)",
            outcome.postings.len(),
            outcome.duplicates
        );
        outcome
    }

    /// Fetch and parse a single source.
    async fn fetch_source(&self, source: &SourceInfo) -> Result<Vec<Posting>> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::fetch(&source.name, e))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&source.name, e))?;

        let items =
            feed::parse_rss(&bytes).map_err(|e| AppError::fetch(&source.name, e))?;

        let max_chars = self.config.collector.description_max_chars;
        let collected_at = Utc::now();
        let postings = items
            .into_iter()
            .map(|item| Posting {
                title: item.title,
                company: item.company,
                link: item.link,
                description: truncate_graphemes(&item.description, max_chars),
                source: source.name.clone(),
                collected_at,
            })
            .collect();
        Ok(postings)
    }
}

/// Drop postings whose normalized identity was already seen, keeping
/// the first occurrence in iteration order.
pub fn dedupe(postings: Vec<Posting>) -> Vec<Posting> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for posting in postings {
        if seen.insert(posting.dedup_key()) {
            unique.push(posting);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_posting(title: &str, company: &str, source: &str) -> Posting {
        Posting {
            title: title.to_string(),
            company: company.to_string(),
            link: format!("https://example.com/{}", title),
            description: String::new(),
            source: source.to_string(),
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn test_dedupe_keeps_first_seen_variant() {
        let postings = vec![
            make_posting("A", "X", "one"),
            make_posting("A", "x", "one"),
            make_posting("B", "Y", "one"),
        ];
        let unique = dedupe(postings);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].company, "X");
        assert_eq!(unique[1].title, "B");
    }

    #[test]
    fn test_dedupe_across_sources() {
        let postings = vec![
            make_posting("Data Engineer", "ACME", "RemoteOK"),
            make_posting("ML Engineer", "ACME", "RemoteOK"),
            make_posting("  data engineer ", "acme", "WeWorkRemotely"),
        ];
        let unique = dedupe(postings);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].source, "RemoteOK");
    }

    #[test]
    fn test_dedupe_empty() {
        assert!(dedupe(Vec::new()).is_empty());
    }

    #[tokio::test]
    async fn test_failing_sources_are_counted_not_fatal() {
        let mut config = Config::default();
        config.collector.source_delay_ms = 0;
        config.collector.timeout_secs = 1;
        let collector = SourceCollector::new(Arc::new(config)).unwrap();

        // Port 9 (discard) is not listening, and the second URL has no
        // host at all, so both fetches fail without touching the network.
        let sources = vec![
            SourceInfo {
                name: "Unreachable".to_string(),
                url: "http://127.0.0.1:9/feed.rss".to_string(),
            },
            SourceInfo {
                name: "Broken".to_string(),
                url: "not a url".to_string(),
            },
        ];

        let outcome = collector.collect(&sources).await;
        assert_eq!(outcome.source_failures, 2);
        assert!(outcome.postings.is_empty());
        assert_eq!(outcome.duplicates, 0);
    }
}
