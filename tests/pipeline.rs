//! End-to-end pipeline runs with stubbed collection and scoring.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use jobmon::error::{AppError, Result};
use jobmon::models::{Category, Config, Posting, SourceInfo};
use jobmon::pipeline::{Collect, RunOutcome, run_pipeline};
use jobmon::services::{CollectOutcome, EnrichmentClient, ScoringBackend, dedupe};
use jobmon::store::JobStore;

/// Collector stub returning a fixed batch, run through the real dedup.
struct StubCollector {
    postings: Vec<Posting>,
}

#[async_trait]
impl Collect for StubCollector {
    async fn collect(&self, _sources: &[SourceInfo]) -> CollectOutcome {
        let before = self.postings.len();
        let postings = dedupe(self.postings.clone());
        let duplicates = before - postings.len();
        CollectOutcome {
            postings,
            source_failures: 0,
            duplicates,
        }
    }
}

/// Scoring stub that cycles through canned responses and counts calls.
struct StubBackend {
    responses: Vec<Result<String>>,
    calls: Arc<AtomicUsize>,
}

impl StubBackend {
    fn new(responses: Vec<Result<String>>) -> Self {
        Self {
            responses,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl ScoringBackend for StubBackend {
    async fn score(&self, _prompt: &str) -> Result<String> {
        let i = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.responses[i % self.responses.len()] {
            Ok(s) => Ok(s.clone()),
            Err(_) => Err(AppError::enrichment("stub timeout")),
        }
    }
}

const VALID_VERDICT: &str = r#"{
    "categoria": "Data Science",
    "score_relevancia": 8,
    "palavras_chave": ["python"],
    "resumo": "Data work."
}"#;

fn test_config() -> Config {
    let mut config = Config::default();
    config.enrichment.call_delay_ms = 0;
    config.collector.source_delay_ms = 0;
    config
}

fn make_posting(title: &str, company: &str, source: &str) -> Posting {
    Posting {
        title: title.to_string(),
        company: company.to_string(),
        link: format!("https://example.com/{title}"),
        description: "Python and SQL.".to_string(),
        source: source.to_string(),
        collected_at: Utc::now(),
    }
}

fn store() -> JobStore {
    JobStore::open_in_memory().unwrap()
}

fn enricher_with(backend: StubBackend) -> EnrichmentClient {
    EnrichmentClient::new(test_config().enrichment, Box::new(backend))
}

#[tokio::test]
async fn empty_collection_aborts_before_enrichment_and_persistence() {
    let config = test_config();
    let collector = StubCollector { postings: vec![] };
    let backend = StubBackend::new(vec![Ok(VALID_VERDICT.to_string())]);
    let calls = Arc::clone(&backend.calls);
    let enricher = EnrichmentClient::new(config.enrichment.clone(), Box::new(backend));
    let mut store = store();

    let outcome = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();

    assert!(matches!(outcome, RunOutcome::Aborted));
    // The scoring backend was never consulted
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    // Schema exists but nothing was written
    assert_eq!(store.stats().unwrap().total, 0);
}

#[tokio::test]
async fn one_enrichment_failure_still_stores_whole_batch() {
    let config = test_config();
    let collector = StubCollector {
        postings: vec![
            make_posting("Data Engineer", "ACME", "RemoteOK"),
            make_posting("ML Engineer", "Globex", "RemoteOK"),
            make_posting("Analyst", "Initech", "WeWorkRemotely"),
        ],
    };
    // Second record times out
    let enricher = enricher_with(StubBackend::new(vec![
        Ok(VALID_VERDICT.to_string()),
        Err(AppError::enrichment("timeout")),
        Ok(VALID_VERDICT.to_string()),
    ]));
    let mut store = store();

    let outcome = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();

    let RunOutcome::Completed { summary, batch } = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(summary.collected, 3);
    assert_eq!(summary.enriched_ok, 2);
    assert_eq!(summary.degraded, 1);
    assert_eq!(summary.inserted, 3);
    assert_eq!(batch.len(), 3);

    let jobs = store.query(None, 10).unwrap();
    assert_eq!(jobs.len(), 3);
    let degraded: Vec<_> = jobs
        .iter()
        .filter(|j| j.category == Category::Other && j.score == 0.0)
        .collect();
    assert_eq!(degraded.len(), 1);
    assert_eq!(degraded[0].title, "ML Engineer");
}

#[tokio::test]
async fn rerun_with_overlapping_content_inserts_nothing() {
    let config = test_config();
    let collector = StubCollector {
        postings: vec![
            make_posting("Data Engineer", "ACME", "RemoteOK"),
            make_posting("Analyst", "Initech", "WeWorkRemotely"),
        ],
    };
    let enricher = enricher_with(StubBackend::new(vec![Ok(VALID_VERDICT.to_string())]));
    let mut store = store();

    let first = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();
    let RunOutcome::Completed { summary, .. } = first else {
        panic!("expected completed run");
    };
    assert_eq!(summary.inserted, 2);

    let second = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();
    let RunOutcome::Completed { summary, .. } = second else {
        panic!("expected completed run");
    };
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.total_stored, 2);
}

#[tokio::test]
async fn same_posting_from_two_sources_stores_once() {
    let config = test_config();
    let collector = StubCollector {
        postings: vec![
            make_posting("Data Engineer", "ACME", "RemoteOK"),
            make_posting("DATA ENGINEER", "acme", "WeWorkRemotely"),
        ],
    };
    let enricher = enricher_with(StubBackend::new(vec![Ok(VALID_VERDICT.to_string())]));
    let mut store = store();

    let outcome = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();

    let RunOutcome::Completed { summary, .. } = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(summary.collected, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.inserted, 1);

    let jobs = store.query(None, 10).unwrap();
    assert_eq!(jobs.len(), 1);
    // First-seen variant wins
    assert_eq!(jobs[0].title, "Data Engineer");
}

#[tokio::test]
async fn batch_is_capped_to_max_batch_size() {
    let mut config = test_config();
    config.enrichment.max_batch_size = 2;
    let collector = StubCollector {
        postings: (0..5)
            .map(|i| make_posting(&format!("Job {i}"), "ACME", "RemoteOK"))
            .collect(),
    };
    let enricher = enricher_with(StubBackend::new(vec![Ok(VALID_VERDICT.to_string())]));
    let mut store = store();

    let outcome = run_pipeline(&config, &collector, &enricher, &mut store)
        .await
        .unwrap();

    let RunOutcome::Completed { summary, batch } = outcome else {
        panic!("expected completed run");
    };
    assert_eq!(summary.collected, 5);
    assert_eq!(batch.len(), 2);
    assert_eq!(summary.inserted, 2);
}
