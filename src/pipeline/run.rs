// src/pipeline/run.rs

//! Pipeline orchestration.
//!
//! One run walks four sequential steps: INIT (schema), COLLECT,
//! ENRICH, PERSIST. An empty collection ends the run early as a
//! successful no-op; a storage failure aborts it with an error. No
//! step is retried — the next invocation starts fresh.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Config, EnrichedPosting, SourceInfo};
use crate::services::{CollectOutcome, EnrichmentClient, SourceCollector};
use crate::store::JobStore;

/// Collection seam, so runs can be driven without a network.
#[async_trait]
pub trait Collect: Send + Sync {
    async fn collect(&self, sources: &[SourceInfo]) -> CollectOutcome;
}

#[async_trait]
impl Collect for SourceCollector {
    async fn collect(&self, sources: &[SourceInfo]) -> CollectOutcome {
        SourceCollector::collect(self, sources).await
    }
}

/// Counters reported at the end of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Unique postings collected
    pub collected: usize,
    /// Sources that failed to fetch or parse
    pub source_failures: usize,
    /// Duplicate postings dropped during collection
    pub duplicates: usize,
    /// Records enriched by the service
    pub enriched_ok: usize,
    /// Records that fell back to degraded defaults
    pub degraded: usize,
    /// New rows written this run
    pub inserted: usize,
    /// Total rows in the store after the run
    pub total_stored: usize,
}

/// Terminal state of a run.
#[derive(Debug)]
pub enum RunOutcome {
    /// All four steps ran; the enriched batch is returned for export.
    Completed {
        summary: RunSummary,
        batch: Vec<EnrichedPosting>,
    },

    /// Nothing was collected; enrichment and persistence were skipped.
    Aborted,
}

/// Run the full pipeline.
pub async fn run_pipeline(
    config: &Config,
    collector: &dyn Collect,
    enricher: &EnrichmentClient,
    store: &mut JobStore,
) -> Result<RunOutcome> {
    // INIT
    log::info!("Step 1/4: Init - Ensuring database schema");
    store.ensure_schema()?;
    store.register_sources(&config.sources)?;

    // COLLECT
    log::info!("Step 2/4: Collect - Fetching {} sources", config.sources.len());
    let outcome = collector.collect(&config.sources).await;
    if outcome.postings.is_empty() {
        log::warn!("No postings collected; ending run early");
        return Ok(RunOutcome::Aborted);
    }

    // ENRICH
    let cap = config.enrichment.max_batch_size;
    let mut batch = outcome.postings;
    let collected = batch.len();
    if batch.len() > cap {
        log::info!("Capping enrichment batch to {} of {} postings", cap, batch.len());
        batch.truncate(cap);
    }
    log::info!("Step 3/4: Enrich - Scoring {} postings", batch.len());
    let enriched = enricher.enrich_batch(batch).await;
    let degraded = enriched.iter().filter(|e| e.degraded).count();

    // PERSIST
    log::info!("Step 4/4: Persist - Storing {} records", enriched.len());
    let inserted = store.upsert(&enriched)?;
    let stats = store.stats()?;

    let summary = RunSummary {
        collected,
        source_failures: outcome.source_failures,
        duplicates: outcome.duplicates,
        enriched_ok: enriched.len() - degraded,
        degraded,
        inserted,
        total_stored: stats.total as usize,
    };

    log::info!(
        "Run complete: {} collected, {} enriched, {} degraded, {} inserted, {} total stored",
        summary.collected,
        summary.enriched_ok,
        summary.degraded,
        summary.inserted,
        summary.total_stored
    );
    for (category, count) in &stats.per_category {
        log::info!("  {}: {}", category, count);
    }
    if summary.source_failures > 0 {
        log::warn!("{} source(s) failed this run", summary.source_failures);
    }

    Ok(RunOutcome::Completed {
        summary,
        batch: enriched,
    })
}
