//! jobmon CLI
//!
//! Local execution entry point for the job posting pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use jobmon::{
    config,
    error::Result,
    pipeline::{self, RunOutcome},
    services::{EnrichmentClient, SourceCollector},
    store::JobStore,
};

/// jobmon - Job Posting Monitor
#[derive(Parser, Debug)]
#[command(
    name = "jobmon",
    version,
    about = "Collects, categorizes, and stores job postings from public feeds"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: collect, enrich, persist
    Run {
        /// Skip the CSV export after a completed run
        #[arg(long)]
        skip_export: bool,
    },

    /// Query stored jobs
    Query {
        /// Exact category label to filter by
        #[arg(long)]
        category: Option<String>,

        /// Maximum rows to return
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },

    /// Show store statistics
    Stats,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run { skip_export } => {
            let config = Arc::new(config::load_config(&cli.config));
            config.validate()?;

            let collector = SourceCollector::new(Arc::clone(&config))?;
            let enricher = EnrichmentClient::from_config(config.enrichment.clone())?;
            let mut store = JobStore::open(&config.store.db_path)?;

            match pipeline::run_pipeline(&config, &collector, &enricher, &mut store).await? {
                RunOutcome::Completed { summary, batch } => {
                    if !skip_export {
                        pipeline::write_csv(&config.store.export_dir, &batch)?;
                    }
                    log::info!(
                        "Done: {} new of {} collected ({} degraded)",
                        summary.inserted,
                        summary.collected,
                        summary.degraded
                    );
                }
                RunOutcome::Aborted => {
                    log::warn!("Nothing collected. Check your connection and sources.");
                }
            }
        }

        Command::Query { category, limit } => {
            let config = config::load_config(&cli.config);
            let store = JobStore::open(&config.store.db_path)?;
            store.ensure_schema()?;

            let jobs = store.query(category.as_deref(), limit)?;
            for job in &jobs {
                println!(
                    "[{:>4.1}] {:<22} {} @ {} ({})",
                    job.score,
                    job.category.as_str(),
                    job.title,
                    job.company,
                    job.collected_at.format("%Y-%m-%d")
                );
            }
            println!("{} row(s)", jobs.len());
        }

        Command::Stats => {
            let config = config::load_config(&cli.config);
            let store = JobStore::open(&config.store.db_path)?;
            store.ensure_schema()?;

            let stats = store.stats()?;
            println!("Total jobs: {}", stats.total);
            for (category, count) in &stats.per_category {
                println!("  {:<22} {}", category, count);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            let config = config::load_validated(&cli.config)?;
            log::info!("✓ Config OK ({} sources)", config.sources.len());
        }
    }

    Ok(())
}
