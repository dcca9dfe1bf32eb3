// src/pipeline/mod.rs

//! Pipeline entry points.
//!
//! - `run_pipeline`: Collect → Enrich → Persist with a run summary
//! - `export`: CSV dump of the processed batch

pub mod export;
pub mod run;

pub use export::write_csv;
pub use run::{Collect, RunOutcome, RunSummary, run_pipeline};
