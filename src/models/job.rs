//! Persisted job representations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Category;

/// A job row as stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoredJob {
    /// Surrogate row id
    pub id: i64,

    /// Job title
    pub title: String,

    /// Company name
    pub company: String,

    /// Full URL to the posting
    pub link: String,

    /// Truncated description
    pub description: String,

    /// Assigned category
    pub category: Category,

    /// Relevance score in [0, 10]
    pub score: f64,

    /// Extracted keywords
    pub keywords: Vec<String>,

    /// One-sentence summary
    pub summary: String,

    /// Foreign reference to the source row
    pub source_id: i64,

    /// When the posting was collected
    pub collected_at: DateTime<Utc>,
}

/// Aggregate counts over the stored jobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total rows in the jobs table
    pub total: i64,

    /// Rows per category label, ordered by label
    pub per_category: Vec<(String, i64)>,
}
