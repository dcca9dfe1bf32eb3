//! Posting data structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Category;
use crate::utils::normalize_identity;

/// A raw job posting collected from a feed source.
///
/// Postings are immutable once created; deduplication discards later
/// postings with the same identity instead of merging them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Posting {
    /// Job title
    pub title: String,

    /// Company name ("N/A" when the feed omits an author)
    pub company: String,

    /// Full URL to the posting
    pub link: String,

    /// Description, truncated at collection time
    pub description: String,

    /// Name of the source feed this posting came from
    pub source: String,

    /// When the posting was collected
    pub collected_at: DateTime<Utc>,
}

impl Posting {
    /// The normalized `(title, company)` identity pair.
    ///
    /// Feeds disagree on casing and whitespace for the same posting, so
    /// both halves are normalized before comparison.
    pub fn identity(&self) -> (String, String) {
        (
            normalize_identity(&self.title),
            normalize_identity(&self.company),
        )
    }

    /// Stable digest of the normalized identity, used as the dedup key
    /// in memory and as the uniqueness column in the store.
    pub fn dedup_key(&self) -> String {
        let (title, company) = self.identity();
        let mut hasher = Sha256::new();
        hasher.update(title.as_bytes());
        // Separator guards against boundary ambiguity ("ab"+"c" vs "a"+"bc")
        hasher.update([0x1f]);
        hasher.update(company.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A posting augmented with enrichment output.
///
/// Every posting that enters the enrichment step exits as exactly one
/// `EnrichedPosting`; failures degrade the enrichment fields to
/// defaults instead of dropping the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedPosting {
    /// The underlying posting
    #[serde(flatten)]
    pub posting: Posting,

    /// Assigned category (Other when enrichment failed)
    pub category: Category,

    /// Relevance score in [0, 10] (0 when enrichment failed)
    pub score: f64,

    /// Extracted keywords, possibly empty
    pub keywords: Vec<String>,

    /// One-sentence summary, possibly empty
    pub summary: String,

    /// Whether enrichment fell back to defaults
    pub degraded: bool,
}

impl EnrichedPosting {
    /// Build the degraded fallback for a posting whose enrichment failed.
    pub fn degraded(posting: Posting) -> Self {
        Self {
            posting,
            category: Category::Other,
            score: 0.0,
            keywords: Vec::new(),
            summary: String::new(),
            degraded: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_posting(title: &str, company: &str) -> Posting {
        Posting {
            title: title.to_string(),
            company: company.to_string(),
            link: "https://example.com/jobs/1".to_string(),
            description: "Python, SQL, dbt".to_string(),
            source: "RemoteOK".to_string(),
            collected_at: Utc::now(),
        }
    }

    #[test]
    fn test_identity_normalizes_case_and_whitespace() {
        let a = sample_posting("Data  Engineer", "ACME");
        let b = sample_posting(" data engineer ", "acme");
        assert_eq!(a.identity(), b.identity());
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_distinct_postings_have_distinct_keys() {
        let a = sample_posting("Data Engineer", "ACME");
        let b = sample_posting("Data Engineer", "Globex");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_dedup_key_separator_avoids_boundary_collisions() {
        let a = sample_posting("ab", "c");
        let b = sample_posting("a", "bc");
        assert_ne!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn test_degraded_defaults() {
        let enriched = EnrichedPosting::degraded(sample_posting("X", "Y"));
        assert_eq!(enriched.category, Category::Other);
        assert_eq!(enriched.score, 0.0);
        assert!(enriched.keywords.is_empty());
        assert!(enriched.summary.is_empty());
        assert!(enriched.degraded);
    }
}
