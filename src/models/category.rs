//! Closed category vocabulary for enriched postings.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Job posting category.
///
/// The vocabulary is closed: the enrichment service must choose one of
/// these labels, and anything else is coerced to [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DataScience,
    DataEngineering,
    MachineLearning,
    Analytics,
    Backend,
    Other,
}

impl Category {
    /// All categories, in the order presented to the enrichment service.
    pub const ALL: [Category; 6] = [
        Category::DataScience,
        Category::DataEngineering,
        Category::MachineLearning,
        Category::Analytics,
        Category::Backend,
        Category::Other,
    ];

    /// Display label, also the persisted form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::DataScience => "Data Science",
            Category::DataEngineering => "Data Engineering",
            Category::MachineLearning => "Machine Learning / AI",
            Category::Analytics => "Analytics / BI",
            Category::Backend => "Backend / Automation",
            Category::Other => "Other",
        }
    }

    /// Parse a label returned by the enrichment service.
    ///
    /// Unknown labels coerce to `Other` rather than failing: the service
    /// occasionally invents categories, and a bad label must never drop
    /// a record.
    pub fn parse(label: &str) -> Category {
        let label = label.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(Category::Other)
    }

    /// The vocabulary as a display list for prompt construction.
    pub fn vocabulary() -> String {
        let labels: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        labels.join(", ")
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Category::parse(&label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(Category::parse("Data Science"), Category::DataScience);
        assert_eq!(Category::parse("Analytics / BI"), Category::Analytics);
        assert_eq!(Category::parse("other"), Category::Other);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Category::parse("data science"), Category::DataScience);
        assert_eq!(Category::parse("DATA ENGINEERING"), Category::DataEngineering);
    }

    #[test]
    fn test_parse_coerces_unknown_to_other() {
        assert_eq!(Category::parse("Quantum Basket Weaving"), Category::Other);
        assert_eq!(Category::parse(""), Category::Other);
    }

    #[test]
    fn test_vocabulary_contains_all_labels() {
        let vocab = Category::vocabulary();
        for category in Category::ALL {
            assert!(vocab.contains(category.as_str()));
        }
    }
}
