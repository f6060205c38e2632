//! Keyword-driven root-cause classification of failure records.
//!
//! The classifier lowercases a record's class, method and snippets and checks
//! four keyword sets in fixed priority order; the first set with a substring
//! hit decides the category. Records nothing matches are `UNCLASSIFIED`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::models::{Category, FailureRecord};

/// One priority step of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: Category,
    pub keywords: &'static [&'static str],
}

/// Classification rules in priority order.
pub const KEYWORD_RULES: [KeywordRule; 4] = [
    KeywordRule {
        category: Category::Timing,
        keywords: &[
            "timeout",
            "timing",
            "wait",
            "sleep",
            "delay",
            "async",
            "interrupted",
        ],
    },
    KeywordRule {
        category: Category::ResourceContention,
        keywords: &["connection", "resource", "pool", "capacity", "memory"],
    },
    KeywordRule {
        category: Category::EnvironmentDependency,
        keywords: &[
            "config",
            "environment",
            "profile",
            "mode",
            "setting",
            "property",
        ],
    },
    KeywordRule {
        category: Category::ThreadSafety,
        keywords: &[
            "concurrent",
            "thread",
            "synchronize",
            "lock",
            "atomic",
            "race",
            "concurrentmodification",
        ],
    },
];

/// Category plus the keyword that selected it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// `None` for `UNCLASSIFIED`
    pub keyword: Option<&'static str>,
}

/// Stateless classifier over [`KEYWORD_RULES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailureClassifier;

impl FailureClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Category of a record. Total and deterministic.
    pub fn classify(&self, record: &FailureRecord) -> Category {
        self.classify_with_evidence(record).category
    }

    pub fn classify_with_evidence(&self, record: &FailureRecord) -> Classification {
        self.classify_text(&record.searchable_text())
    }

    /// Classify free text, e.g. a test name plus a message from the CLI.
    pub fn classify_text(&self, text: &str) -> Classification {
        let haystack = text.to_lowercase();
        KEYWORD_RULES
            .iter()
            .find_map(|rule| {
                rule.keywords
                    .iter()
                    .find(|k| haystack.contains(*k))
                    .map(|k| Classification {
                        category: rule.category,
                        keyword: Some(*k),
                    })
            })
            .unwrap_or(Classification {
                category: Category::Unclassified,
                keyword: None,
            })
    }

    /// Assign a category to every record.
    pub fn classify_all(&self, records: Vec<FailureRecord>) -> Vec<FailureRecord> {
        records
            .into_iter()
            .map(|mut record| {
                let classification = self.classify_with_evidence(&record);
                tracing::debug!(
                    test = %record.test_name(),
                    category = %classification.category,
                    keyword = classification.keyword.unwrap_or("-"),
                    "classified failure"
                );
                record.category = Some(classification.category);
                record
            })
            .collect()
    }
}

/// Remediation advice per category.
///
/// Built-in advice comes from [`Category::default_recommendations`];
/// configured overrides replace it wholesale for their category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationTable {
    overrides: BTreeMap<Category, Vec<String>>,
}

impl RecommendationTable {
    pub fn with_overrides(overrides: BTreeMap<Category, Vec<String>>) -> Self {
        Self { overrides }
    }

    pub fn lookup(&self, category: Category) -> Vec<String> {
        self.overrides.get(&category).cloned().unwrap_or_else(|| {
            category
                .default_recommendations()
                .iter()
                .map(|s| (*s).to_string())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ExtractedFailure;

    fn record(class: &str, method: &str, snippet: &str) -> FailureRecord {
        FailureRecord::first_occurrence(ExtractedFailure::new(class, method, snippet), "run1")
    }

    #[test]
    fn timing_keywords() {
        let classifier = FailureClassifier::new();
        let r = record("com.example.FooTest", "testBar", "java.util.concurrent.TimeoutException");
        // Both TIMING ("timeout") and THREAD_SAFETY ("concurrent") match; priority decides
        assert_eq!(classifier.classify(&r), Category::Timing);
    }

    #[test]
    fn resource_keywords() {
        let classifier = FailureClassifier::new();
        let r = record("DbTest", "testQuery", "Connection refused");
        let c = classifier.classify_with_evidence(&r);
        assert_eq!(c.category, Category::ResourceContention);
        assert_eq!(c.keyword, Some("connection"));
    }

    #[test]
    fn environment_keywords() {
        let classifier = FailureClassifier::new();
        let r = record("AppTest", "testStartup", "missing system Property app.home");
        assert_eq!(classifier.classify(&r), Category::EnvironmentDependency);
    }

    #[test]
    fn thread_safety_keywords() {
        let classifier = FailureClassifier::new();
        let r = record("CacheTest", "testPut", "ConcurrentModificationException");
        assert_eq!(classifier.classify(&r), Category::ThreadSafety);
    }

    #[test]
    fn name_alone_can_classify() {
        let classifier = FailureClassifier::new();
        let r = record("com.example.AsyncClientTest", "testSend", "expected 1 but was 2");
        assert_eq!(classifier.classify(&r), Category::Timing);
    }

    #[test]
    fn unclassified_fallback() {
        let classifier = FailureClassifier::new();
        let r = record("MathTest", "testAdd", "expected:<4> but was:<5>");
        let c = classifier.classify_with_evidence(&r);
        assert_eq!(c.category, Category::Unclassified);
        assert_eq!(c.keyword, None);
    }

    #[test]
    fn sentinel_is_unclassified() {
        let classifier = FailureClassifier::new();
        let r = FailureRecord::first_occurrence(
            ExtractedFailure::sentinel(crate::services::failure_extractor::SENTINEL_SNIPPET),
            "run1",
        );
        assert_eq!(classifier.classify(&r), Category::Unclassified);
    }

    #[test]
    fn classify_all_sets_category() {
        let classifier = FailureClassifier::new();
        let records = classifier.classify_all(vec![
            record("A", "t", "timeout"),
            record("B", "u", "plain"),
        ]);
        assert_eq!(records[0].category, Some(Category::Timing));
        assert_eq!(records[1].category, Some(Category::Unclassified));
    }

    #[test]
    fn recommendation_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(Category::Timing, vec!["Use Awaitility".to_string()]);
        let table = RecommendationTable::with_overrides(overrides);

        assert_eq!(table.lookup(Category::Timing), vec!["Use Awaitility"]);
        assert_eq!(
            table.lookup(Category::ThreadSafety).len(),
            Category::ThreadSafety.default_recommendations().len()
        );
    }
}
