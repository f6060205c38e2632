//! Failure records and root-cause categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Class name of the placeholder record used for unparseable failed runs.
pub const SENTINEL_CLASS: &str = "UnknownTest";

/// Method name of the placeholder record used for unparseable failed runs.
pub const SENTINEL_METHOD: &str = "unknownMethod";

/// Root-cause category of a flaky failure.
///
/// Variant order is the classifier's priority order, so `Ord` and the
/// `BTreeMap` groupings built on it list categories the same way the rules
/// are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Timing,
    ResourceContention,
    EnvironmentDependency,
    ThreadSafety,
    Unclassified,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Self; 5] = [
        Self::Timing,
        Self::ResourceContention,
        Self::EnvironmentDependency,
        Self::ThreadSafety,
        Self::Unclassified,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timing => "TIMING",
            Self::ResourceContention => "RESOURCE_CONTENTION",
            Self::EnvironmentDependency => "ENVIRONMENT_DEPENDENCY",
            Self::ThreadSafety => "THREAD_SAFETY",
            Self::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Human-readable label for report headings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Timing => "Timing issues",
            Self::ResourceContention => "Resource contention",
            Self::EnvironmentDependency => "Environment dependency",
            Self::ThreadSafety => "Thread safety",
            Self::Unclassified => "Unclassified",
        }
    }

    /// Built-in remediation advice for the category.
    pub const fn default_recommendations(self) -> &'static [&'static str] {
        match self {
            Self::Timing => &[
                "Replace fixed sleeps with explicit waits on the condition under test",
                "Raise or make configurable the timeouts used by asynchronous assertions",
                "Use a controllable clock instead of wall-clock time in tests",
            ],
            Self::ResourceContention => &[
                "Give each test its own connection pool or resource instance",
                "Release connections, files and sockets in teardown even on failure",
                "Size pools and heap for the parallelism the suite runs with",
            ],
            Self::EnvironmentDependency => &[
                "Pin configuration, profiles and system properties inside the test",
                "Reset environment and global settings after each test",
                "Avoid depending on the host's locale, timezone or filesystem layout",
            ],
            Self::ThreadSafety => &[
                "Guard shared mutable state with proper synchronization or use concurrent collections",
                "Avoid static mutable fixtures shared between parallel tests",
                "Capture a thread dump on failure and check for lock-order inversions",
            ],
            Self::Unclassified => &[
                "Rerun the test in isolation with verbose logging to capture the failure cause",
                "Check test ordering dependencies by running the class in random order",
            ],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// One failure pulled out of a single run's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFailure {
    pub test_class: String,
    pub test_method: String,
    pub error_snippet: String,
}

impl ExtractedFailure {
    pub fn new(
        test_class: impl Into<String>,
        test_method: impl Into<String>,
        error_snippet: impl Into<String>,
    ) -> Self {
        Self {
            test_class: test_class.into(),
            test_method: test_method.into(),
            error_snippet: error_snippet.into(),
        }
    }

    /// Placeholder for a failed run whose cause could not be parsed.
    pub fn sentinel(error_snippet: impl Into<String>) -> Self {
        Self::new(SENTINEL_CLASS, SENTINEL_METHOD, error_snippet)
    }

    pub fn identity(&self) -> TestIdentity {
        TestIdentity::new(&self.test_class, &self.test_method)
    }
}

/// `(testClass, testMethod)` key used to merge failures across runs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TestIdentity {
    pub test_class: String,
    pub test_method: String,
}

impl TestIdentity {
    pub fn new(test_class: impl Into<String>, test_method: impl Into<String>) -> Self {
        Self {
            test_class: test_class.into(),
            test_method: test_method.into(),
        }
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.test_class, self.test_method)
    }
}

/// Aggregated failures of one test across all runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub test_class: String,
    pub test_method: String,
    /// Number of runs this test failed in (>= 1)
    pub occurrence_count: usize,
    /// One snippet per occurrence
    pub error_snippets: Vec<String>,
    /// Run each occurrence came from, parallel to `error_snippets`
    pub run_ids: Vec<String>,
    /// Set by the classifier
    pub category: Option<Category>,
}

impl FailureRecord {
    /// Start a record from its first occurrence.
    pub fn first_occurrence(failure: ExtractedFailure, run_id: impl Into<String>) -> Self {
        Self {
            test_class: failure.test_class,
            test_method: failure.test_method,
            occurrence_count: 1,
            error_snippets: vec![failure.error_snippet],
            run_ids: vec![run_id.into()],
            category: None,
        }
    }

    pub fn identity(&self) -> TestIdentity {
        TestIdentity::new(&self.test_class, &self.test_method)
    }

    /// `Class.method` display name.
    pub fn test_name(&self) -> String {
        format!("{}.{}", self.test_class, self.test_method)
    }

    pub fn is_sentinel(&self) -> bool {
        self.test_class == SENTINEL_CLASS && self.test_method == SENTINEL_METHOD
    }

    /// First recorded snippet, or an empty string.
    pub fn first_snippet(&self) -> &str {
        self.error_snippets.first().map_or("", String::as_str)
    }

    /// Text the classifier searches: class, method and every snippet.
    pub fn searchable_text(&self) -> String {
        let mut text = String::with_capacity(
            self.test_class.len()
                + self.test_method.len()
                + self.error_snippets.iter().map(String::len).sum::<usize>()
                + self.error_snippets.len()
                + 2,
        );
        text.push_str(&self.test_class);
        text.push(' ');
        text.push_str(&self.test_method);
        for snippet in &self.error_snippets {
            text.push(' ');
            text.push_str(snippet);
        }
        text
    }

    /// Share of runs this test failed in, floored to a whole percent.
    pub fn failure_rate_percent(&self, total_runs: usize) -> u32 {
        percent_floor(self.occurrence_count, total_runs)
    }
}

/// `floor(part * 100 / whole)`, or 0 when `whole` is 0.
pub fn percent_floor(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    u32::try_from(part.saturating_mul(100) / whole).unwrap_or(u32::MAX)
}
