//! Diagnostic report value object and its JSON categorization artifact.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::failure::{Category, FailureRecord};
use super::run::BuildStatus;
use super::thread_dump::{DeadlockAnalysis, DeadlockCycle};

/// Run-level flakiness numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlakinessSummary {
    pub total_runs: usize,
    pub failed_runs: usize,
    /// `floor(failed_runs * 100 / total_runs)`, 0 with no runs
    pub flakiness_rate_percent: u32,
}

/// Per-run line of the report, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub id: String,
    pub build_status: BuildStatus,
    pub failure_count: usize,
}

/// What happened to a supplied thread dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThreadDumpOutcome {
    Analyzed(DeadlockAnalysis),
    Rejected { source_name: String, reason: String },
}

impl ThreadDumpOutcome {
    pub fn analysis(&self) -> Option<&DeadlockAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            Self::Rejected { .. } => None,
        }
    }
}

/// A thread dump found inside a run directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunThreadDump {
    pub run_id: String,
    pub outcome: ThreadDumpOutcome,
}

/// Everything an external renderer needs, with no I/O attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub summary: FlakinessSummary,
    pub runs: Vec<RunOutcome>,
    /// Non-empty categories only, in priority order
    pub categories: BTreeMap<Category, Vec<FailureRecord>>,
    /// Every category, zeros included
    pub category_counts: BTreeMap<Category, usize>,
    /// Advice for each non-empty category
    pub recommendations: BTreeMap<Category, Vec<String>>,
    /// The dump supplied explicitly by the caller
    pub thread_dump: Option<ThreadDumpOutcome>,
    pub run_thread_dumps: Vec<RunThreadDump>,
}

impl Report {
    /// All records, grouped by category in priority order.
    pub fn records(&self) -> impl Iterator<Item = &FailureRecord> {
        self.categories.values().flatten()
    }

    /// Number of distinct failing tests (sentinel included).
    pub fn total_tests(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Every analysed dump, explicit one first.
    pub fn analyses(&self) -> impl Iterator<Item = &DeadlockAnalysis> {
        self.thread_dump
            .iter()
            .chain(self.run_thread_dumps.iter().map(|d| &d.outcome))
            .filter_map(ThreadDumpOutcome::analysis)
    }

    /// Every deadlock cycle found across all analysed dumps.
    pub fn deadlocks(&self) -> Vec<&DeadlockCycle> {
        self.analyses().flat_map(|a| a.cycles.iter()).collect()
    }

    /// Build the JSON categorization artifact.
    pub fn categorization_artifact(&self, analysis_timestamp: DateTime<Utc>) -> CategorizationArtifact {
        let flaky_tests = self
            .records()
            .map(|record| FlakyTestEntry {
                test_name: record.test_name(),
                category: record.category.unwrap_or(Category::Unclassified),
                failure_count: record.occurrence_count,
                error_snippet: record.first_snippet().to_string(),
            })
            .collect();

        CategorizationArtifact {
            analysis_timestamp: analysis_timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            flaky_tests,
            summary: ArtifactSummary {
                total_tests: self.total_tests(),
                by_category: self.category_counts.clone(),
            },
        }
    }
}

/// `{analysis_timestamp, flaky_tests, summary}` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorizationArtifact {
    pub analysis_timestamp: String,
    pub flaky_tests: Vec<FlakyTestEntry>,
    pub summary: ArtifactSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlakyTestEntry {
    pub test_name: String,
    pub category: Category,
    pub failure_count: usize,
    pub error_snippet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactSummary {
    pub total_tests: usize,
    pub by_category: BTreeMap<Category, usize>,
}
