//! Pure assembly of the diagnostic [`Report`].

use std::collections::BTreeMap;

use crate::domain::models::{
    percent_floor, BuildStatus, Category, FailureRecord, FlakinessSummary, Report, RunOutcome,
    RunThreadDump, ThreadDumpOutcome,
};
use crate::services::failure_classifier::RecommendationTable;

/// Everything the assembler folds into a report.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    /// Per-run outcomes in discovery order
    pub runs: Vec<RunOutcome>,
    /// Classified records; a record without a category lands in `UNCLASSIFIED`
    pub records: Vec<FailureRecord>,
    pub thread_dump: Option<ThreadDumpOutcome>,
    pub run_thread_dumps: Vec<RunThreadDump>,
}

/// Run-level summary with the floor percentage.
pub fn flakiness_summary(runs: &[RunOutcome]) -> FlakinessSummary {
    let total_runs = runs.len();
    let failed_runs = runs
        .iter()
        .filter(|r| r.build_status == BuildStatus::Failure)
        .count();
    FlakinessSummary {
        total_runs,
        failed_runs,
        flakiness_rate_percent: percent_floor(failed_runs, total_runs),
    }
}

/// Builds reports; holds only the recommendation lookup.
#[derive(Debug, Clone, Default)]
pub struct ReportAssembler {
    recommendations: RecommendationTable,
}

impl ReportAssembler {
    pub fn new(recommendations: RecommendationTable) -> Self {
        Self { recommendations }
    }

    /// Combine run outcomes, classified records and dump analyses.
    ///
    /// Records are grouped by category in priority order; within a category
    /// the most frequent failures come first, ties broken by test name.
    pub fn assemble(&self, inputs: ReportInputs) -> Report {
        let ReportInputs {
            runs,
            records,
            thread_dump,
            run_thread_dumps,
        } = inputs;

        let summary = flakiness_summary(&runs);

        let mut category_counts: BTreeMap<Category, usize> =
            Category::ALL.into_iter().map(|c| (c, 0)).collect();
        let mut categories: BTreeMap<Category, Vec<FailureRecord>> = BTreeMap::new();
        for mut record in records {
            let category = *record.category.get_or_insert(Category::Unclassified);
            *category_counts.entry(category).or_insert(0) += 1;
            categories.entry(category).or_default().push(record);
        }
        for group in categories.values_mut() {
            group.sort_by(|a, b| {
                b.occurrence_count
                    .cmp(&a.occurrence_count)
                    .then_with(|| a.identity().cmp(&b.identity()))
            });
        }

        let recommendations = categories
            .keys()
            .map(|&category| (category, self.recommendations.lookup(category)))
            .collect();

        tracing::debug!(
            total_runs = summary.total_runs,
            failed_runs = summary.failed_runs,
            rate = summary.flakiness_rate_percent,
            categories = categories.len(),
            "assembled report"
        );

        Report {
            summary,
            runs,
            categories,
            category_counts,
            recommendations,
            thread_dump,
            run_thread_dumps,
        }
    }
}
