//! Implementation of the `flaketrace analyze` command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;
use serde::Serialize;

use super::deadlocks::{render_analysis, render_warnings};
use crate::cli::display::{
    colorize_category, colorize_rate, colorize_status, list_table, render_list, section,
};
use crate::cli::output::{output, truncate, CommandOutput};
use crate::domain::errors::ParseWarning;
use crate::domain::models::{Config, Report, ThreadDumpOutcome};
use crate::infrastructure::artifacts::FsArtifactSource;
use crate::services::{Diagnosis, DiagnosticEngine};

/// File written to `--output-dir` with the categorisation artifact
pub const CATEGORIES_FILE: &str = "flaky-test-categories.json";
/// File written to `--output-dir` with the full report and warnings
pub const DIAGNOSIS_FILE: &str = "diagnosis.json";

const SNIPPET_COLUMN_WIDTH: usize = 60;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Directory holding run*/ subdirectories or flat log files
    pub dir: PathBuf,

    /// Thread-dump JSON to check for deadlocks
    #[arg(short, long)]
    pub thread_dump: Option<PathBuf>,

    /// Write the JSON artifacts into this directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub report: Report,
    pub warnings: Vec<ParseWarning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub written: Vec<PathBuf>,
}

impl CommandOutput for AnalyzeOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let mut blocks = vec![render_summary(report), render_runs(report)];

        if report.categories.is_empty() {
            blocks.push(format!("{}\nNo failing tests.", section("Flaky Tests")));
        } else {
            blocks.push(render_categories(report));
            blocks.push(render_recommendations(report));
        }

        for outcome in report
            .thread_dump
            .iter()
            .chain(report.run_thread_dumps.iter().map(|d| &d.outcome))
        {
            blocks.push(match outcome {
                ThreadDumpOutcome::Analyzed(analysis) => render_analysis(analysis),
                ThreadDumpOutcome::Rejected {
                    source_name,
                    reason,
                } => format!(
                    "{}\nRejected: {reason}",
                    section(&format!("Thread dump {source_name}"))
                ),
            });
        }

        if !self.warnings.is_empty() {
            blocks.push(render_warnings(&self.warnings));
        }

        for path in &self.written {
            blocks.push(format!("Wrote {}", path.display()));
        }

        blocks.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn render_summary(report: &Report) -> String {
    let summary = &report.summary;
    format!(
        "{}\nTotal runs: {}\nFailed runs: {}\nFlakiness rate: {}",
        section("Flakiness Summary"),
        summary.total_runs,
        summary.failed_runs,
        colorize_rate(summary.flakiness_rate_percent)
    )
}

fn render_runs(report: &Report) -> String {
    let mut table = list_table(&["run", "status", "failures"]);
    for run in &report.runs {
        table.add_row(vec![
            run.id.clone(),
            colorize_status(run.build_status).to_string(),
            run.failure_count.to_string(),
        ]);
    }
    render_list("run", &table, report.runs.len())
}

fn render_categories(report: &Report) -> String {
    let total_runs = report.summary.total_runs;
    let mut blocks = vec![section("Flaky Tests")];
    for (category, records) in &report.categories {
        let mut table = list_table(&["test", "failures", "rate", "first error"]);
        for record in records {
            let name = if record.is_sentinel() {
                format!("{} (unparsed)", record.test_name())
            } else {
                record.test_name()
            };
            table.add_row(vec![
                name,
                record.occurrence_count.to_string(),
                format!("{}%", record.failure_rate_percent(total_runs)),
                truncate(record.first_snippet(), SNIPPET_COLUMN_WIDTH),
            ]);
        }
        blocks.push(format!(
            "{} ({})\n{}",
            colorize_category(*category),
            category.label(),
            render_list("test", &table, records.len())
        ));
    }
    blocks.join("\n\n")
}

fn render_recommendations(report: &Report) -> String {
    let mut lines = vec![section("Recommendations")];
    for (category, advice) in &report.recommendations {
        lines.push(format!("{}:", colorize_category(*category)));
        lines.extend(advice.iter().map(|line| format!("  - {line}")));
    }
    lines.join("\n")
}

/// Write the categorisation artifact and the full diagnosis as JSON.
pub fn write_artifacts(diagnosis: &Diagnosis, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let artifact = diagnosis.report.categorization_artifact(Utc::now());
    let categories_path = dir.join(CATEGORIES_FILE);
    fs::write(
        &categories_path,
        serde_json::to_string_pretty(&artifact).context("Failed to serialize categories")?,
    )
    .with_context(|| format!("Failed to write {}", categories_path.display()))?;

    let diagnosis_path = dir.join(DIAGNOSIS_FILE);
    fs::write(
        &diagnosis_path,
        serde_json::to_string_pretty(diagnosis).context("Failed to serialize diagnosis")?,
    )
    .with_context(|| format!("Failed to write {}", diagnosis_path.display()))?;

    tracing::info!(dir = %dir.display(), "wrote report artifacts");
    Ok(vec![categories_path, diagnosis_path])
}

pub fn execute(args: AnalyzeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let engine = DiagnosticEngine::new(FsArtifactSource::new(), config);
    let diagnosis = engine
        .diagnose(&args.dir, args.thread_dump.as_deref())
        .with_context(|| format!("Failed to analyze {}", args.dir.display()))?;

    let written = match &args.output_dir {
        Some(dir) => write_artifacts(&diagnosis, dir)?,
        None => Vec::new(),
    };

    let Diagnosis { report, warnings } = diagnosis;
    output(
        &AnalyzeOutput {
            report,
            warnings,
            written,
        },
        json_mode,
    );
    Ok(())
}
