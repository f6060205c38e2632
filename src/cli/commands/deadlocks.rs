//! Implementation of the `flaketrace deadlocks` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::display::{colorize_thread_state, section};
use crate::cli::output::{output, CommandOutput};
use crate::domain::errors::ParseWarning;
use crate::domain::models::{Config, DeadlockAnalysis};
use crate::infrastructure::artifacts::FsArtifactSource;
use crate::services::DiagnosticEngine;

#[derive(Args, Debug)]
pub struct DeadlocksArgs {
    /// Thread-dump JSON file
    pub dump: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct DeadlocksOutput {
    pub analysis: DeadlockAnalysis,
    pub warnings: Vec<ParseWarning>,
}

impl CommandOutput for DeadlocksOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![render_analysis(&self.analysis)];
        if !self.warnings.is_empty() {
            lines.push(String::new());
            lines.push(render_warnings(&self.warnings));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Human summary of one analysed dump.
pub fn render_analysis(analysis: &DeadlockAnalysis) -> String {
    let mut lines = vec![section(&format!("Thread dump {}", analysis.source_name))];
    if let Some(ts) = &analysis.timestamp {
        lines.push(format!("Captured: {ts}"));
    }

    let states: Vec<String> = analysis
        .state_counts
        .iter()
        .map(|(state, count)| format!("{} {count}", colorize_thread_state(*state)))
        .collect();
    lines.push(format!(
        "Threads: {} ({})",
        analysis.thread_count,
        if states.is_empty() {
            "none".to_string()
        } else {
            states.join(", ")
        }
    ));

    if analysis.has_deadlock() {
        lines.push(format!(
            "{} {} deadlock cycle(s):",
            console::style("!").red().bold(),
            analysis.cycles.len()
        ));
        for description in &analysis.descriptions {
            lines.push(format!("  - {description}"));
        }
    } else {
        lines.push(format!("{} No deadlock detected", console::style("\u{2713}").green()));
    }
    lines.join("\n")
}

pub fn render_warnings(warnings: &[ParseWarning]) -> String {
    let mut lines = vec![section("Warnings")];
    lines.extend(
        warnings
            .iter()
            .map(|w| format!("{} {w}", console::style("warning:").yellow())),
    );
    lines.join("\n")
}

pub fn execute(args: DeadlocksArgs, config: &Config, json_mode: bool) -> Result<()> {
    let engine = DiagnosticEngine::new(FsArtifactSource::new(), config);
    let mut warnings = Vec::new();
    let analysis = engine
        .analyze_dump_file(&args.dump, &mut warnings)
        .with_context(|| format!("Failed to analyze thread dump {}", args.dump.display()))?;

    output(&DeadlocksOutput { analysis, warnings }, json_mode);
    Ok(())
}
