//! Implementation of the `flaketrace classify` command.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::display::colorize_category;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Category, Config, ExtractedFailure, FailureRecord};
use crate::services::{FailureClassifier, RecommendationTable};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Qualified test name, e.g. com.example.FooTest.testBar
    pub test: String,

    /// Error message seen for the test (repeatable)
    #[arg(short, long = "message")]
    pub messages: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutput {
    pub test_name: String,
    pub category: Category,
    /// Keyword that decided the category
    pub keyword: Option<&'static str>,
    pub recommendations: Vec<String>,
}

impl CommandOutput for ClassifyOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "{} -> {} ({})",
            self.test_name,
            colorize_category(self.category),
            self.category.label()
        )];
        match self.keyword {
            Some(keyword) => lines.push(format!("Matched keyword: \"{keyword}\"")),
            None => lines.push("No keyword matched".to_string()),
        }
        if !self.recommendations.is_empty() {
            lines.push("Recommendations:".to_string());
            lines.extend(self.recommendations.iter().map(|r| format!("  - {r}")));
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Split `pkg.Class.method` at the last dot; a bare name is all class.
pub fn record_from_args(test: &str, messages: &[String]) -> Result<FailureRecord> {
    let test = test.trim();
    if test.is_empty() {
        bail!("Test name cannot be empty");
    }
    let (class, method) = match test.rsplit_once('.') {
        Some((class, method)) if !class.is_empty() && !method.is_empty() => (class, method),
        _ => (test, ""),
    };

    let mut snippets = messages.iter();
    let first = snippets.next().cloned().unwrap_or_default();
    let mut record = FailureRecord::first_occurrence(ExtractedFailure::new(class, method, first), "cli");
    record.error_snippets.extend(snippets.cloned());
    Ok(record)
}

pub fn classify(args: &ClassifyArgs, config: &Config) -> Result<ClassifyOutput> {
    let record = record_from_args(&args.test, &args.messages)?;
    let classification = FailureClassifier::new().classify_with_evidence(&record);
    let recommendations = RecommendationTable::with_overrides(config.recommendations.clone())
        .lookup(classification.category);

    tracing::debug!(test = %args.test, category = %classification.category, "classified");

    Ok(ClassifyOutput {
        test_name: args.test.trim().to_string(),
        category: classification.category,
        keyword: classification.keyword,
        recommendations,
    })
}

pub fn execute(args: ClassifyArgs, config: &Config, json_mode: bool) -> Result<()> {
    let result = classify(&args, config)?;
    output(&result, json_mode);
    Ok(())
}
