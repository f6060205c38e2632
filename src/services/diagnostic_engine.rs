//! Batch entry point: runs -> failures -> categories -> report.

use std::path::Path;

use serde::Serialize;

use crate::domain::errors::{raise, DiagnosticError, DiagnosticResult, ParseWarning};
use crate::domain::models::{
    AnalysisConfig, Config, DeadlockAnalysis, Report, Run, RunOutcome, RunThreadDump,
    ThreadDumpOutcome,
};
use crate::domain::ports::ArtifactSource;
use crate::services::deadlock_detector::analyze_dump;
use crate::services::failure_classifier::{FailureClassifier, RecommendationTable};
use crate::services::failure_extractor::{FailureAggregate, FailureExtractor};
use crate::services::report_assembler::{ReportAssembler, ReportInputs};
use crate::services::run_store::RunStore;
use crate::services::thread_dump_parser::parse_dump;

/// A finished batch: the report plus every warning raised on the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub report: Report,
    pub warnings: Vec<ParseWarning>,
}

/// Wires the run store, extractor, classifier, deadlock detector and
/// assembler over one [`ArtifactSource`].
pub struct DiagnosticEngine<S: ArtifactSource> {
    source: S,
    analysis: AnalysisConfig,
    extractor: FailureExtractor,
    classifier: FailureClassifier,
    assembler: ReportAssembler,
}

impl<S: ArtifactSource> DiagnosticEngine<S> {
    pub fn new(source: S, config: &Config) -> Self {
        Self {
            source,
            analysis: config.analysis.clone(),
            extractor: FailureExtractor::new(&config.analysis),
            classifier: FailureClassifier::new(),
            assembler: ReportAssembler::new(RecommendationTable::with_overrides(
                config.recommendations.clone(),
            )),
        }
    }

    /// Diagnose every run under `root`, optionally with an explicit dump.
    ///
    /// Input errors (missing root, no logs, unreadable explicit dump) abort
    /// before any classification. A dump that fails to parse is recorded as
    /// rejected and raises a warning; the rest of the batch still completes.
    pub fn diagnose(&self, root: &Path, thread_dump: Option<&Path>) -> DiagnosticResult<Diagnosis> {
        let mut warnings = Vec::new();

        let runs = RunStore::new(&self.source, &self.analysis).discover_runs(root, &mut warnings)?;

        let explicit_dump = match thread_dump {
            Some(path) => {
                let text = self.read_dump(path)?;
                Some(self.dump_outcome(&text, &display_name(path), &mut warnings))
            }
            None => None,
        };

        let mut aggregate = FailureAggregate::new();
        let mut outcomes = Vec::with_capacity(runs.len());
        for run in &runs {
            let failures = self.extractor.extract_failures(run, &mut warnings);
            outcomes.push(RunOutcome {
                id: run.id.clone(),
                build_status: run.build_status,
                failure_count: failures.len(),
            });
            aggregate = aggregate.absorb(&run.id, failures);
        }

        let records = self.classifier.classify_all(aggregate.into_records());
        let run_thread_dumps = self.run_thread_dumps(&runs, &mut warnings);

        let report = self.assembler.assemble(ReportInputs {
            runs: outcomes,
            records,
            thread_dump: explicit_dump,
            run_thread_dumps,
        });

        tracing::info!(
            root = %root.display(),
            runs = report.summary.total_runs,
            failed = report.summary.failed_runs,
            tests = report.total_tests(),
            warnings = warnings.len(),
            "diagnosis complete"
        );

        Ok(Diagnosis { report, warnings })
    }

    /// Parse and analyse a single dump file.
    ///
    /// Unlike [`diagnose`](Self::diagnose), a malformed dump is returned as
    /// [`DiagnosticError::Format`].
    pub fn analyze_dump_file(
        &self,
        path: &Path,
        warnings: &mut Vec<ParseWarning>,
    ) -> DiagnosticResult<DeadlockAnalysis> {
        let text = self.read_dump(path)?;
        let name = display_name(path);
        let dump = parse_dump(&text, &name)?;
        Ok(analyze_dump(&dump, &name, warnings))
    }

    fn read_dump(&self, path: &Path) -> DiagnosticResult<String> {
        if !self.source.exists(path) {
            return Err(DiagnosticError::input(path, "thread dump does not exist"));
        }
        self.source
            .read_to_string(path)
            .map_err(|e| DiagnosticError::input(path, format!("cannot read thread dump: {e}")))
    }

    fn dump_outcome(
        &self,
        text: &str,
        source_name: &str,
        warnings: &mut Vec<ParseWarning>,
    ) -> ThreadDumpOutcome {
        match parse_dump(text, source_name) {
            Ok(dump) => ThreadDumpOutcome::Analyzed(analyze_dump(&dump, source_name, warnings)),
            Err(e) => self.reject(source_name, e.to_string(), warnings),
        }
    }

    fn reject(
        &self,
        source_name: &str,
        reason: String,
        warnings: &mut Vec<ParseWarning>,
    ) -> ThreadDumpOutcome {
        raise(
            warnings,
            ParseWarning::ThreadDumpRejected {
                source_name: source_name.to_string(),
                reason: reason.clone(),
            },
        );
        ThreadDumpOutcome::Rejected {
            source_name: source_name.to_string(),
            reason,
        }
    }

    fn run_thread_dumps(&self, runs: &[Run], warnings: &mut Vec<ParseWarning>) -> Vec<RunThreadDump> {
        runs.iter()
            .filter_map(|run| {
                let path = run.thread_dump_path.as_deref()?;
                let name = display_name(path);
                let outcome = match self.source.read_to_string(path) {
                    Ok(text) => self.dump_outcome(&text, &name, warnings),
                    Err(e) => self.reject(&name, format!("cannot read thread dump: {e}"), warnings),
                };
                Some(RunThreadDump {
                    run_id: run.id.clone(),
                    outcome,
                })
            })
            .collect()
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{BuildStatus, Category};
    use crate::infrastructure::artifacts::InMemoryArtifactSource;

    const FAILED_LOG: &str = "\
[ERROR] testBar(com.example.FooTest)  Time elapsed: 5.0 s  <<< FAILURE!
java.util.concurrent.TimeoutException: Timeout after 5s
[INFO] BUILD FAILURE
";

    const DEADLOCK: &str = r#"{"threads": [
        {"id": 1, "name": "A", "state": "BLOCKED", "locks_held": ["Y"], "locks_waiting": ["X"]},
        {"id": 2, "name": "B", "state": "BLOCKED", "locks_held": ["X"], "locks_waiting": ["Y"]}
    ]}"#;

    fn engine(source: InMemoryArtifactSource) -> DiagnosticEngine<InMemoryArtifactSource> {
        DiagnosticEngine::new(source, &Config::default())
    }

    #[test]
    fn run_outcomes_carry_failure_counts() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", FAILED_LOG)
            .with_file("/r/run2/build.log", "BUILD SUCCESS");

        let diagnosis = engine(source).diagnose(Path::new("/r"), None).unwrap();
        let runs = &diagnosis.report.runs;
        assert_eq!(runs[0].failure_count, 1);
        assert_eq!(runs[0].build_status, BuildStatus::Failure);
        assert_eq!(runs[1].failure_count, 0);
        assert_eq!(diagnosis.report.summary.flakiness_rate_percent, 50);
        assert_eq!(diagnosis.report.category_counts[&Category::Timing], 1);
    }

    #[test]
    fn run_thread_dump_analysed() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", FAILED_LOG)
            .with_file("/r/run1/thread-dump.json", DEADLOCK);

        let diagnosis = engine(source).diagnose(Path::new("/r"), None).unwrap();
        let dumps = &diagnosis.report.run_thread_dumps;
        assert_eq!(dumps.len(), 1);
        assert_eq!(dumps[0].run_id, "run1");
        assert_eq!(diagnosis.report.deadlocks().len(), 1);
    }

    #[test]
    fn malformed_dump_does_not_abort_batch() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", FAILED_LOG)
            .with_file("/dumps/bad.json", "{\"locks\": []}");

        let diagnosis = engine(source)
            .diagnose(Path::new("/r"), Some(Path::new("/dumps/bad.json")))
            .unwrap();

        assert!(matches!(
            diagnosis.report.thread_dump,
            Some(ThreadDumpOutcome::Rejected { .. })
        ));
        assert!(diagnosis
            .warnings
            .iter()
            .any(|w| matches!(w, ParseWarning::ThreadDumpRejected { .. })));
        assert_eq!(diagnosis.report.total_tests(), 1);
    }

    #[test]
    fn missing_explicit_dump_is_input_error() {
        let source = InMemoryArtifactSource::new().with_file("/r/run1/build.log", FAILED_LOG);
        let result = engine(source).diagnose(Path::new("/r"), Some(Path::new("/nope.json")));
        assert!(matches!(result, Err(DiagnosticError::Input { .. })));
    }

    #[test]
    fn analyze_dump_file_surfaces_format_error() {
        let source = InMemoryArtifactSource::new().with_file("/d/dump.json", "[]");
        let mut warnings = Vec::new();
        let result = engine(source).analyze_dump_file(Path::new("/d/dump.json"), &mut warnings);
        match result {
            Err(DiagnosticError::Format { source_name, .. }) => assert_eq!(source_name, "dump.json"),
            other => panic!("expected format error, got {other:?}"),
        }
    }

    #[test]
    fn recommendation_overrides_flow_into_report() {
        let mut config = Config::default();
        config
            .recommendations
            .insert(Category::Timing, vec!["Poll instead of sleeping".to_string()]);
        let source = InMemoryArtifactSource::new().with_file("/r/run1/build.log", FAILED_LOG);

        let diagnosis = DiagnosticEngine::new(source, &config)
            .diagnose(Path::new("/r"), None)
            .unwrap();
        assert_eq!(
            diagnosis.report.recommendations[&Category::Timing],
            vec!["Poll instead of sleeping"]
        );
    }
}
