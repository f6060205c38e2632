//! Run discovery over a directory of completed test-run artifacts.
//!
//! Two layouts are accepted:
//!
//! - a root holding `run*` subdirectories, each with one build log and
//!   optionally a thread-dump JSON file;
//! - a flat root whose log files together form a single synthetic run.
//!
//! Discovery order is lexical by entry name.

use std::path::{Path, PathBuf};

use crate::domain::errors::{raise, DiagnosticError, DiagnosticResult, ParseWarning};
use crate::domain::models::{AnalysisConfig, Run};
use crate::domain::ports::{ArtifactEntry, ArtifactSource};

/// Discovers runs through an [`ArtifactSource`].
pub struct RunStore<'a, S: ArtifactSource + ?Sized> {
    source: &'a S,
    config: &'a AnalysisConfig,
}

impl<'a, S: ArtifactSource + ?Sized> RunStore<'a, S> {
    pub fn new(source: &'a S, config: &'a AnalysisConfig) -> Self {
        Self { source, config }
    }

    /// Load every run under `root`.
    ///
    /// Fails with [`DiagnosticError::Input`] when `root` is missing, is not a
    /// listable directory, or yields no log file at all. Runs whose log
    /// cannot be read are still returned (status `UNKNOWN`) with a warning.
    pub fn discover_runs(
        &self,
        root: &Path,
        warnings: &mut Vec<ParseWarning>,
    ) -> DiagnosticResult<Vec<Run>> {
        if !self.source.exists(root) {
            return Err(DiagnosticError::input(root, "directory does not exist"));
        }
        if !self.source.is_dir(root) {
            return Err(DiagnosticError::input(root, "not a directory"));
        }

        let entries = self.sorted_entries(root).map_err(|e| {
            DiagnosticError::input(root, format!("cannot list directory: {e}"))
        })?;

        let run_dirs: Vec<&ArtifactEntry> = entries
            .iter()
            .filter(|e| e.is_dir && e.name.starts_with(&self.config.run_dir_prefix))
            .collect();

        let runs = if run_dirs.is_empty() {
            tracing::debug!(root = %root.display(), "no run directories, using flat layout");
            self.flat_run(root, &entries, warnings).into_iter().collect()
        } else {
            run_dirs
                .into_iter()
                .filter_map(|dir| self.run_from_dir(dir, warnings))
                .collect::<Vec<_>>()
        };

        if runs.is_empty() {
            return Err(DiagnosticError::input(root, "no discoverable log files"));
        }

        tracing::info!(root = %root.display(), runs = runs.len(), "discovered runs");
        Ok(runs)
    }

    fn sorted_entries(&self, dir: &Path) -> std::io::Result<Vec<ArtifactEntry>> {
        let mut entries = self.source.list_dir(dir)?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    fn is_log(&self, entry: &ArtifactEntry) -> bool {
        !entry.is_dir
            && entry.extension().is_some_and(|ext| {
                self.config
                    .log_extensions
                    .iter()
                    .any(|allowed| allowed.eq_ignore_ascii_case(&ext))
            })
    }

    fn thread_dump_in(entries: &[ArtifactEntry]) -> Option<PathBuf> {
        entries
            .iter()
            .find(|e| {
                !e.is_dir
                    && e.extension().as_deref() == Some("json")
                    && e.name.to_ascii_lowercase().contains("thread")
            })
            .map(|e| e.path.clone())
    }

    fn run_from_dir(&self, dir: &ArtifactEntry, warnings: &mut Vec<ParseWarning>) -> Option<Run> {
        let entries = match self.sorted_entries(&dir.path) {
            Ok(entries) => entries,
            Err(e) => {
                raise(
                    warnings,
                    ParseWarning::SkippedRunDirectory {
                        path: dir.path.clone(),
                        reason: format!("cannot list directory: {e}"),
                    },
                );
                return None;
            }
        };

        let mut logs = entries.iter().filter(|e| self.is_log(e));
        let Some(log) = logs.next() else {
            raise(
                warnings,
                ParseWarning::SkippedRunDirectory {
                    path: dir.path.clone(),
                    reason: "no log file".to_string(),
                },
            );
            return None;
        };
        for ignored in logs {
            tracing::debug!(run = %dir.name, file = %ignored.name, "ignoring extra log file");
        }

        let mut run = match self.source.read_to_string(&log.path) {
            Ok(text) => Run::from_log(&dir.name, vec![log.path.clone()], text),
            Err(e) => {
                raise(
                    warnings,
                    ParseWarning::UnreadableLog {
                        run_id: dir.name.clone(),
                        path: log.path.clone(),
                        reason: e.to_string(),
                    },
                );
                Run::unreadable(&dir.name, vec![log.path.clone()])
            }
        };

        if let Some(dump) = Self::thread_dump_in(&entries) {
            run = run.with_thread_dump(dump);
        }

        tracing::debug!(run = %run.id, status = %run.build_status, "loaded run");
        Some(run)
    }

    fn flat_run(
        &self,
        root: &Path,
        entries: &[ArtifactEntry],
        warnings: &mut Vec<ParseWarning>,
    ) -> Option<Run> {
        let logs: Vec<&ArtifactEntry> = entries.iter().filter(|e| self.is_log(e)).collect();
        if logs.is_empty() {
            return None;
        }

        let id = root
            .file_name()
            .map_or_else(|| "run".to_string(), |n| n.to_string_lossy().into_owned());
        let paths: Vec<PathBuf> = logs.iter().map(|e| e.path.clone()).collect();

        let mut texts = Vec::with_capacity(logs.len());
        for log in &logs {
            match self.source.read_to_string(&log.path) {
                Ok(text) => texts.push(text),
                Err(e) => raise(
                    warnings,
                    ParseWarning::UnreadableLog {
                        run_id: id.clone(),
                        path: log.path.clone(),
                        reason: e.to_string(),
                    },
                ),
            }
        }

        let run = if texts.is_empty() {
            Run::unreadable(id, paths)
        } else {
            Run::from_log(id, paths, texts.join("\n"))
        };

        Some(match Self::thread_dump_in(entries) {
            Some(dump) => run.with_thread_dump(dump),
            None => run,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::BuildStatus;
    use crate::infrastructure::artifacts::InMemoryArtifactSource;

    fn discover(source: &InMemoryArtifactSource, root: &str) -> (DiagnosticResult<Vec<Run>>, Vec<ParseWarning>) {
        let config = AnalysisConfig::default();
        let mut warnings = Vec::new();
        let result = RunStore::new(source, &config).discover_runs(Path::new(root), &mut warnings);
        (result, warnings)
    }

    #[test]
    fn run_directories_in_lexical_order() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run2/build.log", "BUILD FAILURE")
            .with_file("/r/run1/build.log", "BUILD SUCCESS")
            .with_file("/r/run3/output.txt", "no marker");

        let (result, warnings) = discover(&source, "/r");
        let runs = result.unwrap();

        assert!(warnings.is_empty());
        let ids: Vec<_> = runs.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["run1", "run2", "run3"]);
        assert_eq!(runs[0].build_status, BuildStatus::Success);
        assert_eq!(runs[1].build_status, BuildStatus::Failure);
        assert_eq!(runs[2].build_status, BuildStatus::Unknown);
    }

    #[test]
    fn flat_directory_is_one_synthetic_run() {
        let source = InMemoryArtifactSource::new()
            .with_file("/logs/b.log", "BUILD FAILURE")
            .with_file("/logs/a.log", "[INFO] Tests run: 3")
            .with_file("/logs/readme.md", "ignored");

        let (result, _) = discover(&source, "/logs");
        let runs = result.unwrap();

        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, "logs");
        assert_eq!(runs[0].log_paths.len(), 2);
        assert_eq!(runs[0].log_paths[0], PathBuf::from("/logs/a.log"));
        assert_eq!(runs[0].build_status, BuildStatus::Failure);
    }

    #[test]
    fn missing_root_is_input_error() {
        let source = InMemoryArtifactSource::new();
        let (result, _) = discover(&source, "/nowhere");
        assert!(matches!(result, Err(DiagnosticError::Input { .. })));
    }

    #[test]
    fn empty_root_is_input_error() {
        let source = InMemoryArtifactSource::new().with_dir("/empty");
        let (result, _) = discover(&source, "/empty");
        match result {
            Err(DiagnosticError::Input { reason, .. }) => {
                assert_eq!(reason, "no discoverable log files");
            }
            other => panic!("expected input error, got {other:?}"),
        }
    }

    #[test]
    fn file_root_is_input_error() {
        let source = InMemoryArtifactSource::new().with_file("/r/build.log", "x");
        let (result, _) = discover(&source, "/r/build.log");
        assert!(matches!(result, Err(DiagnosticError::Input { .. })));
    }

    #[test]
    fn run_directory_without_log_is_skipped() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", "BUILD SUCCESS")
            .with_file("/r/run2/notes.md", "nothing");

        let (result, warnings) = discover(&source, "/r");
        assert_eq!(result.unwrap().len(), 1);
        assert!(matches!(
            warnings.as_slice(),
            [ParseWarning::SkippedRunDirectory { .. }]
        ));
    }

    #[test]
    fn unreadable_log_still_counts() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", "BUILD SUCCESS")
            .with_unreadable_file("/r/run2/build.log");

        let (result, warnings) = discover(&source, "/r");
        let runs = result.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[1].build_status, BuildStatus::Unknown);
        assert!(runs[1].log.is_none());
        assert!(matches!(
            warnings.as_slice(),
            [ParseWarning::UnreadableLog { run_id, .. }] if run_id == "run2"
        ));
    }

    #[test]
    fn thread_dump_attached_to_run() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/build.log", "BUILD FAILURE")
            .with_file("/r/run1/thread_dump.json", "{}")
            .with_file("/r/run1/metrics.json", "{}");

        let (result, _) = discover(&source, "/r");
        let runs = result.unwrap();
        assert_eq!(
            runs[0].thread_dump_path,
            Some(PathBuf::from("/r/run1/thread_dump.json"))
        );
    }

    #[test]
    fn first_log_wins_in_run_directory() {
        let source = InMemoryArtifactSource::new()
            .with_file("/r/run1/b.log", "BUILD FAILURE")
            .with_file("/r/run1/a.log", "BUILD SUCCESS");

        let (result, _) = discover(&source, "/r");
        let runs = result.unwrap();
        assert_eq!(runs[0].log_paths, vec![PathBuf::from("/r/run1/a.log")]);
        assert_eq!(runs[0].build_status, BuildStatus::Success);
    }
}
