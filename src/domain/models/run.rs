//! Test-run records discovered from an artifact directory.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Marker a build tool prints when the build failed.
pub const BUILD_FAILURE_MARKER: &str = "BUILD FAILURE";

/// Marker a build tool prints when the build passed.
pub const BUILD_SUCCESS_MARKER: &str = "BUILD SUCCESS";

/// Outcome of a single build as recorded in its log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Success,
    Failure,
    Unknown,
}

impl BuildStatus {
    /// Derive the status from log text.
    ///
    /// A failure marker wins over a success marker: multi-module builds print
    /// per-module successes before the reactor reports the overall failure.
    pub fn from_log(log: &str) -> Self {
        if log.contains(BUILD_FAILURE_MARKER) {
            Self::Failure
        } else if log.contains(BUILD_SUCCESS_MARKER) {
            Self::Success
        } else {
            Self::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed test run. Immutable once discovered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    /// Directory name, or the root directory name for a flat layout
    pub id: String,
    /// Log files backing this run, lexically ordered. Never empty.
    pub log_paths: Vec<PathBuf>,
    pub build_status: BuildStatus,
    /// Joined log text; `None` when the log could not be read
    #[serde(skip)]
    pub log: Option<String>,
    /// Thread dump captured alongside this run, if any
    pub thread_dump_path: Option<PathBuf>,
}

impl Run {
    /// Build a run from already-read log text.
    pub fn from_log(id: impl Into<String>, log_paths: Vec<PathBuf>, log: String) -> Self {
        Self {
            id: id.into(),
            log_paths,
            build_status: BuildStatus::from_log(&log),
            log: Some(log),
            thread_dump_path: None,
        }
    }

    /// Build a run whose log could not be read.
    pub fn unreadable(id: impl Into<String>, log_paths: Vec<PathBuf>) -> Self {
        Self {
            id: id.into(),
            log_paths,
            build_status: BuildStatus::Unknown,
            log: None,
            thread_dump_path: None,
        }
    }

    #[must_use]
    pub fn with_thread_dump(mut self, path: PathBuf) -> Self {
        self.thread_dump_path = Some(path);
        self
    }

    pub fn is_failed(&self) -> bool {
        self.build_status == BuildStatus::Failure
    }
}
