//! Domain errors and non-fatal parse warnings for the diagnostic engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fatal errors surfaced by the diagnostic engine.
///
/// `Input` aborts the whole batch. `Format` is fatal for a single thread dump
/// only; the engine downgrades it to a [`ParseWarning::ThreadDumpRejected`]
/// when the dump is part of a larger batch.
#[derive(Debug, Error)]
pub enum DiagnosticError {
    #[error("Input error at {}: {reason}", .path.display())]
    Input { path: PathBuf, reason: String },

    #[error("Format error in {source_name}: {reason}")]
    Format { source_name: String, reason: String },
}

impl DiagnosticError {
    pub fn input(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Input {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn format(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

pub type DiagnosticResult<T> = Result<T, DiagnosticError>;

/// Which side of a lock relation a dangling thread id was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockRole {
    Owner,
    Waiter,
}

impl fmt::Display for LockRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => f.write_str("owner"),
            Self::Waiter => f.write_str("waiter"),
        }
    }
}

/// Recoverable problems found while processing run artifacts.
///
/// Every warning is logged when raised and also accumulated so callers can
/// decide whether to show them next to the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    /// A run's log could not be read. The run still counts toward the total.
    UnreadableLog {
        run_id: String,
        path: PathBuf,
        reason: String,
    },
    /// A run directory held nothing the store could use.
    SkippedRunDirectory { path: PathBuf, reason: String },
    /// A failed build whose log matched no extraction strategy.
    UnparsedFailure { run_id: String, failure_blocks: usize },
    /// A lock referenced a thread id missing from the dump.
    DanglingThreadReference {
        lock: String,
        thread_id: i64,
        role: LockRole,
    },
    /// A thread dump failed to parse.
    ThreadDumpRejected { source_name: String, reason: String },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreadableLog {
                run_id,
                path,
                reason,
            } => write!(
                f,
                "run {run_id}: log {} unreadable ({reason})",
                path.display()
            ),
            Self::SkippedRunDirectory { path, reason } => {
                write!(f, "skipped run directory {}: {reason}", path.display())
            }
            Self::UnparsedFailure {
                run_id,
                failure_blocks,
            } => write!(
                f,
                "run {run_id}: build failed but no test could be identified \
                 ({failure_blocks} failure block(s) seen); recorded as sentinel"
            ),
            Self::DanglingThreadReference {
                lock,
                thread_id,
                role,
            } => write!(
                f,
                "lock {lock} names unknown {role} thread {thread_id}; edge dropped"
            ),
            Self::ThreadDumpRejected {
                source_name,
                reason,
            } => write!(f, "thread dump {source_name} rejected: {reason}"),
        }
    }
}

/// Log a warning through tracing and keep it for the caller.
pub fn raise(warnings: &mut Vec<ParseWarning>, warning: ParseWarning) {
    tracing::warn!(warning = %warning, "diagnostic warning");
    warnings.push(warning);
}
