//! Flaketrace - flaky test diagnostics
//!
//! Mines the logs of repeated test runs for failing tests, assigns each one a
//! likely root-cause category, and checks thread dumps for lock-ordering
//! deadlocks. The result is a single [`Report`] value that callers render as
//! they see fit.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and the artifact port
//! - **Service Layer** (`services`): run discovery, extraction,
//!   classification, deadlock detection and report assembly
//! - **Infrastructure Layer** (`infrastructure`): filesystem and in-memory
//!   artifact sources, configuration, logging
//! - **CLI Layer** (`cli`): the `flaketrace` command
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use flaketrace::{Config, DiagnosticEngine, FsArtifactSource};
//!
//! let engine = DiagnosticEngine::new(FsArtifactSource::new(), &Config::default());
//! let diagnosis = engine.diagnose(Path::new("target/test-runs"), None)?;
//! println!("{}% of runs failed", diagnosis.report.summary.flakiness_rate_percent);
//! # Ok::<(), flaketrace::DiagnosticError>(())
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    BuildStatus, Category, Config, DeadlockCycle, FailureRecord, Report, Run, ThreadDump,
};
pub use domain::ports::ArtifactSource;
pub use domain::{DiagnosticError, DiagnosticResult, ParseWarning};
pub use infrastructure::artifacts::{FsArtifactSource, InMemoryArtifactSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Diagnosis, DiagnosticEngine, FailureClassifier};
