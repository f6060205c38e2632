pub mod config;
pub mod failure;
pub mod report;
pub mod run;
pub mod thread_dump;

pub use config::{AnalysisConfig, Config, LoggingConfig};
pub use failure::{
    percent_floor, Category, ExtractedFailure, FailureRecord, TestIdentity, SENTINEL_CLASS,
    SENTINEL_METHOD,
};
pub use report::{
    ArtifactSummary, CategorizationArtifact, FlakinessSummary, FlakyTestEntry, Report, RunOutcome,
    RunThreadDump, ThreadDumpOutcome,
};
pub use run::{BuildStatus, Run, BUILD_FAILURE_MARKER, BUILD_SUCCESS_MARKER};
pub use thread_dump::{
    DeadlockAnalysis, DeadlockCycle, LockInfo, ThreadDump, ThreadId, ThreadInfo, ThreadState,
    WaitForGraph,
};
