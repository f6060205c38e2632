pub mod deadlock_detector;
pub mod diagnostic_engine;
pub mod failure_classifier;
pub mod failure_extractor;
pub mod report_assembler;
pub mod run_store;
pub mod thread_dump_parser;

pub use deadlock_detector::{analyze_dump, build_wait_for_graph, detect_deadlocks};
pub use diagnostic_engine::{Diagnosis, DiagnosticEngine};
pub use failure_classifier::{Classification, FailureClassifier, KeywordRule, RecommendationTable, KEYWORD_RULES};
pub use failure_extractor::{
    ExtractionStrategy, FailureAggregate, FailureBlockStrategy, FailureExtractor,
    ResultsSectionStrategy, RunExtraction, SummarySectionStrategy, SENTINEL_SNIPPET,
};
pub use report_assembler::{flakiness_summary, ReportAssembler, ReportInputs};
pub use run_store::RunStore;
pub use thread_dump_parser::parse_dump;
