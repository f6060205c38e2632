//! Failure extraction from build logs.
//!
//! A failed run's log is passed through an ordered chain of
//! [`ExtractionStrategy`] values; the first strategy producing at least one
//! match wins. A failed run nothing matches yields one sentinel failure so
//! unexplained failures stay visible.
//!
//! Recognised layouts (Maven Surefire style):
//!
//! ```text
//! [ERROR] testBar(com.example.FooTest)  Time elapsed: 0.01 s  <<< FAILURE!
//! [ERROR] com.example.FooTest.testBar -- Time elapsed: 0.01 s <<< ERROR!
//! [ERROR] Failures:
//! [ERROR]   FooTest.testBar:42 Timeout waiting for response
//! [INFO] Results :
//! Failed tests:   testBar(com.example.FooTest): expected:<1> but was:<2>
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::errors::{raise, ParseWarning};
use crate::domain::models::{
    AnalysisConfig, ExtractedFailure, FailureRecord, Run, TestIdentity, BUILD_FAILURE_MARKER,
};

/// Snippet recorded on the sentinel failure.
pub const SENTINEL_SNIPPET: &str = "no failing test identified in build log";

const BLOCK_MARKERS: [&str; 2] = ["<<< FAILURE", "<<< ERROR"];

/// `pkg.Class.method`; the class segment must start upper-case.
static DOTTED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<class>(?:[A-Za-z_$][\w$]*\.)*[A-Z][\w$]*)\.(?P<method>[A-Za-z_$][\w$]*)")
        .expect("dotted test name pattern is valid")
});

/// `method(pkg.Class)` as printed by older Surefire versions.
static PAREN_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<method>[A-Za-z_$][\w$]*)\((?P<class>(?:[A-Za-z_$][\w$]*\.)*[A-Z][\w$]*)\)")
        .expect("parenthesised test name pattern is valid")
});

/// `Sub>Base.method` as printed for a method inherited from a base class;
/// the failure belongs to the subclass that ran it.
static INHERITED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<class>(?:[A-Za-z_$][\w$]*\.)*[A-Z][\w$]*)>(?:[A-Za-z_$][\w$]*\.)*[A-Z][\w$]*\.(?P<method>[A-Za-z_$][\w$]*)",
    )
    .expect("inherited test name pattern is valid")
});

/// Leading `[ERROR]` / `[INFO]` style level tag.
static LOG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[[A-Z]+\]\s?").expect("log prefix pattern is valid"));

/// Source-file suffixes the dotted pattern would otherwise read as methods.
const FILE_SUFFIXES: [&str; 4] = ["java", "kt", "groovy", "scala"];

/// A test name located inside a line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NameMatch<'a> {
    class: &'a str,
    method: &'a str,
    end: usize,
}

/// Earliest qualified test name in `line`, in any notation.
///
/// On a tie the inherited form wins, then the parenthesised one.
fn find_qualified_name(line: &str) -> Option<NameMatch<'_>> {
    let inherited = INHERITED_NAME
        .captures_iter(line)
        .find(|c| !FILE_SUFFIXES.contains(&&c["method"]));
    let paren = PAREN_NAME.captures(line);
    let dotted = DOTTED_NAME
        .captures_iter(line)
        .find(|c| !FILE_SUFFIXES.contains(&&c["method"]));

    [inherited, paren, dotted]
        .into_iter()
        .flatten()
        .filter_map(name_match)
        .min_by_key(|(start, _)| *start)
        .map(|(_, name)| name)
}

fn name_match(c: regex::Captures<'_>) -> Option<(usize, NameMatch<'_>)> {
    let whole = c.get(0)?;
    Some((
        whole.start(),
        NameMatch {
            class: c.name("class")?.as_str(),
            method: c.name("method")?.as_str(),
            end: whole.end(),
        },
    ))
}

/// Remove a leading log level tag.
fn strip_log_prefix(line: &str) -> &str {
    LOG_PREFIX
        .find(line)
        .map_or(line, |m| &line[m.end()..])
}

fn is_block_marker(line: &str) -> bool {
    BLOCK_MARKERS.iter().any(|m| line.contains(m))
}

/// Whether `line` is a bare section header such as `Failures:` or `Results :`.
fn is_section_header(line: &str, header: &str) -> bool {
    strip_log_prefix(line)
        .trim()
        .strip_suffix(':')
        .is_some_and(|h| h.trim_end() == header)
}

/// A line ending in `:` that carries no test name, e.g. `Errors:` or `Flakes:`.
fn is_any_section_header(line: &str) -> bool {
    let body = strip_log_prefix(line).trim();
    body.ends_with(':') && !body.contains(' ') && find_qualified_name(body).is_none()
}

/// Text following a summary entry's test name, minus `:42` and `»` noise.
fn trailing_message(line: &str, name_end: usize) -> String {
    let rest = &line[name_end..];
    let rest = rest.trim_start_matches(|c: char| c == ':' || c.is_ascii_digit());
    rest.trim_start_matches(|c: char| c.is_whitespace() || c == '»' || c == '-')
        .trim()
        .to_string()
}

/// One step of the extraction chain.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Failures found in `log`, or `None` when the strategy does not apply.
    fn extract(&self, log: &str) -> Option<Vec<ExtractedFailure>>;
}

/// Per-test `<<< FAILURE!` / `<<< ERROR!` blocks.
///
/// The test name is taken from the marker line, or failing that from the
/// block body that follows it (up to a blank line or the next marker).
#[derive(Debug, Default, Clone, Copy)]
pub struct FailureBlockStrategy;

impl FailureBlockStrategy {
    /// First test name in the block starting at `lines[start]`, with the
    /// index of the line it was found on.
    fn name_after_marker<'a>(lines: &[&'a str], start: usize) -> Option<(usize, NameMatch<'a>)> {
        lines[start..]
            .iter()
            .enumerate()
            .map(|(offset, &l)| (start + offset, strip_log_prefix(l).trim()))
            .take_while(|(_, l)| !l.is_empty() && !is_block_marker(l) && !l.contains("BUILD"))
            .find_map(|(idx, l)| find_qualified_name(l).map(|name| (idx, name)))
    }

    /// First non-blank line after `lines[idx]` that is still inside the block.
    fn snippet_after<'a>(lines: &[&'a str], idx: usize) -> Option<&'a str> {
        lines[idx + 1..]
            .iter()
            .map(|&l| strip_log_prefix(l).trim())
            .find(|l| !l.is_empty())
            .filter(|l| !is_block_marker(l))
    }
}

impl ExtractionStrategy for FailureBlockStrategy {
    fn name(&self) -> &'static str {
        "failure-blocks"
    }

    fn extract(&self, log: &str) -> Option<Vec<ExtractedFailure>> {
        let lines: Vec<&str> = log.lines().collect();
        let mut found = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            // Class-level summary lines carry the marker too but name no method
            if !is_block_marker(line) || line.contains("Tests run:") {
                continue;
            }
            let body = strip_log_prefix(line);
            let Some((name_line, name)) = find_qualified_name(body)
                .map(|name| (i, name))
                .or_else(|| Self::name_after_marker(&lines, i + 1))
            else {
                continue;
            };

            let snippet = Self::snippet_after(&lines, name_line).unwrap_or_else(|| {
                if name_line == i {
                    body.trim()
                } else {
                    strip_log_prefix(lines[name_line]).trim()
                }
            });

            found.push(ExtractedFailure::new(name.class, name.method, snippet));
        }

        (!found.is_empty()).then_some(found)
    }
}

/// Entries listed under a Surefire summary header (`Failures:`, `Errors:`).
#[derive(Debug, Clone, Copy)]
pub struct SummarySectionStrategy {
    name: &'static str,
    header: &'static str,
}

impl SummarySectionStrategy {
    pub const fn failures() -> Self {
        Self {
            name: "failures-section",
            header: "Failures",
        }
    }

    pub const fn errors() -> Self {
        Self {
            name: "errors-section",
            header: "Errors",
        }
    }
}

impl ExtractionStrategy for SummarySectionStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, log: &str) -> Option<Vec<ExtractedFailure>> {
        let mut found = Vec::new();
        let mut in_section = false;

        for line in log.lines() {
            if is_section_header(line, self.header) {
                in_section = true;
                continue;
            }
            if !in_section {
                continue;
            }

            let body = strip_log_prefix(line).trim();
            if body.is_empty()
                || body.contains("Tests run:")
                || body.contains("BUILD")
                || is_any_section_header(body)
            {
                in_section = false;
                continue;
            }

            if let Some(name) = find_qualified_name(body) {
                let message = trailing_message(body, name.end);
                let snippet = if message.is_empty() { body } else { &message };
                found.push(ExtractedFailure::new(name.class, name.method, snippet));
            }
        }

        (!found.is_empty()).then_some(found)
    }
}

/// Any test name inside a `Results:` block, up to the `Tests run:` tally.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultsSectionStrategy;

impl ExtractionStrategy for ResultsSectionStrategy {
    fn name(&self) -> &'static str {
        "results-section"
    }

    fn extract(&self, log: &str) -> Option<Vec<ExtractedFailure>> {
        let mut found = Vec::new();
        let mut in_section = false;

        for line in log.lines() {
            if is_section_header(line, "Results") {
                in_section = true;
                continue;
            }
            if !in_section {
                continue;
            }

            let body = strip_log_prefix(line).trim();
            if body.starts_with("Tests run:") || body.contains("BUILD") {
                in_section = false;
                continue;
            }

            if let Some(name) = find_qualified_name(body) {
                let message = trailing_message(body, name.end);
                let snippet = if message.is_empty() { body } else { &message };
                found.push(ExtractedFailure::new(name.class, name.method, snippet));
            }
        }

        (!found.is_empty()).then_some(found)
    }
}

/// What extraction produced for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunExtraction {
    pub failures: Vec<ExtractedFailure>,
    /// Strategy that matched; `None` for passing runs and sentinels
    pub strategy: Option<&'static str>,
    pub sentinel: bool,
}

/// Runs the strategy chain over run logs.
pub struct FailureExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    snippet_max_chars: usize,
}

impl Default for FailureExtractor {
    fn default() -> Self {
        Self::new(&AnalysisConfig::default())
    }
}

impl FailureExtractor {
    /// Extractor with the standard four-step chain.
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_strategies(
            vec![
                Box::new(FailureBlockStrategy),
                Box::new(SummarySectionStrategy::failures()),
                Box::new(SummarySectionStrategy::errors()),
                Box::new(ResultsSectionStrategy),
            ],
            config.snippet_max_chars,
        )
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn ExtractionStrategy>>,
        snippet_max_chars: usize,
    ) -> Self {
        Self {
            strategies,
            snippet_max_chars,
        }
    }

    /// Names of the configured strategies, in chain order.
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Failures of one run, deduplicated by test identity.
    ///
    /// Passing or unreadable runs yield nothing. A failed run no strategy
    /// understands yields a single sentinel and a warning.
    pub fn extract_failures(
        &self,
        run: &Run,
        warnings: &mut Vec<ParseWarning>,
    ) -> Vec<ExtractedFailure> {
        let Some(log) = run.log.as_deref().filter(|_| run.is_failed()) else {
            return Vec::new();
        };

        let extraction = self.extract_from_log(log);
        if extraction.sentinel {
            raise(
                warnings,
                ParseWarning::UnparsedFailure {
                    run_id: run.id.clone(),
                    failure_blocks: log.lines().filter(|l| is_block_marker(l)).count(),
                },
            );
        } else if let Some(strategy) = extraction.strategy {
            tracing::debug!(
                run = %run.id,
                strategy,
                failures = extraction.failures.len(),
                "extracted failures"
            );
        }
        extraction.failures
    }

    /// Apply the chain to raw log text.
    pub fn extract_from_log(&self, log: &str) -> RunExtraction {
        if !log.contains(BUILD_FAILURE_MARKER) {
            return RunExtraction {
                failures: Vec::new(),
                strategy: None,
                sentinel: false,
            };
        }

        for strategy in &self.strategies {
            if let Some(found) = strategy.extract(log).filter(|f| !f.is_empty()) {
                return RunExtraction {
                    failures: self.finish(found),
                    strategy: Some(strategy.name()),
                    sentinel: false,
                };
            }
        }

        RunExtraction {
            failures: vec![ExtractedFailure::sentinel(SENTINEL_SNIPPET)],
            strategy: None,
            sentinel: true,
        }
    }

    /// Dedupe by identity keeping the first snippet, then trim snippets.
    fn finish(&self, found: Vec<ExtractedFailure>) -> Vec<ExtractedFailure> {
        let mut seen = HashSet::new();
        found
            .into_iter()
            .filter(|f| seen.insert(f.identity()))
            .map(|mut f| {
                f.error_snippet = truncate_chars(f.error_snippet.trim(), self.snippet_max_chars);
                f
            })
            .collect()
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// Immutable accumulator of failure records keyed by test identity.
///
/// `absorb` and `merge` consume and return a new value, so a batch is a
/// plain fold and per-run partial aggregates can be combined in any order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureAggregate {
    records: BTreeMap<TestIdentity, FailureRecord>,
}

impl FailureAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one run's extracted failures.
    #[must_use]
    pub fn absorb(mut self, run_id: &str, failures: Vec<ExtractedFailure>) -> Self {
        for failure in failures {
            match self.records.get_mut(&failure.identity()) {
                Some(record) => {
                    record.occurrence_count += 1;
                    record.error_snippets.push(failure.error_snippet);
                    record.run_ids.push(run_id.to_string());
                }
                None => {
                    self.records.insert(
                        failure.identity(),
                        FailureRecord::first_occurrence(failure, run_id),
                    );
                }
            }
        }
        self
    }

    /// Combine two aggregates.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (identity, incoming) in other.records {
            match self.records.get_mut(&identity) {
                Some(record) => {
                    record.occurrence_count += incoming.occurrence_count;
                    record.error_snippets.extend(incoming.error_snippets);
                    record.run_ids.extend(incoming.run_ids);
                }
                None => {
                    self.records.insert(identity, incoming);
                }
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, identity: &TestIdentity) -> Option<&FailureRecord> {
        self.records.get(identity)
    }

    /// Records ordered by test identity.
    pub fn into_records(self) -> Vec<FailureRecord> {
        self.records.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const BLOCK_LOG: &str = r"
[INFO] Running com.example.FooTest
[ERROR] Tests run: 2, Failures: 1, Errors: 0, Skipped: 0, Time elapsed: 5.1 s <<< FAILURE! - in com.example.FooTest
[ERROR] testBar(com.example.FooTest)  Time elapsed: 5.0 s  <<< FAILURE!
java.lang.AssertionError: Timeout waiting for server
	at com.example.FooTest.testBar(FooTest.java:42)

[ERROR] com.example.BazTest.testQux -- Time elapsed: 0.2 s <<< ERROR!
java.lang.IllegalStateException: pool exhausted

[INFO] Results:
[ERROR] Failures:
[ERROR]   FooTest.testBar:42 Timeout waiting for server
[INFO]
[INFO] BUILD FAILURE
";

    const SUMMARY_LOG: &str = r"
[INFO] Results:
[INFO]
[ERROR] Failures:
[ERROR]   FooTest.testBar:42 Timeout waiting for server
[ERROR]   com.example.LockTest.testRace:17 » ConcurrentModification
[INFO]
[ERROR] Errors:
[ERROR]   DbTest.testConnect:9 » SQL Connection refused
[INFO]
[ERROR] Tests run: 10, Failures: 2, Errors: 1, Skipped: 0
[INFO] BUILD FAILURE
";

    fn extractor() -> FailureExtractor {
        FailureExtractor::default()
    }

    fn run(id: &str, log: &str) -> Run {
        Run::from_log(id, vec![PathBuf::from(format!("{id}/build.log"))], log.to_string())
    }

    #[test]
    fn finds_dotted_and_paren_names() {
        let m = find_qualified_name("testBar(com.example.FooTest)  Time").unwrap();
        assert_eq!((m.class, m.method), ("com.example.FooTest", "testBar"));

        let m = find_qualified_name("com.example.FooTest.testBar -- Time").unwrap();
        assert_eq!((m.class, m.method), ("com.example.FooTest", "testBar"));

        let m = find_qualified_name("FooTest.testBar:42 boom").unwrap();
        assert_eq!((m.class, m.method), ("FooTest", "testBar"));

        assert!(find_qualified_name("Tests run: 5, Failures: 1").is_none());
        assert!(find_qualified_name("see FooTest.java for details").is_none());
    }

    #[test]
    fn strips_level_prefix() {
        assert_eq!(strip_log_prefix("[ERROR]   FooTest.a"), "  FooTest.a");
        assert_eq!(strip_log_prefix("plain"), "plain");
    }

    #[test]
    fn section_headers() {
        assert!(is_section_header("[ERROR] Failures: ", "Failures"));
        assert!(is_section_header("Results :", "Results"));
        assert!(!is_section_header("[ERROR] Tests run: 5, Failures: 1", "Failures"));
    }

    #[test]
    fn passing_run_yields_nothing() {
        let result = extractor().extract_from_log("[INFO] BUILD SUCCESS\n");
        assert!(result.failures.is_empty());
        assert!(!result.sentinel);
        assert_eq!(result.strategy, None);
    }

    #[test]
    fn failure_blocks_win_first() {
        let result = extractor().extract_from_log(BLOCK_LOG);
        assert_eq!(result.strategy, Some("failure-blocks"));
        assert_eq!(
            result.failures,
            vec![
                ExtractedFailure::new(
                    "com.example.FooTest",
                    "testBar",
                    "java.lang.AssertionError: Timeout waiting for server"
                ),
                ExtractedFailure::new(
                    "com.example.BazTest",
                    "testQux",
                    "java.lang.IllegalStateException: pool exhausted"
                ),
            ]
        );
    }

    #[test]
    fn name_on_line_after_marker() {
        let log = "\
[ERROR] Tests run: 1, Failures: 1 <<< FAILURE! - in com.example.FooTest
[ERROR] <<< FAILURE!
com.example.FooTest.testBar
Timeout
[INFO] BUILD FAILURE
";
        let result = extractor().extract_from_log(log);
        assert_eq!(result.strategy, Some("failure-blocks"));
        assert!(!result.sentinel);
        assert_eq!(
            result.failures,
            vec![ExtractedFailure::new("com.example.FooTest", "testBar", "Timeout")]
        );
    }

    #[test]
    fn bare_marker_block_stops_at_blank_line() {
        let log = "[ERROR] <<< FAILURE!\n\nFooTest.testBar later on\n[INFO] BUILD FAILURE\n";
        let result = extractor().extract_from_log(log);
        assert_ne!(result.strategy, Some("failure-blocks"));
    }

    #[test]
    fn inherited_method_belongs_to_subclass() {
        let m = find_qualified_name("FooTest>BaseTest.testBar:42 Timeout").unwrap();
        assert_eq!((m.class, m.method), ("FooTest", "testBar"));

        let log = "\
[ERROR] Failures:
[ERROR]   FooTest>BaseTest.testBar:42 Timeout waiting
[ERROR]   QuxTest>BaseTest.testBar:42 Timeout waiting
[INFO]
[INFO] BUILD FAILURE
";
        let result = extractor().extract_from_log(log);
        assert_eq!(
            result.failures,
            vec![
                ExtractedFailure::new("FooTest", "testBar", "Timeout waiting"),
                ExtractedFailure::new("QuxTest", "testBar", "Timeout waiting"),
            ]
        );
    }

    #[test]
    fn failures_section_before_errors_section() {
        let result = extractor().extract_from_log(SUMMARY_LOG);
        assert_eq!(result.strategy, Some("failures-section"));
        assert_eq!(
            result.failures,
            vec![
                ExtractedFailure::new("FooTest", "testBar", "Timeout waiting for server"),
                ExtractedFailure::new("com.example.LockTest", "testRace", "ConcurrentModification"),
            ]
        );
    }

    #[test]
    fn errors_section_when_no_failures() {
        let log = "[ERROR] Errors:\n[ERROR]   DbTest.testConnect:9 » SQL Connection refused\n[INFO]\n[INFO] BUILD FAILURE\n";
        let result = extractor().extract_from_log(log);
        assert_eq!(result.strategy, Some("errors-section"));
        assert_eq!(
            result.failures,
            vec![ExtractedFailure::new("DbTest", "testConnect", "SQL Connection refused")]
        );
    }

    #[test]
    fn results_section_fallback() {
        let log = "Results :\n\nFailed tests:   testBar(com.example.FooTest): expected:<1> but was:<2>\n  testQux(com.example.FooTest): boom\n\nTests run: 3, Failures: 2\n\nBUILD FAILURE\n";
        let result = extractor().extract_from_log(log);
        assert_eq!(result.strategy, Some("results-section"));
        assert_eq!(result.failures.len(), 2);
        assert_eq!(result.failures[0].test_method, "testBar");
        assert_eq!(result.failures[0].error_snippet, "expected:<1> but was:<2>");
        assert_eq!(result.failures[1].test_method, "testQux");
    }

    #[test]
    fn unparsed_failure_yields_single_sentinel() {
        let mut warnings = Vec::new();
        let run = run("run4", "[ERROR] Compilation failure\n[INFO] BUILD FAILURE\n");
        let failures = extractor().extract_failures(&run, &mut warnings);

        assert_eq!(failures, vec![ExtractedFailure::sentinel(SENTINEL_SNIPPET)]);
        assert_eq!(
            warnings,
            vec![ParseWarning::UnparsedFailure {
                run_id: "run4".into(),
                failure_blocks: 0
            }]
        );
    }

    #[test]
    fn duplicate_names_in_one_run_count_once() {
        let log = "[ERROR] testA(x.ATest) <<< FAILURE!\nfirst\n[ERROR] testA(x.ATest) <<< FAILURE!\nsecond\nBUILD FAILURE";
        let result = extractor().extract_from_log(log);
        assert_eq!(result.failures, vec![ExtractedFailure::new("x.ATest", "testA", "first")]);
    }

    #[test]
    fn snippets_are_truncated() {
        let config = AnalysisConfig {
            snippet_max_chars: 5,
            ..AnalysisConfig::default()
        };
        let log = "[ERROR] testA(x.ATest) <<< FAILURE!\nTimeout after 30 seconds\nBUILD FAILURE";
        let result = FailureExtractor::new(&config).extract_from_log(log);
        assert_eq!(result.failures[0].error_snippet, "Timeo");
    }

    #[test]
    fn unreadable_run_yields_nothing() {
        let mut warnings = Vec::new();
        let run = Run::unreadable("run1", vec![PathBuf::from("run1/build.log")]);
        assert!(extractor().extract_failures(&run, &mut warnings).is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn strategy_chain_order() {
        assert_eq!(
            extractor().strategy_names(),
            vec!["failure-blocks", "failures-section", "errors-section", "results-section"]
        );
    }

    #[test]
    fn aggregate_merges_by_identity() {
        let aggregate = FailureAggregate::new()
            .absorb("run1", vec![ExtractedFailure::new("A", "t", "one")])
            .absorb(
                "run2",
                vec![
                    ExtractedFailure::new("A", "t", "two"),
                    ExtractedFailure::new("B", "u", "other"),
                ],
            );

        assert_eq!(aggregate.len(), 2);
        let record = aggregate.get(&TestIdentity::new("A", "t")).unwrap();
        assert_eq!(record.occurrence_count, 2);
        assert_eq!(record.error_snippets, vec!["one", "two"]);
        assert_eq!(record.run_ids, vec!["run1", "run2"]);
    }

    #[test]
    fn aggregate_merge_matches_fold() {
        let left = FailureAggregate::new().absorb("run1", vec![ExtractedFailure::new("A", "t", "x")]);
        let right = FailureAggregate::new().absorb("run2", vec![ExtractedFailure::new("A", "t", "y")]);
        let merged = left.merge(right);
        assert_eq!(
            merged.get(&TestIdentity::new("A", "t")).unwrap().occurrence_count,
            2
        );
    }
}
