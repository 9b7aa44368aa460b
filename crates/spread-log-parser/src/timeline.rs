//! Reconstruction of per-test phase timelines from a whole log
//!
//! Spread never prints an explicit end marker for a phase. A phase ends when
//! the log shows that its test (or its worker) has moved on:
//!
//! - any event for a test ends that test's previous phase at the event's
//!   time, even if the worker's activity had closed it earlier;
//! - any event on a system provisionally closes the open Executing,
//!   Restoring and Debugging phases of the other tests on that system, which
//!   only sticks when those tests log nothing further;
//! - Preparing phases of other tests stay open, since workers prepare tests
//!   concurrently.
//!
//! Phases still open when the log ends keep a duration of zero.

use crate::parser::{ParseOptions, parse_log_line_with};
use crate::types::{AnalysisReport, Phase, PhaseEvent, PhaseSpan, TestExecution};
use chrono::NaiveDateTime;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading a log for analysis
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Failed to read log: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid UTF-8 in log content")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Analyze a whole spread log using the strict line grammar
///
/// # Example
///
/// ```
/// use spread_log_parser::analyze;
///
/// let log = "\
/// 2026-01-13 11:15:15 Preparing garden:archlinux-cloud:tests/desktop/firefox (garden:archlinux-cloud)...
/// 2026-01-13 11:16:13 Executing garden:archlinux-cloud:tests/desktop/firefox (garden:archlinux-cloud) (1/1)...";
///
/// let report = analyze(log);
/// assert_eq!(report.tests[0].prepare_duration(), 58.0);
/// ```
pub fn analyze(text: &str) -> AnalysisReport {
    analyze_with(text, &ParseOptions::default())
}

/// Analyze a whole spread log, cleaning each line as selected in `options`
pub fn analyze_with(text: &str, options: &ParseOptions) -> AnalysisReport {
    let mut timeline = Timeline::new();
    let mut skipped = 0usize;

    for line in text.lines() {
        match parse_log_line_with(line, options) {
            Some(event) => timeline.apply(event),
            None => skipped += 1,
        }
    }

    debug!(
        "Reconstructed {} tests from {} phase events ({} lines skipped)",
        timeline.tests.len(),
        timeline.events,
        skipped
    );

    timeline.finish()
}

/// Read a log from `reader` and analyze it
pub fn analyze_reader<R: Read>(
    mut reader: R,
    options: &ParseOptions,
) -> Result<AnalysisReport, AnalyzeError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8(bytes)?;
    Ok(analyze_with(&text, options))
}

/// Read the log at `path` and analyze it
pub fn analyze_file(
    path: impl AsRef<Path>,
    options: &ParseOptions,
) -> Result<AnalysisReport, AnalyzeError> {
    let path = path.as_ref();
    debug!("Reading log from {}", path.display());
    analyze_reader(File::open(path)?, options)
}

/// State of one analysis pass
struct Timeline {
    /// Tests in order of first appearance
    tests: Vec<TrackedTest>,
    /// Test name to position in `tests`
    index: HashMap<String, usize>,
    /// Per system, tests whose latest span another test's event may close
    closable: HashMap<String, Vec<usize>>,
    events: usize,
}

struct TrackedTest {
    execution: TestExecution,
    /// Phase of the most recent event for this test
    last_phase: Option<Phase>,
}

impl Timeline {
    fn new() -> Self {
        Self {
            tests: Vec::new(),
            index: HashMap::new(),
            closable: HashMap::new(),
            events: 0,
        }
    }

    fn apply(&mut self, event: PhaseEvent) {
        self.events += 1;
        trace!(
            "{} {} {} on {}",
            event.timestamp, event.phase, event.test_name, event.system
        );

        let position = self.entry(&event);

        let waiting = self.closable.remove(&event.system).unwrap_or_default();
        for i in waiting.into_iter().filter(|&i| i != position) {
            close_open_spans(&mut self.tests[i].execution, event.timestamp, |phase| {
                phase != Phase::Preparing
            });
        }

        let tracked = &mut self.tests[position];
        let test = &mut tracked.execution;
        // The test's own event is the authoritative end of its previous phase
        if let Some(last) = tracked.last_phase
            && let Some(span) = test.phases.get_mut(&last)
        {
            end_span(&test.test_name, last, span, event.timestamp);
        }
        close_open_spans(test, event.timestamp, |_| true);

        if test.phases.contains_key(&event.phase) {
            debug!(
                "{} entered {} again at {}, restarting the span",
                test.test_name, event.phase, event.timestamp
            );
        }
        test.phases
            .insert(event.phase, PhaseSpan::new(event.timestamp));
        tracked.last_phase = Some(event.phase);

        if event.phase != Phase::Preparing {
            self.closable.entry(event.system).or_default().push(position);
        }
    }

    /// Position of the event's test, creating it on first sighting
    fn entry(&mut self, event: &PhaseEvent) -> usize {
        if let Some(&position) = self.index.get(&event.test_name) {
            let test = &self.tests[position].execution;
            if test.system != event.system {
                debug!(
                    "{} seen on {} after first appearing on {}",
                    test.test_name, event.system, test.system
                );
            }
            return position;
        }

        let position = self.tests.len();
        self.tests.push(TrackedTest {
            execution: TestExecution::new(event.test_name.clone(), event.system.clone()),
            last_phase: None,
        });
        self.index.insert(event.test_name.clone(), position);
        position
    }

    fn finish(self) -> AnalysisReport {
        AnalysisReport {
            tests: self.tests.into_iter().map(|t| t.execution).collect(),
        }
    }
}

/// Close every open span of `test` whose phase passes `filter`
fn close_open_spans(
    test: &mut TestExecution,
    timestamp: NaiveDateTime,
    filter: impl Fn(Phase) -> bool,
) {
    for (phase, span) in test.phases.iter_mut() {
        if span.is_open() && filter(*phase) {
            end_span(&test.test_name, *phase, span, timestamp);
        }
    }
}

/// Set the end of `span`, never before its start
fn end_span(test_name: &str, phase: Phase, span: &mut PhaseSpan, timestamp: NaiveDateTime) {
    if timestamp < span.start {
        warn!(
            "{} {} closed at {} before it started at {}, treating as zero length",
            test_name, phase, timestamp, span.start
        );
        span.end = Some(span.start);
    } else {
        span.end = Some(timestamp);
    }
}
