//! Type definitions for spread log analysis

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A named stage of one test's execution on one system
///
/// Variants are declared in execution order, so `Ord` follows the order
/// spread runs them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Phase {
    Preparing,
    Executing,
    Restoring,
    Debugging,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 4] = [
        Phase::Preparing,
        Phase::Executing,
        Phase::Restoring,
        Phase::Debugging,
    ];

    /// The keyword spread prints for this phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preparing => "Preparing",
            Phase::Executing => "Executing",
            Phase::Restoring => "Restoring",
            Phase::Debugging => "Debugging",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a word is not one of the four phase keywords
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown phase keyword: {0:?}")]
pub struct UnknownPhase(pub String);

impl FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s)
            .ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// A single phase-transition line recognized in the log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEvent {
    /// Leading timestamp of the line
    pub timestamp: NaiveDateTime,
    /// Phase being entered
    pub phase: Phase,
    /// System (spread backend host) the test runs on, e.g. `archlinux-cloud`
    pub system: String,
    /// Test name, which may itself contain colons (`tests/server/maas:3_6`)
    pub test_name: String,
}

/// Start/end interval of one phase of one test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSpan {
    /// When the phase was entered
    pub start: NaiveDateTime,
    /// When the phase was closed by a later event, if one was seen
    pub end: Option<NaiveDateTime>,
}

impl PhaseSpan {
    /// Create an open span starting at `start`
    pub fn new(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    /// True while no later event has closed this span
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Duration in seconds, or 0.0 while the span is open
    pub fn duration(&self) -> f64 {
        match self.end {
            Some(end) => {
                let millis = (end - self.start).num_milliseconds().max(0);
                millis as f64 / 1000.0
            }
            None => 0.0,
        }
    }
}

/// Timeline of one test, keyed by phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestExecution {
    /// Test name as printed by spread
    pub test_name: String,
    /// System the test was first seen on
    pub system: String,
    /// At most one span per phase
    pub phases: BTreeMap<Phase, PhaseSpan>,
}

impl TestExecution {
    /// Create a test execution with no phases yet
    pub fn new(test_name: String, system: String) -> Self {
        Self {
            test_name,
            system,
            phases: BTreeMap::new(),
        }
    }

    /// Duration of `phase` in seconds, 0.0 if the phase was never entered
    pub fn phase_duration(&self, phase: Phase) -> f64 {
        self.phases.get(&phase).map_or(0.0, PhaseSpan::duration)
    }

    pub fn prepare_duration(&self) -> f64 {
        self.phase_duration(Phase::Preparing)
    }

    pub fn execute_duration(&self) -> f64 {
        self.phase_duration(Phase::Executing)
    }

    pub fn restore_duration(&self) -> f64 {
        self.phase_duration(Phase::Restoring)
    }

    pub fn debug_duration(&self) -> f64 {
        self.phase_duration(Phase::Debugging)
    }

    /// Sum of all phase durations
    pub fn total_duration(&self) -> f64 {
        self.phases.values().map(PhaseSpan::duration).sum()
    }
}

/// Row ordering used when presenting a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Order of first appearance in the log
    #[default]
    Appearance,
    /// Longest total duration first
    Total,
    /// Alphabetical by test name
    Name,
}

/// Result of one analysis pass: tests in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tests: Vec<TestExecution>,
}

impl AnalysisReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self { tests: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Look up a test by its exact name
    pub fn get(&self, test_name: &str) -> Option<&TestExecution> {
        self.tests.iter().find(|test| test.test_name == test_name)
    }

    /// Sum of all tests' total durations
    pub fn total_duration(&self) -> f64 {
        self.tests.iter().map(TestExecution::total_duration).sum()
    }

    /// Copy of this report with its tests reordered
    pub fn sorted_by(&self, order: SortOrder) -> AnalysisReport {
        let mut tests = self.tests.clone();
        match order {
            SortOrder::Appearance => {}
            SortOrder::Total => {
                // Stable, so ties keep their appearance order
                tests.sort_by(|a, b| b.total_duration().total_cmp(&a.total_duration()));
            }
            SortOrder::Name => tests.sort_by(|a, b| a.test_name.cmp(&b.test_name)),
        }
        AnalysisReport { tests }
    }
}
