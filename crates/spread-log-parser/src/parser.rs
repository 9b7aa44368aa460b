//! Line-level parsing of spread execution logs
//!
//! Spread prints one line per phase transition:
//!
//! ```text
//! 2026-01-13 11:16:13 Executing garden:archlinux-cloud:tests/desktop/firefox (garden:archlinux-cloud) (2/19)...
//! ```
//!
//! Everything else (allocation, connection, host-level preparation) is
//! ignored by the analyzer.

use crate::ansi::strip_ansi;
use crate::types::{Phase, PhaseEvent};
use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional clean-up applied to each line before it is matched
///
/// The default applies nothing, so only lines in spread's own format match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Remove ANSI escape sequences (logs captured from a coloured terminal)
    pub strip_ansi: bool,
    /// Remove a leading CI runner timestamp such as `2024-01-15T10:30:00.1234567Z `
    pub strip_runner_timestamp: bool,
}

fn timestamp_regex() -> &'static Regex {
    static TIMESTAMP_REGEX: OnceLock<Regex> = OnceLock::new();
    TIMESTAMP_REGEX.get_or_init(|| {
        Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})")
            .expect("timestamp regex is valid")
    })
}

fn event_regex() -> &'static Regex {
    static EVENT_REGEX: OnceLock<Regex> = OnceLock::new();
    EVENT_REGEX.get_or_init(|| {
        // The test name is greedy so it runs to the last " (garden:", which
        // keeps suffixes like ":3_6" attached to it. Executing lines carry a
        // job counter before the trailing "...".
        Regex::new(concat!(
            r"^([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}) ",
            r"(Preparing|Executing|Restoring|Debugging) ",
            r"garden:([^:\s]+):(.+) \(garden:[^)\s]+\)",
            r"(?: \([0-9]+/[0-9]+\))?\.\.\.$",
        ))
        .expect("event regex is valid")
    })
}

fn runner_timestamp_regex() -> &'static Regex {
    static RUNNER_TIMESTAMP_REGEX: OnceLock<Regex> = OnceLock::new();
    RUNNER_TIMESTAMP_REGEX.get_or_init(|| {
        Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}(?:\.[0-9]+)?Z ?")
            .expect("runner timestamp regex is valid")
    })
}

/// Parse the `YYYY-MM-DD HH:MM:SS` timestamp at the start of a line
///
/// Returns `None` when the line does not start with one, or when the digits
/// do not form a real date and time.
pub fn parse_timestamp(line: &str) -> Option<NaiveDateTime> {
    let captures = timestamp_regex().captures(line)?;
    to_datetime(captures.get(1)?.as_str())
}

/// Parse a test-level phase transition line
///
/// Host-level lines like `Preparing garden:archlinux-cloud (garden:archlinux-cloud)...`
/// carry no test name and return `None`, as does any line outside the grammar.
pub fn parse_log_line(line: &str) -> Option<PhaseEvent> {
    let captures = event_regex().captures(line)?;

    let timestamp = to_datetime(captures.get(1)?.as_str())?;
    let phase = captures.get(2)?.as_str().parse::<Phase>().ok()?;
    let system = captures.get(3)?.as_str().to_string();
    let test_name = captures.get(4)?.as_str().to_string();

    Some(PhaseEvent {
        timestamp,
        phase,
        system,
        test_name,
    })
}

/// Like [`parse_log_line`], after applying the clean-up selected in `options`
pub fn parse_log_line_with(line: &str, options: &ParseOptions) -> Option<PhaseEvent> {
    parse_log_line(&preprocess_line(line, options))
}

/// Apply the clean-up selected in `options`, borrowing when nothing changes
pub fn preprocess_line<'a>(line: &'a str, options: &ParseOptions) -> Cow<'a, str> {
    let line = if options.strip_ansi {
        strip_ansi(line)
    } else {
        Cow::Borrowed(line)
    };

    if !options.strip_runner_timestamp {
        return line;
    }

    match runner_timestamp_regex().find(&line) {
        Some(prefix) => Cow::Owned(line[prefix.end()..].to_string()),
        None => line,
    }
}

fn to_datetime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}
