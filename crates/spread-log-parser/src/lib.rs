//! Spread Log Parser
//!
//! A library for reconstructing per-test phase timelines (Preparing,
//! Executing, Restoring, Debugging) from the timestamped execution logs
//! printed by the spread test runner, and rendering them as a summary table.
//!
//! # Example
//!
//! ```
//! use spread_log_parser::{analyze, format_summary};
//!
//! let log = std::fs::read_to_string("tests/fixtures/spread-sample.log")?;
//! let report = analyze(&log);
//!
//! for test in &report.tests {
//!     println!("{} on {}: {}s", test.test_name, test.system, test.total_duration());
//! }
//! print!("{}", format_summary(&report));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ansi;
mod format;
mod parser;
mod timeline;
mod types;

pub use format::{format_duration, format_summary};
pub use parser::{
    ParseOptions, parse_log_line, parse_log_line_with, parse_timestamp, preprocess_line,
};
pub use timeline::{AnalyzeError, analyze, analyze_file, analyze_reader, analyze_with};
pub use types::*;
