use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use spread_log_parser::{
    AnalysisReport, ParseOptions, SortOrder, analyze_file, analyze_reader, format_summary,
};
use std::io;
use std::path::PathBuf;

use crate::config::Config;

mod config;

/// Summarize how long each spread test spent preparing, executing, restoring
/// and debugging
#[derive(Debug, Parser)]
#[command(name = "spread-log-analyzer", version, about)]
struct Cli {
    /// Spread log to analyze; reads stdin when omitted or `-`
    log_file: Option<PathBuf>,

    /// Row order of the summary [default: from config, else appearance]
    #[arg(long, value_enum)]
    sort: Option<SortArg>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Match lines exactly as written, without stripping colour codes or
    /// CI runner timestamps
    #[arg(long)]
    raw: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortArg {
    Appearance,
    Total,
    Name,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Appearance => SortOrder::Appearance,
            SortArg::Total => SortOrder::Total,
            SortArg::Name => SortOrder::Name,
        }
    }
}

fn init_logging(verbose: u8) {
    // RUST_LOG wins when set, otherwise only this workspace's crates log
    let mut builder = if std::env::var("RUST_LOG").is_ok() {
        env_logger::Builder::from_default_env()
    } else {
        let level = match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };
        let mut builder = env_logger::Builder::new();
        builder
            .filter_module("spread_log_parser", level)
            .filter_module("spread_log_analyzer", level);
        builder
    };
    builder.init();
}

fn read_report(log_file: Option<&PathBuf>, options: &ParseOptions) -> Result<AnalysisReport> {
    match log_file {
        Some(path) if path.as_os_str() != "-" => analyze_file(path, options)
            .with_context(|| format!("Failed to analyze {}", path.display())),
        _ => {
            log::info!("Reading log from stdin");
            analyze_reader(io::stdin().lock(), options).context("Failed to analyze stdin")
        }
    }
}

fn render(report: &AnalysisReport, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        out.push('\n');
        Ok(out)
    } else {
        Ok(format_summary(report))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load();
    let options = if cli.raw {
        ParseOptions::default()
    } else {
        config.parse_options()
    };
    let sort = cli.sort.map(SortOrder::from).unwrap_or(config.sort);

    let report = read_report(cli.log_file.as_ref(), &options)?;
    log::info!("Found {} tests", report.len());

    print!("{}", render(&report.sorted_by(sort), cli.json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::parse_from(["spread-log-analyzer", "spread.log", "--sort", "total", "-vv"]);
        assert_eq!(cli.log_file, Some(PathBuf::from("spread.log")));
        assert!(matches!(cli.sort, Some(SortArg::Total)));
        assert_eq!(cli.verbose, 2);
        assert!(!cli.json);
        assert!(!cli.raw);
    }

    #[test]
    fn test_render_empty_report() {
        let out = render(&AnalysisReport::new(), false).unwrap();
        assert!(out.contains("No test execution data found"));

        let json = render(&AnalysisReport::new(), true).unwrap();
        assert_eq!(json, "{\n  \"tests\": []\n}\n");
    }
}
