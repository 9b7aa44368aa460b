use serde::{Deserialize, Serialize};
use spread_log_parser::{ParseOptions, SortOrder};
use std::{env, path::PathBuf};

const CONFIG_FILE: &str = "spread-log-analyzer.toml";

/// Analyzer configuration loaded from spread-log-analyzer.toml
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_strip_ansi")]
    pub strip_ansi: bool,
    #[serde(default = "default_strip_runner_timestamp")]
    pub strip_runner_timestamp: bool,
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_strip_ansi() -> bool {
    true
}

fn default_strip_runner_timestamp() -> bool {
    true // Logs downloaded from GitHub Actions carry a runner timestamp per line
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strip_ansi: default_strip_ansi(),
            strip_runner_timestamp: default_strip_runner_timestamp(),
            sort: SortOrder::default(),
        }
    }
}

impl Config {
    /// Load config from CWD first, then home directory, or use defaults
    pub fn load() -> Self {
        // Try current directory first
        if let Some(config) = Self::load_from(PathBuf::from(CONFIG_FILE)) {
            return config;
        }

        // Try home directory
        if let Some(home) = env::var_os("HOME") {
            let home_config = PathBuf::from(home).join(format!(".{}", CONFIG_FILE));
            if let Some(config) = Self::load_from(home_config) {
                return config;
            }
        }

        log::debug!("Using default config");
        Self::default()
    }

    fn load_from(path: PathBuf) -> Option<Self> {
        let content = std::fs::read_to_string(&path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                log::debug!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(err) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), err);
                None
            }
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strip_ansi: self.strip_ansi,
            strip_runner_timestamp: self.strip_runner_timestamp,
        }
    }
}
