use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::failure::Category;

/// Main configuration structure for flaketrace
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Run discovery and extraction settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Per-category replacements for the built-in remediation advice
    #[serde(default)]
    pub recommendations: BTreeMap<Category, Vec<String>>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Rotation for file logs: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Run discovery and failure extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AnalysisConfig {
    /// Prefix that marks a subdirectory as one run
    #[serde(default = "default_run_dir_prefix")]
    pub run_dir_prefix: String,

    /// File extensions recognised as build logs
    #[serde(default = "default_log_extensions")]
    pub log_extensions: Vec<String>,

    /// Maximum characters kept per error snippet
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
}

fn default_run_dir_prefix() -> String {
    "run".to_string()
}

fn default_log_extensions() -> Vec<String> {
    vec!["log".to_string(), "txt".to_string()]
}

const fn default_snippet_max_chars() -> usize {
    200
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            run_dir_prefix: default_run_dir_prefix(),
            log_extensions: default_log_extensions(),
            snippet_max_chars: default_snippet_max_chars(),
        }
    }
}
