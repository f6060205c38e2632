use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::domain::models::config::Config;
use crate::domain::models::Category;

/// Project directory holding `config.yaml` and `local.yaml`
pub const CONFIG_DIR: &str = ".flaketrace";

/// Prefix for environment overrides, `__` separates nesting
pub const ENV_PREFIX: &str = "FLAKETRACE_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Run directory prefix cannot be empty")]
    EmptyRunDirPrefix,

    #[error("At least one log file extension is required")]
    EmptyLogExtensions,

    #[error("Invalid snippet_max_chars: {0}. Must be at least 1")]
    InvalidSnippetLength(usize),

    #[error("Recommendation override for {0} is empty")]
    EmptyRecommendations(Category),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration relative to the current directory
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .flaketrace/config.yaml
    /// 3. .flaketrace/local.yaml (optional local overrides)
    /// 4. Environment variables (FLAKETRACE_* prefix)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(Path::new("."))
    }

    /// Same as [`load`](Self::load) with the project rooted at `project_dir`
    pub fn load_from_dir(project_dir: &Path) -> Result<Config> {
        let config_dir = project_dir.join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_dir.join("config.yaml")))
            .merge(Yaml::file(config_dir.join("local.yaml")))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file instead of the project files
    ///
    /// Environment overrides still apply.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let analysis = &config.analysis;
        if analysis.run_dir_prefix.trim().is_empty() {
            return Err(ConfigError::EmptyRunDirPrefix);
        }

        if analysis.log_extensions.is_empty() {
            return Err(ConfigError::EmptyLogExtensions);
        }

        if let Some(bad) = analysis
            .log_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "log extension '{bad}' must be non-empty and given without a leading dot"
            )));
        }

        if analysis.snippet_max_chars == 0 {
            return Err(ConfigError::InvalidSnippetLength(0));
        }

        for (category, lines) in &config.recommendations {
            if lines.is_empty() || lines.iter().all(|l| l.trim().is_empty()) {
                return Err(ConfigError::EmptyRecommendations(*category));
            }
        }

        Ok(())
    }
}
