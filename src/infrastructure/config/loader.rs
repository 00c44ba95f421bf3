use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project-local configuration directory
pub const CONFIG_DIR: &str = ".promptloop";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid use_case_count: {0}. Must be at least 1")]
    InvalidUseCaseCount(usize),

    #[error("Invalid max_iterations: {0}. Must be at least 1")]
    InvalidMaxIterations(u32),

    #[error("Invalid quality_threshold: {0}. Must be between 1.0 and 10.0")]
    InvalidQualityThreshold(f64),

    #[error("Model for role '{0}' cannot be empty")]
    EmptyModel(&'static str),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 2.0")]
    InvalidTemperature(f32),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Backend base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Backend api_key_env cannot be empty")]
    EmptyApiKeyEnv,

    #[error("Invalid rate limit: {0}. Must be positive")]
    InvalidRateLimit(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error(
        "Invalid backoff configuration: initial_backoff_ms ({0}) must not exceed max_backoff_ms ({1})"
    )]
    InvalidBackoff(u64, u64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .promptloop/config.yaml (project config, created by init)
    /// 3. .promptloop/local.yaml (project local overrides, optional)
    /// 4. Environment variables (PROMPTLOOP_* prefix, `__` for nesting)
    /// 5. An explicit file passed with `--config`, if any
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let mut figment = Self::base_figment();
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file on top of the defaults only
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.as_ref().display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn base_figment() -> Figment {
        let dir = Path::new(CONFIG_DIR);
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("PROMPTLOOP_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let pipeline = &config.pipeline;
        if pipeline.use_case_count == 0 {
            return Err(ConfigError::InvalidUseCaseCount(pipeline.use_case_count));
        }
        if pipeline.max_iterations == 0 {
            return Err(ConfigError::InvalidMaxIterations(pipeline.max_iterations));
        }
        if !(1.0..=10.0).contains(&pipeline.quality_threshold) {
            return Err(ConfigError::InvalidQualityThreshold(
                pipeline.quality_threshold,
            ));
        }

        let models = &config.models;
        for (role, model) in [
            ("crafter", &models.crafter),
            ("use_case_generator", &models.use_case_generator),
            ("worker", &models.worker),
            ("evaluator", &models.evaluator),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::EmptyModel(role));
            }
        }

        let backend = &config.backend;
        if backend.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }
        if backend.api_key_env.trim().is_empty() {
            return Err(ConfigError::EmptyApiKeyEnv);
        }
        if !(0.0..=2.0).contains(&backend.temperature) {
            return Err(ConfigError::InvalidTemperature(backend.temperature));
        }
        if backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(backend.timeout_secs));
        }

        let rps = config.rate_limit.requests_per_second;
        if rps.is_nan() || rps <= 0.0 {
            return Err(ConfigError::InvalidRateLimit(rps));
        }

        if config.retry.initial_backoff_ms > config.retry.max_backoff_ms {
            return Err(ConfigError::InvalidBackoff(
                config.retry.initial_backoff_ms,
                config.retry.max_backoff_ms,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}
