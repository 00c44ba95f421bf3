use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for promptloop
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Model identifier for each role in the loop
    #[serde(default)]
    pub models: ModelRoles,

    /// Loop sizing and quality gate
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Model backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Role to model-identifier mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ModelRoles {
    /// Drafts the initial prompt and rewrites it during refinement
    #[serde(default = "default_crafter_model")]
    pub crafter: String,

    /// Produces the synthetic use cases
    #[serde(default = "default_use_case_model")]
    pub use_case_generator: String,

    /// Runs the candidate prompt against each use case
    #[serde(default = "default_worker_model")]
    pub worker: String,

    /// Scores each worker response
    #[serde(default = "default_evaluator_model")]
    pub evaluator: String,
}

fn default_crafter_model() -> String {
    "google/gemini-2.5-pro".to_string()
}

fn default_use_case_model() -> String {
    "deepseek/deepseek-chat-v3.1".to_string()
}

fn default_worker_model() -> String {
    "moonshotai/kimi-k2-thinking".to_string()
}

fn default_evaluator_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

impl Default for ModelRoles {
    fn default() -> Self {
        Self {
            crafter: default_crafter_model(),
            use_case_generator: default_use_case_model(),
            worker: default_worker_model(),
            evaluator: default_evaluator_model(),
        }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Number of use cases generated once per run
    #[serde(default = "default_use_case_count")]
    pub use_case_count: usize,

    /// Mean score at or above which the run converges (1.0-10.0)
    #[serde(default = "default_quality_threshold")]
    pub quality_threshold: f64,

    /// Maximum number of evaluate/refine iterations
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Worker pool size; 0 means available parallelism
    #[serde(default)]
    pub max_concurrency: usize,

    /// Score responses concurrently instead of one after another
    #[serde(default)]
    pub parallel_evaluation: bool,
}

const fn default_use_case_count() -> usize {
    5
}

const fn default_quality_threshold() -> f64 {
    9.6
}

const fn default_max_iterations() -> u32 {
    5
}

impl PipelineConfig {
    /// Effective worker pool size.
    pub fn worker_pool_size(&self) -> usize {
        if self.max_concurrency == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_concurrency
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            use_case_count: default_use_case_count(),
            quality_threshold: default_quality_threshold(),
            max_iterations: default_max_iterations(),
            max_concurrency: 0,
            parallel_evaluation: false,
        }
    }
}

/// Model backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Base URL of the OpenAI-compatible chat completions API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Application name sent for attribution
    #[serde(default = "default_app_title")]
    pub app_title: String,
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_timeout_secs() -> u64 {
    300
}

fn default_app_title() -> String {
    "promptloop".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            app_title: default_app_title(),
        }
    }
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

    /// Rotation for file output: daily, hourly, never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
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

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RateLimitConfig {
    /// Requests per second allowed
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: f64,
}

const fn default_requests_per_second() -> f64 {
    10.0
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: default_requests_per_second(),
        }
    }
}

/// Retry policy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RetryConfig {
    /// Maximum number of retry attempts for transient errors (0 disables)
    #[serde(default)]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
        }
    }
}
