//! Implementation of the `promptloop run` command.

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::info;

use crate::cli::output::progress::{create_spinner, spawn_event_renderer, ProgressBarExt};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{Config, RunOutcome, RunReport};
use crate::domain::ports::ModelBackend;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::credentials::ApiKey;
use crate::infrastructure::openrouter::{OpenRouterClient, OpenRouterConfig};
use crate::services::ConvergenceController;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// File holding the task description
    #[arg(short, long, default_value = "input.txt")]
    pub input: PathBuf,

    /// Where the final prompt is written
    #[arg(short, long, default_value = "output.txt")]
    pub output: PathBuf,

    /// Number of use cases to generate
    #[arg(short = 'n', long, value_name = "N")]
    pub use_cases: Option<usize>,

    /// Mean score required to stop (1.0-10.0)
    #[arg(short, long, value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Maximum number of evaluate/refine iterations
    #[arg(short, long, value_name = "N")]
    pub max_iterations: Option<u32>,

    /// Worker pool size (0 = available parallelism)
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Score responses concurrently
    #[arg(long)]
    pub parallel_evaluation: bool,
}

impl RunArgs {
    /// Command-line flags take precedence over every configuration source.
    pub fn apply_overrides(&self, config: &mut Config) {
        let pipeline = &mut config.pipeline;
        if let Some(count) = self.use_cases {
            pipeline.use_case_count = count;
        }
        if let Some(threshold) = self.threshold {
            pipeline.quality_threshold = threshold;
        }
        if let Some(max_iterations) = self.max_iterations {
            pipeline.max_iterations = max_iterations;
        }
        if let Some(concurrency) = self.concurrency {
            pipeline.max_concurrency = concurrency;
        }
        if self.parallel_evaluation {
            pipeline.parallel_evaluation = true;
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    #[serde(flatten)]
    pub report: RunReport,
    pub quality_threshold: f64,
    pub output_path: PathBuf,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let outcome = &self.report.outcome;
        let mut lines = Vec::new();

        lines.push(
            TableFormatter::new()
                .format_iterations(&self.report.iterations, Some(self.quality_threshold)),
        );
        lines.push(String::new());

        let heading = match outcome {
            RunOutcome::Converged { .. } => style(format!(
                "Final optimized prompt (v{}, score {:.2})",
                outcome.prompt().version,
                outcome.mean_score()
            ))
            .green()
            .bold(),
            RunOutcome::Capped { .. } => style(format!(
                "Final prompt, threshold not met (v{}, score {:.2})",
                outcome.prompt().version,
                outcome.mean_score()
            ))
            .red()
            .bold(),
        };
        lines.push(heading.to_string());
        lines.push(outcome.prompt().text.clone());
        lines.push(String::new());

        let saved = match outcome {
            RunOutcome::Converged { iterations, .. } => style(format!(
                "✓ Quality threshold {:.2} met after {iterations} iteration(s). Final prompt saved to {}",
                self.quality_threshold,
                self.output_path.display()
            ))
            .green(),
            RunOutcome::Capped { iterations, .. } => style(format!(
                "! Max iterations ({iterations}) reached without meeting {:.2}. Final prompt saved to {}",
                self.quality_threshold,
                self.output_path.display()
            ))
            .yellow(),
        };
        lines.push(saved.to_string());

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: RunArgs, mut config: Config, json_mode: bool) -> Result<()> {
    args.apply_overrides(&mut config);
    ConfigLoader::validate(&config).context("Invalid run settings")?;

    let task = read_task(&args.input).await?;

    let api_key = ApiKey::from_env(&config.backend.api_key_env)?;
    let client = OpenRouterClient::new(OpenRouterConfig::from_config(&config, api_key))
        .context("Failed to build model backend client")?;

    execute_with_backend(&args, &config, Arc::new(client), &task, json_mode).await
}

/// Run the loop against `backend`, write the artifact and print the result.
///
/// Nothing is written when the run fails.
pub async fn execute_with_backend(
    args: &RunArgs,
    config: &Config,
    backend: Arc<dyn ModelBackend>,
    task: &str,
    json_mode: bool,
) -> Result<()> {
    let report = optimize(backend, config, task, json_mode).await?;

    write_artifact(&args.output, &report.outcome.prompt().text).await?;
    info!(path = %args.output.display(), "final prompt saved");

    let result = RunOutput {
        report,
        quality_threshold: config.pipeline.quality_threshold,
        output_path: args.output.clone(),
    };
    output(&result, json_mode);
    Ok(())
}

async fn optimize(
    backend: Arc<dyn ModelBackend>,
    config: &Config,
    task: &str,
    json_mode: bool,
) -> Result<RunReport> {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = ConvergenceController::new(backend, config).with_events(tx);

    let spinner = if json_mode {
        indicatif::ProgressBar::hidden()
    } else {
        create_spinner()
    };
    let renderer = spawn_event_renderer(rx, spinner.clone(), !json_mode);

    let result = controller.run(task).await;
    drop(controller);
    renderer.await.context("Progress renderer failed")?;

    match result {
        Ok(report) => {
            match &report.outcome {
                RunOutcome::Converged { mean_score, .. } => {
                    spinner.finish_success(format!("Converged with mean score {mean_score:.2}"));
                }
                RunOutcome::Capped { mean_score, .. } => {
                    spinner.finish_warning(format!("Stopped at mean score {mean_score:.2}"));
                }
            }
            Ok(report)
        }
        Err(err) => {
            spinner.finish_error(format!("Run failed during {}", err.phase));
            Err(err.into())
        }
    }
}

async fn read_task(path: &Path) -> Result<String> {
    let task = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read task description from {}", path.display()))?;
    if task.trim().is_empty() {
        anyhow::bail!("Task description file {} is empty", path.display());
    }
    Ok(task)
}

async fn write_artifact(path: &Path, prompt: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, prompt)
        .await
        .with_context(|| format!("Failed to write final prompt to {}", path.display()))
}
