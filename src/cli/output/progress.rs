//! Progress display using indicatif for terminal output
//!
//! A single spinner tracks the optimization run. It is driven by the
//! controller's [`RunEvent`] stream so the services stay free of any
//! terminal concerns.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::cli::output::truncate;
use crate::domain::models::RunEvent;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const USE_CASE_PREVIEW_CHARS: usize = 120;

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);

    /// Finish with a warning message (yellow !)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", style("✓").green(), message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", style("✗").red(), message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", style("!").yellow(), message.into()));
    }
}

/// Render run events on `spinner` until the sending side is dropped.
///
/// With `narrate` off only the spinner message changes; with it on, use
/// cases, scores and feedback are printed above the spinner as they arrive.
pub fn spawn_event_renderer(
    mut events: mpsc::UnboundedReceiver<RunEvent>,
    spinner: ProgressBar,
    narrate: bool,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        spinner.set_message("Crafting initial prompt...");
        while let Some(event) = events.recv().await {
            if let Some(message) = status_line(&event) {
                spinner.set_message(message);
            }
            if narrate {
                if let Some(text) = narration(&event) {
                    spinner.println(text);
                }
            }
        }
    })
}

/// Spinner message for an event, if it changes what the run is doing.
fn status_line(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::PromptCrafted(_) => Some("Generating use cases...".to_string()),
        RunEvent::IterationStarted {
            iteration,
            max_iterations,
        } => Some(format!(
            "Iteration {iteration}/{max_iterations}: running worker model..."
        )),
        RunEvent::ResponsesCollected { iteration, count } => Some(format!(
            "Iteration {iteration}: evaluating {count} responses..."
        )),
        RunEvent::FeedbackAggregated { iteration, .. } => {
            Some(format!("Iteration {iteration}: checking quality gate..."))
        }
        RunEvent::PromptRefined(prompt) => {
            Some(format!("Prompt v{} ready", prompt.version))
        }
        RunEvent::UseCasesGenerated(_) | RunEvent::UseCaseScored { .. } => None,
    }
}

/// Text printed above the spinner for an event.
fn narration(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::PromptCrafted(prompt) => Some(format!(
            "{}\n{}\n",
            style(format!("Initial prompt (v{})", prompt.version)).cyan().bold(),
            prompt.text
        )),
        RunEvent::UseCasesGenerated(use_cases) => {
            let list = use_cases
                .iter()
                .map(|uc| format!("- {}", truncate(uc.as_str(), USE_CASE_PREVIEW_CHARS)))
                .collect::<Vec<_>>()
                .join("\n");
            Some(format!(
                "{}\n{list}\n",
                style(format!("{} use cases", use_cases.len())).magenta().bold()
            ))
        }
        RunEvent::IterationStarted {
            iteration,
            max_iterations,
        } => Some(
            style(format!("── Iteration {iteration}/{max_iterations} ──"))
                .green()
                .bold()
                .to_string(),
        ),
        RunEvent::ResponsesCollected { count, .. } => {
            Some(format!("Generated {count} responses for evaluation."))
        }
        RunEvent::UseCaseScored { index, score, .. } => Some(format!(
            "Evaluation for use case #{} complete. Score: {score:.1}/10",
            index + 1
        )),
        RunEvent::FeedbackAggregated { feedback, .. } => Some(format!(
            "{}\n{}\n",
            style("Aggregated feedback").yellow().bold(),
            feedback.summary()
        )),
        RunEvent::PromptRefined(prompt) => Some(format!(
            "{}\n{}\n",
            style(format!("Improved prompt (v{})", prompt.version)).cyan().bold(),
            prompt.text
        )),
    }
}
