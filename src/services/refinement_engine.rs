//! Rewrites an underperforming prompt from aggregated feedback.

use tracing::{info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::instructions::REFINER_INSTRUCTION;
use crate::domain::models::{AggregatedFeedback, PromptCandidate, TaskDescription};
use crate::services::model_invoker::ModelInvoker;

pub struct RefinementEngine {
    invoker: ModelInvoker,
    model: String,
}

impl RefinementEngine {
    pub fn new(invoker: ModelInvoker, model: impl Into<String>) -> Self {
        Self {
            invoker,
            model: model.into(),
        }
    }

    /// Produce the successor of `underperforming`.
    #[instrument(skip_all, fields(model = %self.model, from_version = underperforming.version))]
    pub async fn refine(
        &self,
        task: &TaskDescription,
        underperforming: &PromptCandidate,
        feedback: &AggregatedFeedback,
    ) -> DomainResult<PromptCandidate> {
        let user = refinement_request(task, underperforming, feedback);
        let text = self
            .invoker
            .invoke_text(&self.model, REFINER_INSTRUCTION, &user)
            .await?;

        let refined = underperforming.successor(text);
        info!(version = refined.version, "prompt refined");
        Ok(refined)
    }
}

fn refinement_request(
    task: &TaskDescription,
    prompt: &PromptCandidate,
    feedback: &AggregatedFeedback,
) -> String {
    format!(
        "**Original Task Description:**\n{task}\n\n\
         **Underperforming Prompt (v{version}):**\n{text}\n\n\
         **Aggregated Feedback (Pros & Cons):**\n{summary}\n\n\
         Based on the feedback, please generate an improved version of the prompt.",
        version = prompt.version,
        text = prompt.text,
        summary = feedback.summary(),
    )
}
