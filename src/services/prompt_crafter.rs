//! Drafts the first prompt candidate from the task description.

use tracing::{info, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::instructions::CRAFTER_INSTRUCTION;
use crate::domain::models::{PromptCandidate, TaskDescription};
use crate::services::model_invoker::ModelInvoker;

pub struct PromptCrafter {
    invoker: ModelInvoker,
    model: String,
}

impl PromptCrafter {
    pub fn new(invoker: ModelInvoker, model: impl Into<String>) -> Self {
        Self {
            invoker,
            model: model.into(),
        }
    }

    /// Produce prompt v1. The task description is sent as-is.
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn craft(&self, task: &TaskDescription) -> DomainResult<PromptCandidate> {
        let text = self
            .invoker
            .invoke_text(&self.model, CRAFTER_INSTRUCTION, task.as_str())
            .await?;

        info!(chars = text.len(), "initial prompt crafted");
        Ok(PromptCandidate::initial(text))
    }
}
