//! Scores worker responses against the task.

use std::pin::pin;

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::instructions::EVALUATOR_INSTRUCTION;
use crate::domain::models::{EvaluationResult, PromptCandidate, Response, TaskDescription, UseCase};
use crate::services::model_invoker::ModelInvoker;

pub struct Evaluator {
    invoker: ModelInvoker,
    model: String,
    concurrency: usize,
}

impl Evaluator {
    /// Sequential evaluator: one call at a time, in input order.
    pub fn new(invoker: ModelInvoker, model: impl Into<String>) -> Self {
        Self {
            invoker,
            model: model.into(),
            concurrency: 1,
        }
    }

    /// Allow up to `concurrency` evaluations in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Score one response.
    pub async fn evaluate(
        &self,
        task: &TaskDescription,
        prompt: &PromptCandidate,
        use_case: &UseCase,
        response: &Response,
    ) -> DomainResult<EvaluationResult> {
        let user = evaluation_request(task, prompt, use_case, response);
        self.invoker
            .invoke_structured(&self.model, EVALUATOR_INSTRUCTION, &user)
            .await
    }

    /// Score every (use case, response) pair.
    ///
    /// Results come back in input order. `on_scored` is called with each
    /// result's index as soon as it is available in that order. The first
    /// failure aborts the remaining evaluations.
    #[instrument(skip_all, fields(model = %self.model, count = responses.len(), concurrency = self.concurrency))]
    pub async fn evaluate_all<F>(
        &self,
        task: &TaskDescription,
        prompt: &PromptCandidate,
        use_cases: &[UseCase],
        responses: &[Response],
        mut on_scored: F,
    ) -> DomainResult<Vec<EvaluationResult>>
    where
        F: FnMut(usize, &EvaluationResult),
    {
        if use_cases.len() != responses.len() {
            return Err(DomainError::ExecutionFailed(format!(
                "{} use cases but {} responses",
                use_cases.len(),
                responses.len()
            )));
        }

        let mut scored = pin!(stream::iter(use_cases.iter().zip(responses).enumerate())
            .map(|(index, (use_case, response))| async move {
                self.evaluate(task, prompt, use_case, response)
                    .await
                    .map(|result| (index, result))
            })
            .buffered(self.concurrency));

        let mut results = Vec::with_capacity(responses.len());
        while let Some((index, result)) = scored.try_next().await? {
            debug!(index, score = %result.quality_score, "response evaluated");
            on_scored(index, &result);
            results.push(result);
        }
        Ok(results)
    }
}

/// User content for one evaluation: the four context strings, verbatim.
fn evaluation_request(
    task: &TaskDescription,
    prompt: &PromptCandidate,
    use_case: &UseCase,
    response: &Response,
) -> String {
    format!(
        "**Original Task Description:**\n{task}\n\n\
         **Prompt Being Tested:**\n{prompt}\n\n\
         **Use Case (Input):**\n{use_case}\n\n\
         **Generated Response:**\n{response}",
        prompt = prompt.text,
        use_case = use_case.as_str(),
        response = response.as_str(),
    )
}
