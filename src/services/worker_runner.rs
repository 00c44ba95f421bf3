//! Parallel worker runner.
//!
//! Exercises one prompt candidate against every use case through a bounded
//! pool of tokio tasks. Output position `i` always holds the response to
//! input position `i`, whatever order the tasks finish in.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, instrument};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{PromptCandidate, Response, UseCase};
use crate::services::model_invoker::ModelInvoker;

pub struct WorkerRunner {
    invoker: ModelInvoker,
    model: String,
    pool_size: usize,
}

impl WorkerRunner {
    /// `pool_size` is clamped to at least one slot.
    pub fn new(invoker: ModelInvoker, model: impl Into<String>, pool_size: usize) -> Self {
        Self {
            invoker,
            model: model.into(),
            pool_size: pool_size.max(1),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Run `prompt` as the system instruction against each use case.
    ///
    /// The first failing slot aborts every task still pending or running and
    /// fails the whole batch.
    #[instrument(skip_all, fields(model = %self.model, version = prompt.version, use_cases = use_cases.len()))]
    pub async fn run(
        &self,
        prompt: &PromptCandidate,
        use_cases: &[UseCase],
    ) -> DomainResult<Vec<Response>> {
        let semaphore = Arc::new(Semaphore::new(self.pool_size));
        let system: Arc<str> = Arc::from(prompt.text.as_str());
        let mut tasks = JoinSet::new();

        for (index, use_case) in use_cases.iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let invoker = self.invoker.clone();
            let model = self.model.clone();
            let system = Arc::clone(&system);
            let input = use_case.0.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| DomainError::ExecutionFailed("worker pool closed".to_string()))?;
                debug!(index, "worker slot started");
                let text = invoker.invoke_text(&model, &system, &input).await?;
                Ok::<_, DomainError>((index, Response(text)))
            });
        }

        let mut slots: Vec<Option<Response>> = vec![None; use_cases.len()];
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined
                .map_err(|e| DomainError::ExecutionFailed(format!("worker task failed: {e}")))
                .and_then(|result| result);

            match outcome {
                Ok((index, response)) => slots[index] = Some(response),
                Err(err) => {
                    error!(error = %err, "worker slot failed, aborting batch");
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        let responses = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| {
                    DomainError::ExecutionFailed(format!("worker slot {index} produced no response"))
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        info!(count = responses.len(), "worker responses collected");
        Ok(responses)
    }
}
