//! Convergence controller.
//!
//! Drives one optimization run:
//!
//! ```text
//! Init -> Generating -> Evaluating -> Gate -+-> Converged
//!                           ^               +-> Capped
//!                           +-- Refining <--+
//! ```
//!
//! The prompt and the use cases are produced once in `Generating`; the use
//! cases are then frozen for the rest of the run. Any failure aborts the run
//! with a [`RunError`] naming the phase it came from.

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::domain::errors::{DomainResult, RunError, RunPhase};
use crate::domain::models::{
    AggregatedFeedback, Config, IterationRecord, PromptCandidate, RunEvent, RunOutcome, RunReport,
    TaskDescription, UseCase,
};
use crate::domain::ports::ModelBackend;
use crate::services::aggregator::aggregate;
use crate::services::evaluator::Evaluator;
use crate::services::model_invoker::ModelInvoker;
use crate::services::prompt_crafter::PromptCrafter;
use crate::services::refinement_engine::RefinementEngine;
use crate::services::use_case_generator::UseCaseGenerator;
use crate::services::worker_runner::WorkerRunner;

/// Where the controller is in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Init,
    Generating,
    Evaluating { iteration: u32 },
    Gate { iteration: u32 },
    Refining { iteration: u32 },
    Converged,
    Capped,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Generating => f.write_str("generating"),
            Self::Evaluating { iteration } => write!(f, "evaluating#{iteration}"),
            Self::Gate { iteration } => write!(f, "gate#{iteration}"),
            Self::Refining { iteration } => write!(f, "refining#{iteration}"),
            Self::Converged => f.write_str("converged"),
            Self::Capped => f.write_str("capped"),
        }
    }
}

/// Loop sizing and quality gate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    pub use_case_count: usize,
    pub quality_threshold: f64,
    pub max_iterations: u32,
}

impl LoopSettings {
    /// Decide what follows the evaluation of `iteration`.
    pub fn gate(&self, iteration: u32, mean_score: f64) -> ControllerState {
        if mean_score >= self.quality_threshold {
            ControllerState::Converged
        } else if iteration >= self.max_iterations {
            ControllerState::Capped
        } else {
            ControllerState::Refining { iteration }
        }
    }
}

pub struct ConvergenceController {
    crafter: PromptCrafter,
    use_case_generator: UseCaseGenerator,
    worker_runner: WorkerRunner,
    evaluator: Evaluator,
    refiner: RefinementEngine,
    settings: LoopSettings,
    events: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl ConvergenceController {
    /// Wire every role to `backend` using the models and pipeline settings
    /// from `config`.
    pub fn new(backend: Arc<dyn ModelBackend>, config: &Config) -> Self {
        let invoker = ModelInvoker::new(backend, config.backend.temperature);
        let models = &config.models;
        let pipeline = &config.pipeline;
        let pool_size = pipeline.worker_pool_size();

        let evaluator = Evaluator::new(invoker.clone(), &models.evaluator);
        let evaluator = if pipeline.parallel_evaluation {
            evaluator.with_concurrency(pool_size)
        } else {
            evaluator
        };

        Self {
            crafter: PromptCrafter::new(invoker.clone(), &models.crafter),
            use_case_generator: UseCaseGenerator::new(invoker.clone(), &models.use_case_generator),
            worker_runner: WorkerRunner::new(invoker.clone(), &models.worker, pool_size),
            evaluator,
            refiner: RefinementEngine::new(invoker, &models.crafter),
            settings: LoopSettings {
                use_case_count: pipeline.use_case_count,
                quality_threshold: pipeline.quality_threshold,
                max_iterations: pipeline.max_iterations,
            },
            events: None,
        }
    }

    /// Publish progress on `sender`. A dropped receiver is ignored.
    pub fn with_events(mut self, sender: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    /// Optimize a prompt for `task` until it converges or the iteration
    /// budget runs out.
    pub async fn run(&self, task: &str) -> Result<RunReport, RunError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("optimization_run", %run_id);
        self.run_inner(run_id, task).instrument(span).await
    }

    async fn run_inner(&self, run_id: Uuid, raw_task: &str) -> Result<RunReport, RunError> {
        let started_at = Utc::now();

        transition(ControllerState::Init);
        let task = TaskDescription::new(raw_task).map_err(|e| e.in_phase(RunPhase::Init))?;

        transition(ControllerState::Generating);
        let (mut prompt, use_cases) = self
            .generate(&task)
            .await
            .map_err(|e| e.in_phase(RunPhase::Generating))?;

        let mut records = Vec::new();
        let mut iteration = 1;
        let outcome = loop {
            transition(ControllerState::Evaluating { iteration });
            let (feedback, record) = self
                .evaluate_iteration(&task, &prompt, &use_cases, iteration)
                .await
                .map_err(|e| e.in_phase(RunPhase::Evaluating))?;
            records.push(record);

            transition(ControllerState::Gate { iteration });
            let mean_score = feedback.mean_score;
            match self.settings.gate(iteration, mean_score) {
                ControllerState::Converged => {
                    transition(ControllerState::Converged);
                    info!(
                        mean_score,
                        threshold = self.settings.quality_threshold,
                        iteration,
                        "quality threshold met"
                    );
                    break RunOutcome::Converged {
                        prompt,
                        mean_score,
                        iterations: iteration,
                    };
                }
                ControllerState::Capped => {
                    transition(ControllerState::Capped);
                    warn!(
                        mean_score,
                        threshold = self.settings.quality_threshold,
                        "max iterations reached without meeting threshold"
                    );
                    break RunOutcome::Capped {
                        prompt,
                        mean_score,
                        iterations: iteration,
                    };
                }
                next => {
                    transition(next);
                    info!(
                        mean_score,
                        threshold = self.settings.quality_threshold,
                        "below threshold, refining prompt"
                    );
                    prompt = self
                        .refiner
                        .refine(&task, &prompt, &feedback)
                        .await
                        .map_err(|e| e.in_phase(RunPhase::Refining))?;
                    self.emit(RunEvent::PromptRefined(prompt.clone()));
                    iteration += 1;
                }
            }
        };

        Ok(RunReport {
            run_id,
            task,
            use_cases,
            iterations: records,
            outcome,
            started_at,
            finished_at: Utc::now(),
        })
    }

    async fn generate(
        &self,
        task: &TaskDescription,
    ) -> DomainResult<(PromptCandidate, Vec<UseCase>)> {
        let prompt = self.crafter.craft(task).await?;
        self.emit(RunEvent::PromptCrafted(prompt.clone()));

        let use_cases = self
            .use_case_generator
            .generate(task, self.settings.use_case_count)
            .await?;
        self.emit(RunEvent::UseCasesGenerated(use_cases.clone()));

        Ok((prompt, use_cases))
    }

    async fn evaluate_iteration(
        &self,
        task: &TaskDescription,
        prompt: &PromptCandidate,
        use_cases: &[UseCase],
        iteration: u32,
    ) -> DomainResult<(AggregatedFeedback, IterationRecord)> {
        self.emit(RunEvent::IterationStarted {
            iteration,
            max_iterations: self.settings.max_iterations,
        });

        let responses = self.worker_runner.run(prompt, use_cases).await?;
        self.emit(RunEvent::ResponsesCollected {
            iteration,
            count: responses.len(),
        });

        let evaluations = self
            .evaluator
            .evaluate_all(task, prompt, use_cases, &responses, |index, result| {
                self.emit(RunEvent::UseCaseScored {
                    iteration,
                    index,
                    score: result.quality_score.value(),
                });
            })
            .await?;

        let feedback = aggregate(&evaluations)?;
        info!(
            iteration,
            version = prompt.version,
            mean_score = feedback.mean_score,
            pros = feedback.pros.len(),
            cons = feedback.cons.len(),
            "iteration evaluated"
        );
        self.emit(RunEvent::FeedbackAggregated {
            iteration,
            feedback: feedback.clone(),
        });

        let record = IterationRecord {
            iteration,
            prompt_version: prompt.version,
            scores: evaluations
                .iter()
                .map(|e| e.quality_score.value())
                .collect(),
            mean_score: feedback.mean_score,
            distinct_pros: feedback.pros.len(),
            distinct_cons: feedback.cons.len(),
        };
        Ok((feedback, record))
    }

    fn emit(&self, event: RunEvent) {
        if let Some(sender) = &self.events {
            let _ = sender.send(event);
        }
    }
}

fn transition(state: ControllerState) {
    debug!(%state, "controller state");
}
