//! Terminal outcome of a run, the per-iteration record kept alongside it,
//! and the progress events published while the loop is running.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::feedback::AggregatedFeedback;
use super::prompt::{PromptCandidate, TaskDescription, UseCase};

/// How a run ended. Both variants carry the prompt that gets persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The quality gate was met.
    Converged {
        prompt: PromptCandidate,
        mean_score: f64,
        iterations: u32,
    },
    /// The iteration budget ran out before the gate was met.
    Capped {
        prompt: PromptCandidate,
        mean_score: f64,
        iterations: u32,
    },
}

impl RunOutcome {
    pub fn prompt(&self) -> &PromptCandidate {
        match self {
            Self::Converged { prompt, .. } | Self::Capped { prompt, .. } => prompt,
        }
    }

    pub fn mean_score(&self) -> f64 {
        match self {
            Self::Converged { mean_score, .. } | Self::Capped { mean_score, .. } => *mean_score,
        }
    }

    pub fn iterations(&self) -> u32 {
        match self {
            Self::Converged { iterations, .. } | Self::Capped { iterations, .. } => *iterations,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Self::Converged { .. })
    }
}

/// Summary of one evaluate/gate pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub prompt_version: u32,
    /// Scores in use-case order
    pub scores: Vec<f64>,
    pub mean_score: f64,
    pub distinct_pros: usize,
    pub distinct_cons: usize,
}

/// Everything a caller may want to show or serialize about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub task: TaskDescription,
    pub use_cases: Vec<UseCase>,
    pub iterations: Vec<IterationRecord>,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Progress notifications emitted by the convergence controller.
#[derive(Debug, Clone)]
pub enum RunEvent {
    PromptCrafted(PromptCandidate),
    UseCasesGenerated(Vec<UseCase>),
    IterationStarted { iteration: u32, max_iterations: u32 },
    ResponsesCollected { iteration: u32, count: usize },
    UseCaseScored { iteration: u32, index: usize, score: f64 },
    FeedbackAggregated { iteration: u32, feedback: AggregatedFeedback },
    PromptRefined(PromptCandidate),
}
