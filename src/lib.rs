//! Promptloop - Self-Improving Prompt Optimizer
//!
//! Promptloop drafts a prompt from a task description, exercises it against a
//! frozen set of generated use cases, scores every response with an evaluator
//! model, and rewrites the prompt from the aggregated critique until the mean
//! score reaches a quality threshold or the iteration budget runs out.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, structured-output contracts, errors and the model backend port
//! - **Service Layer** (`services`): Crafting, generation, worker pool, evaluation, aggregation, refinement and the convergence controller
//! - **Infrastructure Layer** (`infrastructure`): OpenRouter client, configuration, logging, credentials
//! - **Adapters** (`adapters`): Scripted in-memory backend used by tests
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use promptloop::{Config, ConvergenceController};
//!
//! async fn optimize(backend: Arc<dyn promptloop::ModelBackend>) -> anyhow::Result<()> {
//!     let controller = ConvergenceController::new(backend, &Config::default());
//!     let report = controller.run("Summarize support tickets in two sentences").await?;
//!     println!("{}", report.outcome.prompt().text);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    AggregatedFeedback, Config, EvaluationResult, IterationRecord, PromptCandidate, QualityScore,
    RunEvent, RunOutcome, RunReport, TaskDescription, UseCase,
};
pub use domain::ports::ModelBackend;
pub use domain::{DomainError, DomainResult, RunError, RunPhase};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{ConvergenceController, LoopSettings};
