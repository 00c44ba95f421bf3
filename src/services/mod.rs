//! Application services for the optimization loop.

pub mod aggregator;
pub mod convergence_controller;
pub mod evaluator;
pub mod model_invoker;
pub mod prompt_crafter;
pub mod refinement_engine;
pub mod use_case_generator;
pub mod worker_runner;

pub use aggregator::aggregate;
pub use convergence_controller::{ControllerState, ConvergenceController, LoopSettings};
pub use evaluator::Evaluator;
pub use model_invoker::ModelInvoker;
pub use prompt_crafter::PromptCrafter;
pub use refinement_engine::RefinementEngine;
pub use use_case_generator::UseCaseGenerator;
pub use worker_runner::WorkerRunner;
