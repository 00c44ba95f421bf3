pub mod chat;
pub mod config;
pub mod contracts;
pub mod feedback;
pub mod instructions;
pub mod outcome;
pub mod prompt;

pub use chat::{ChatMessage, ChatRequest, ChatRole, ResponseSchema};
pub use config::{
    BackendConfig, Config, LoggingConfig, ModelRoles, PipelineConfig, RateLimitConfig,
    RetryConfig,
};
pub use contracts::{EvaluationResult, QualityScore, StructuredOutput, UseCases};
pub use feedback::AggregatedFeedback;
pub use outcome::{IterationRecord, RunEvent, RunOutcome, RunReport};
pub use prompt::{PromptCandidate, Response, TaskDescription, UseCase};
