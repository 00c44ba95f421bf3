//! Domain errors for the promptloop optimizer.

use std::fmt;

use thiserror::Error;

/// Domain-level errors that can occur while optimizing a prompt.
///
/// None of these are recovered locally: every failure aborts the run so that
/// scoring and refinement never proceed on partial information.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Missing credential, empty task description or invalid settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The backend returned no content for a plain-text invocation.
    #[error("Empty response from model '{model}'")]
    EmptyResponse { model: String },

    /// A structured-output payload was absent, malformed, or broke its contract.
    #[error("Schema validation failed for {contract}: {reason}")]
    SchemaValidation {
        contract: &'static str,
        reason: String,
    },

    /// Transport or HTTP-level failure reported by the model backend.
    #[error("Model backend error: {0}")]
    Backend(String),

    #[error("Cannot aggregate an empty set of evaluations")]
    EmptyAggregation,

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

impl DomainError {
    /// Shorthand for a schema violation on a named contract.
    pub fn schema(contract: &'static str, reason: impl Into<String>) -> Self {
        Self::SchemaValidation {
            contract,
            reason: reason.into(),
        }
    }

    /// Attach the controller phase in which this error surfaced.
    pub fn in_phase(self, phase: RunPhase) -> RunError {
        RunError {
            phase,
            source: self,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Phase of the optimization run, used to report where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Init,
    Generating,
    Evaluating,
    Refining,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Generating => "generating",
            Self::Evaluating => "evaluating",
            Self::Refining => "refining",
        };
        f.write_str(name)
    }
}

/// A run failure, tagged with the phase that produced it.
#[derive(Debug, Error)]
#[error("{phase} phase failed: {source}")]
pub struct RunError {
    pub phase: RunPhase,
    #[source]
    pub source: DomainError,
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::ExecutionFailed(format!("JSON error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_names_phase() {
        let err = DomainError::schema("UseCases", "missing field `use_cases`")
            .in_phase(RunPhase::Generating);

        assert_eq!(err.phase, RunPhase::Generating);
        let message = err.to_string();
        assert!(message.starts_with("generating phase failed"));
        assert!(message.contains("UseCases"));
    }

    #[test]
    fn test_empty_response_mentions_model() {
        let err = DomainError::EmptyResponse {
            model: "worker/model".to_string(),
        };
        assert_eq!(err.to_string(), "Empty response from model 'worker/model'");
    }
}
