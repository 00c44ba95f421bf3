//! Prompt lineage types: the task being optimized for, the candidate
//! prompts, and the inputs/outputs used to exercise them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// Natural-language description of the task the prompt must solve.
///
/// Immutable and non-empty for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Trim and validate a task description.
    pub fn new(text: impl AsRef<str>) -> DomainResult<Self> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::Configuration(
                "task description is empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A versioned prompt. Version 1 is the crafted prompt; each refinement
/// produces the next version and supersedes the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptCandidate {
    pub version: u32,
    pub text: String,
}

impl PromptCandidate {
    pub fn initial(text: impl Into<String>) -> Self {
        Self {
            version: 1,
            text: text.into(),
        }
    }

    /// Build the candidate that replaces `self`.
    pub fn successor(&self, text: impl Into<String>) -> Self {
        Self {
            version: self.version + 1,
            text: text.into(),
        }
    }
}

/// A concrete sample input used to exercise a prompt candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UseCase(pub String);

impl UseCase {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Worker output for one use case in one iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response(pub String);

impl Response {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
