//! Credentials management infrastructure
//!
//! The backend key is read from the environment once at startup and carried
//! in a wrapper that never prints its value.

use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

/// API key for the model backend.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the key from `env_var`. Missing or blank keys are fatal.
    pub fn from_env(env_var: &str) -> DomainResult<Self> {
        match std::env::var(env_var) {
            Ok(value) if !value.trim().is_empty() => Ok(Self(value.trim().to_string())),
            _ => Err(DomainError::Configuration(format!(
                "{env_var} environment variable not set"
            ))),
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First characters of the key followed by a redaction marker.
    pub fn redacted(&self) -> String {
        match self.0.get(..8) {
            Some(prefix) if self.0.len() > 12 => format!("{prefix}...[REDACTED]"),
            _ => "[REDACTED]".to_string(),
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}
