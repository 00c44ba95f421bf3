use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::errors::DomainError;

/// Errors that can occur when interacting with the OpenRouter API
#[derive(Error, Debug)]
pub enum ModelApiError {
    /// Invalid request parameters (HTTP 400)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid or missing API key (HTTP 401)
    #[error("Invalid API key - authentication failed")]
    InvalidApiKey,

    /// Insufficient credits (HTTP 402)
    #[error("Payment required: {0}")]
    PaymentRequired(String),

    /// Forbidden - e.g. input flagged by moderation (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Unknown model or endpoint (HTTP 404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded - too many requests")]
    RateLimitExceeded,

    /// Upstream or gateway failure (HTTP 5xx)
    #[error("Server error ({0}): {1}")]
    ServerError(StatusCode, String),

    /// Error object embedded in an otherwise successful response
    #[error("Provider error ({code}): {message}")]
    ProviderError { code: i64, message: String },

    /// Network or connection error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unknown or unexpected error
    #[error("Unknown error ({0}): {1}")]
    UnknownError(StatusCode, String),
}

impl ModelApiError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => Self::InvalidRequest(body),
            StatusCode::UNAUTHORIZED => Self::InvalidApiKey,
            StatusCode::PAYMENT_REQUIRED => Self::PaymentRequired(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            status if status.is_server_error() => Self::ServerError(status, body),
            _ => Self::UnknownError(status, body),
        }
    }

    /// Returns true if this error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimitExceeded | Self::ServerError(_, _) => true,
            Self::NetworkError(err) => err.is_timeout() || err.is_connect(),
            Self::ProviderError { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    /// Returns true if this is a permanent error that should not be retried
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::InvalidApiKey
                | Self::PaymentRequired(_)
                | Self::Forbidden(_)
                | Self::NotFound(_)
        )
    }
}

impl From<ModelApiError> for DomainError {
    fn from(err: ModelApiError) -> Self {
        DomainError::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(ModelApiError::RateLimitExceeded.is_transient());
        assert!(
            ModelApiError::ServerError(StatusCode::BAD_GATEWAY, "upstream".to_string())
                .is_transient()
        );
        assert!(ModelApiError::ProviderError {
            code: 502,
            message: "provider down".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_permanent_errors() {
        assert!(ModelApiError::InvalidRequest("test".to_string()).is_permanent());
        assert!(ModelApiError::InvalidApiKey.is_permanent());
        assert!(ModelApiError::PaymentRequired("test".to_string()).is_permanent());
        assert!(ModelApiError::NotFound("no such model".to_string()).is_permanent());
    }

    #[test]
    fn test_status_classification() {
        assert!(matches!(
            ModelApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ModelApiError::InvalidApiKey
        ));
        assert!(matches!(
            ModelApiError::from_status(StatusCode::SERVICE_UNAVAILABLE, "busy".to_string()),
            ModelApiError::ServerError(_, _)
        ));
        assert!(matches!(
            ModelApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            ModelApiError::UnknownError(_, _)
        ));
    }

    #[test]
    fn test_error_exclusivity() {
        let rate_limit_error = ModelApiError::RateLimitExceeded;
        assert!(rate_limit_error.is_transient());
        assert!(!rate_limit_error.is_permanent());

        let invalid_request_error = ModelApiError::InvalidRequest("test".to_string());
        assert!(!invalid_request_error.is_transient());
        assert!(invalid_request_error.is_permanent());
    }

    #[test]
    fn test_into_domain_error() {
        let err: DomainError = ModelApiError::InvalidApiKey.into();
        assert!(matches!(err, DomainError::Backend(_)));
    }
}
