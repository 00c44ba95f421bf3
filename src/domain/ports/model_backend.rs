//! Model backend port.
//!
//! The services talk to language models only through this trait, so the
//! HTTP client can be swapped for a scripted fake in tests.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::ChatRequest;

/// A language-model backend.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the worker pool shares one
/// backend across concurrently running tokio tasks.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Short identifier used in logs (e.g. "openrouter", "mock").
    fn name(&self) -> &'static str;

    /// Send one request and return the generated content.
    ///
    /// `Ok(None)` means the backend answered but produced no content; it is
    /// up to the caller to decide whether that is an error. Transport and
    /// HTTP failures are `DomainError::Backend`.
    async fn complete(&self, request: ChatRequest) -> DomainResult<Option<String>>;
}
