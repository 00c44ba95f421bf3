pub mod client;
pub mod errors;
pub mod rate_limiter;
pub mod retry;
pub mod types;

pub use client::{OpenRouterClient, OpenRouterConfig};
pub use errors::ModelApiError;
pub use rate_limiter::TokenBucketRateLimiter;
pub use retry::RetryPolicy;
pub use types::{CompletionRequest, CompletionResponse, ResponseFormat, Usage};
