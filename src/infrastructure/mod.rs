//! Infrastructure layer module
//!
//! External integrations that satisfy the domain ports:
//! - OpenRouter chat completions client
//! - Configuration management
//! - Logging infrastructure
//! - Credentials management

pub mod config;
pub mod credentials;
pub mod logging;
pub mod openrouter;
