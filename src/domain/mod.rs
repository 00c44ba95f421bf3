//! Domain layer for the promptloop optimizer
//!
//! This module contains the core types and the ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, RunError, RunPhase};
