//! Port traits implemented by infrastructure and adapters.

pub mod model_backend;

pub use model_backend::ModelBackend;
