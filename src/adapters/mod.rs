//! Adapters implementing domain ports outside the production backend.

pub mod mock;

pub use mock::{MockBackend, MockReply};
