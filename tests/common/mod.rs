//! Common test utilities for integration tests
//!
//! Provides a scripted backend and configuration fixtures shared by the
//! loop-level tests.

#![allow(dead_code)]

use std::sync::Arc;

use promptloop::adapters::{MockBackend, MockReply};
use promptloop::Config;

pub const CRAFTER: &str = "test/crafter";
pub const GENERATOR: &str = "test/generator";
pub const WORKER: &str = "test/worker";
pub const EVALUATOR: &str = "test/evaluator";

/// Config with short model ids and a small, deterministic pipeline.
pub fn test_config(use_cases: usize, threshold: f64, max_iterations: u32) -> Config {
    let mut config = Config::default();
    config.models.crafter = CRAFTER.to_string();
    config.models.use_case_generator = GENERATOR.to_string();
    config.models.worker = WORKER.to_string();
    config.models.evaluator = EVALUATOR.to_string();
    config.pipeline.use_case_count = use_cases;
    config.pipeline.quality_threshold = threshold;
    config.pipeline.max_iterations = max_iterations;
    config.pipeline.max_concurrency = 4;
    config
}

/// Evaluator reply carrying `score` and one pro/con derived from it.
pub fn score_reply(score: f64) -> MockReply {
    MockReply::text(format!(
        r#"{{"pros": ["clear at {score}"], "cons": ["wordy"], "quality_score": {score}}}"#
    ))
}

pub fn use_cases_reply(cases: &[&str]) -> MockReply {
    let body = serde_json::json!({ "use_cases": cases });
    MockReply::text(body.to_string())
}

/// Backend scripted for a full run.
///
/// The crafter answers with `prompts` in order (initial prompt first, then
/// each refinement), the worker echoes its input, and the evaluator answers
/// with `scores` in order.
pub async fn scripted_backend(
    prompts: &[&str],
    cases: &[&str],
    scores: &[f64],
) -> Arc<MockBackend> {
    let mock = Arc::new(MockBackend::new());
    mock.push_all(CRAFTER, prompts.iter().map(|p| MockReply::text(*p)))
        .await;
    mock.push(GENERATOR, use_cases_reply(cases)).await;
    mock.on(WORKER, |req| {
        MockReply::text(format!("answer to {}", req.user_text()))
    })
    .await;
    mock.push_all(EVALUATOR, scores.iter().copied().map(score_reply))
        .await;
    mock
}
