//! Scripted model backend for testing.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::ChatRequest;
use crate::domain::ports::ModelBackend;

/// One canned backend reply.
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Content returned as-is
    Text(String),
    /// The backend answered without content
    Empty,
    /// Transport-level failure
    Error(String),
    /// Wait, then resolve the inner reply
    Delayed(Duration, Box<MockReply>),
}

impl MockReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    pub fn delayed(delay: Duration, reply: MockReply) -> Self {
        Self::Delayed(delay, Box::new(reply))
    }
}

type Handler = Arc<dyn Fn(&ChatRequest) -> MockReply + Send + Sync>;

/// Mock backend keyed by model id.
///
/// Replies are taken from a per-model FIFO first; when that is empty the
/// model's handler (if any) computes one from the request. A model with
/// neither yields an error so unexpected calls fail loudly.
pub struct MockBackend {
    scripted: Mutex<HashMap<String, VecDeque<MockReply>>>,
    handlers: RwLock<HashMap<String, Handler>>,
    calls: Mutex<Vec<ChatRequest>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            scripted: Mutex::new(HashMap::new()),
            handlers: RwLock::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    /// Queue a reply for the next call to `model`.
    pub async fn push(&self, model: &str, reply: MockReply) {
        let mut scripted = self.scripted.lock().await;
        scripted
            .entry(model.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queue several replies for `model`, in order.
    pub async fn push_all(&self, model: &str, replies: impl IntoIterator<Item = MockReply>) {
        let mut scripted = self.scripted.lock().await;
        scripted
            .entry(model.to_string())
            .or_default()
            .extend(replies);
    }

    /// Compute replies for `model` from the request once its queue is drained.
    pub async fn on<F>(&self, model: &str, handler: F)
    where
        F: Fn(&ChatRequest) -> MockReply + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().await;
        handlers.insert(model.to_string(), Arc::new(handler));
    }

    /// All requests received, in arrival order.
    pub async fn calls(&self) -> Vec<ChatRequest> {
        self.calls.lock().await.clone()
    }

    /// Requests received for one model, in arrival order.
    pub async fn calls_for(&self, model: &str) -> Vec<ChatRequest> {
        let calls = self.calls.lock().await;
        calls.iter().filter(|c| c.model == model).cloned().collect()
    }

    pub async fn call_count(&self, model: &str) -> usize {
        let calls = self.calls.lock().await;
        calls.iter().filter(|c| c.model == model).count()
    }

    /// Highest number of calls that were in progress at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn resolve(&self, request: &ChatRequest) -> DomainResult<Option<String>> {
        let mut reply = self.next_reply(request).await;
        loop {
            match reply {
                MockReply::Text(text) => return Ok(Some(text)),
                MockReply::Empty => return Ok(None),
                MockReply::Error(message) => return Err(DomainError::Backend(message)),
                MockReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }

    async fn next_reply(&self, request: &ChatRequest) -> MockReply {
        let queued = {
            let mut scripted = self.scripted.lock().await;
            scripted
                .get_mut(&request.model)
                .and_then(VecDeque::pop_front)
        };
        if let Some(reply) = queued {
            return reply;
        }

        let handlers = self.handlers.read().await;
        match handlers.get(&request.model) {
            Some(handler) => handler(request),
            None => MockReply::Error(format!("no scripted reply for model '{}'", request.model)),
        }
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: ChatRequest) -> DomainResult<Option<String>> {
        self.calls.lock().await.push(request.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        let result = self.resolve(&request).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_replies_are_fifo_per_model() {
        let mock = MockBackend::new();
        mock.push_all("a", [MockReply::text("1"), MockReply::text("2")])
            .await;
        mock.push("b", MockReply::text("x")).await;

        let req = |m: &str| ChatRequest::new(m, "", "hi");
        assert_eq!(mock.complete(req("a")).await.unwrap(), Some("1".into()));
        assert_eq!(mock.complete(req("b")).await.unwrap(), Some("x".into()));
        assert_eq!(mock.complete(req("a")).await.unwrap(), Some("2".into()));
        assert_eq!(mock.call_count("a").await, 2);
        assert_eq!(mock.calls().await.len(), 3);
    }

    #[tokio::test]
    async fn test_handler_after_queue_drains() {
        let mock = MockBackend::new();
        mock.push("w", MockReply::text("first")).await;
        mock.on("w", |req| MockReply::text(format!("echo: {}", req.user_text())))
            .await;

        let first = mock.complete(ChatRequest::new("w", "", "a")).await.unwrap();
        let second = mock.complete(ChatRequest::new("w", "", "b")).await.unwrap();
        assert_eq!(first.as_deref(), Some("first"));
        assert_eq!(second.as_deref(), Some("echo: b"));
    }

    #[tokio::test]
    async fn test_unscripted_model_errors() {
        let mock = MockBackend::new();
        let result = mock.complete(ChatRequest::new("ghost", "", "hi")).await;
        assert!(matches!(result, Err(DomainError::Backend(_))));
    }

    #[tokio::test]
    async fn test_empty_and_delayed() {
        let mock = MockBackend::new();
        mock.push("m", MockReply::Empty).await;
        mock.push(
            "m",
            MockReply::delayed(Duration::from_millis(5), MockReply::text("late")),
        )
        .await;

        assert_eq!(mock.complete(ChatRequest::new("m", "", "1")).await.unwrap(), None);
        assert_eq!(
            mock.complete(ChatRequest::new("m", "", "2")).await.unwrap(),
            Some("late".to_string())
        );
    }
}
