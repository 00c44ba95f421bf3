/// Integration tests for the OpenRouter chat completions client
///
/// Test coverage:
/// - Request shape (auth header, attribution header, body, json_schema format)
/// - Content extraction, including absent content
/// - Status classification into transient and permanent errors
/// - Provider errors embedded in a 200 response
/// - Opt-in retry for transient statuses
/// - Secret scrubbing of error bodies
use mockito::{Matcher, Server};
use promptloop::domain::models::{ChatRequest, EvaluationResult, StructuredOutput};
use promptloop::domain::ports::ModelBackend;
use promptloop::infrastructure::credentials::ApiKey;
use promptloop::infrastructure::openrouter::{ModelApiError, OpenRouterClient, OpenRouterConfig};
use promptloop::DomainError;

fn config(base_url: String) -> OpenRouterConfig {
    OpenRouterConfig {
        api_key: ApiKey::new("sk-or-test-key"),
        base_url,
        app_title: "promptloop-tests".to_string(),
        rate_limit_rps: 100.0,
        max_retries: 0,
        initial_backoff_ms: 10,
        max_backoff_ms: 50,
        timeout_secs: 5,
    }
}

fn completion_body(content: serde_json::Value) -> String {
    serde_json::json!({
        "id": "gen-123",
        "model": "google/gemini-2.5-flash",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15 }
    })
    .to_string()
}

#[tokio::test]
async fn test_text_completion_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-or-test-key")
        .match_header("x-title", "promptloop-tests")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "model": "moonshotai/kimi-k2-thinking",
            "messages": [
                { "role": "system", "content": "You are terse." },
                { "role": "user", "content": "Say hi" }
            ],
            "temperature": 0.5
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(serde_json::json!("hi")))
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let request =
        ChatRequest::new("moonshotai/kimi-k2-thinking", "You are terse.", "Say hi").with_temperature(0.5);

    let content = client.complete(request).await.unwrap();
    assert_eq!(content.as_deref(), Some("hi"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_structured_request_sends_json_schema() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "response_format": {
                "type": "json_schema",
                "json_schema": { "name": "EvaluationResult", "strict": true }
            }
        })))
        .with_status(200)
        .with_body(completion_body(serde_json::json!(
            "{\"pros\": [], \"cons\": [], \"quality_score\": 7}"
        )))
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let request = ChatRequest::new("google/gemini-2.5-flash", "", "score this")
        .with_schema(EvaluationResult::NAME, EvaluationResult::schema());

    let content = client.complete(request).await.unwrap();
    assert!(content.unwrap().contains("quality_score"));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_null_content_is_none() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body(serde_json::Value::Null))
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let content = client
        .complete(ChatRequest::new("m", "", "hi"))
        .await
        .unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_unauthorized_is_permanent() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error": {"message": "No auth credentials found", "code": 401}}"#)
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let err = client
        .send_completion(ChatRequest::new("m", "", "hi").into())
        .await
        .unwrap_err();

    assert!(matches!(err, ModelApiError::InvalidApiKey));
    assert!(err.is_permanent());
}

#[tokio::test]
async fn test_server_error_surfaces_as_backend_error_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(502)
        .with_body("bad gateway")
        .expect(1)
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let err = client
        .complete(ChatRequest::new("m", "", "hi"))
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Backend(_)));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_opt_in_retry_recovers_from_rate_limit() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .expect(1)
        .create_async()
        .await;

    let mut retrying = config(server.url());
    retrying.max_retries = 2;
    let client = OpenRouterClient::new(retrying).unwrap();

    // Takes over once the single expected 429 has been served
    let ok = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body(serde_json::json!("recovered")))
        .create_async()
        .await;

    let content = client
        .complete(ChatRequest::new("m", "", "hi"))
        .await
        .unwrap();
    assert_eq!(content.as_deref(), Some("recovered"));
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_provider_error_in_success_body() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"error": {"code": 502, "message": "upstream provider timed out"}}"#)
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let err = client
        .send_completion(ChatRequest::new("m", "", "hi").into())
        .await
        .unwrap_err();

    match err {
        ModelApiError::ProviderError { code, message } => {
            assert_eq!(code, 502);
            assert!(message.contains("timed out"));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_body_is_scrubbed() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_body("invalid request for key sk-or-v1-abcdef1234567890abcdef")
        .create_async()
        .await;

    let client = OpenRouterClient::new(config(server.url())).unwrap();
    let err = client
        .send_completion(ChatRequest::new("m", "", "hi").into())
        .await
        .unwrap_err();

    let rendered = err.to_string();
    assert!(!rendered.contains("abcdef1234567890"));
    assert!(rendered.contains("[API_KEY_REDACTED]"));
}

#[tokio::test]
async fn test_retry_attempts_are_rate_limited() {
    let mut server = Server::new_async().await;
    let limited = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .expect(1)
        .create_async()
        .await;
    let ok = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion_body(serde_json::json!("throttled")))
        .create_async()
        .await;

    // One token per second and a 1ms backoff: the retry must wait for the bucket
    let mut throttled = config(server.url());
    throttled.rate_limit_rps = 1.0;
    throttled.max_retries = 1;
    throttled.initial_backoff_ms = 1;
    throttled.max_backoff_ms = 1;
    let client = OpenRouterClient::new(throttled).unwrap();

    let started = std::time::Instant::now();
    let content = client
        .complete(ChatRequest::new("m", "", "hi"))
        .await
        .unwrap();

    assert_eq!(content.as_deref(), Some("throttled"));
    assert!(
        started.elapsed() >= std::time::Duration::from_millis(800),
        "retry skipped the rate limiter: {:?}",
        started.elapsed()
    );
    limited.assert_async().await;
    ok.assert_async().await;
}
