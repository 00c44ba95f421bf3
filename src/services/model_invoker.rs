//! Model invocation client.
//!
//! Thin layer over [`ModelBackend`] that turns a role's model id, system
//! instruction and user content into either plain text or a validated
//! structured-output contract. Exactly one backend call per invocation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ChatRequest, StructuredOutput};
use crate::domain::ports::ModelBackend;

/// Shared entry point for every model call made by the services.
#[derive(Clone)]
pub struct ModelInvoker {
    backend: Arc<dyn ModelBackend>,
    temperature: f32,
}

impl ModelInvoker {
    pub fn new(backend: Arc<dyn ModelBackend>, temperature: f32) -> Self {
        Self {
            backend,
            temperature,
        }
    }

    /// Invoke a model in plain-text mode.
    ///
    /// Absent or whitespace-only content is [`DomainError::EmptyResponse`].
    #[instrument(skip(self, system, user), fields(backend = self.backend.name()))]
    pub async fn invoke_text(&self, model: &str, system: &str, user: &str) -> DomainResult<String> {
        let request = ChatRequest::new(model, system, user).with_temperature(self.temperature);

        match self.backend.complete(request).await? {
            Some(text) if !text.trim().is_empty() => {
                debug!(chars = text.len(), "received text response");
                Ok(text)
            }
            _ => {
                warn!("model returned no content");
                Err(DomainError::EmptyResponse {
                    model: model.to_string(),
                })
            }
        }
    }

    /// Invoke a model in schema mode and parse the reply into `C`.
    ///
    /// Absent content, malformed JSON and contract violations all surface as
    /// [`DomainError::SchemaValidation`].
    #[instrument(skip(self, system, user), fields(backend = self.backend.name(), contract = C::NAME))]
    pub async fn invoke_structured<C: StructuredOutput>(
        &self,
        model: &str,
        system: &str,
        user: &str,
    ) -> DomainResult<C> {
        let request = ChatRequest::new(model, system, user)
            .with_temperature(self.temperature)
            .with_schema(C::NAME, C::schema());

        let content = self
            .backend
            .complete(request)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| DomainError::schema(C::NAME, "model returned no content"))?;

        parse_contract::<C>(&content)
    }
}

/// Deserialize and validate a structured-output payload.
///
/// The outermost `{...}` span is tried first. If it does not parse, every
/// object embedded in the reply is tried in order and the first one that
/// deserializes into `C` wins.
pub(crate) fn parse_contract<C: StructuredOutput>(content: &str) -> DomainResult<C> {
    let json = extract_json(content);
    let parsed: C = match serde_json::from_str(json) {
        Ok(parsed) => parsed,
        Err(err) => embedded_objects(content)
            .find_map(|value| serde_json::from_value(value).ok())
            .ok_or_else(|| {
                warn!(contract = C::NAME, error = %err, "structured output did not parse");
                DomainError::schema(C::NAME, err.to_string())
            })?,
    };
    parsed
        .validate()
        .map_err(|reason| DomainError::schema(C::NAME, reason))?;
    Ok(parsed)
}

/// Every JSON object that starts at some `{` in `text`, in order of position.
fn embedded_objects(text: &str) -> impl Iterator<Item = Value> + '_ {
    text.match_indices('{').filter_map(|(start, _)| {
        serde_json::Deserializer::from_str(&text[start..])
            .into_iter::<Value>()
            .next()
            .and_then(Result::ok)
            .filter(Value::is_object)
    })
}

/// Extract the outermost JSON object from a reply that may carry surrounding
/// text or markdown fences.
fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return trimmed;
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if end > start {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockBackend, MockReply};
    use crate::domain::models::{EvaluationResult, UseCases};

    fn invoker(mock: &Arc<MockBackend>) -> ModelInvoker {
        ModelInvoker::new(mock.clone(), 0.7)
    }

    #[test]
    fn test_extract_json_plain() {
        assert_eq!(extract_json(r#" {"a": 1} "#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_extract_json_fenced() {
        let reply = "Here you go:\n```json\n{\"use_cases\": [\"x\"]}\n```";
        assert_eq!(extract_json(reply), "{\"use_cases\": [\"x\"]}");
    }

    #[test]
    fn test_parse_contract_skips_stray_braces() {
        let reply = r#"Cases for {topic}: {"use_cases": ["a", "b"]}"#;
        let parsed = parse_contract::<UseCases>(reply).unwrap();
        assert_eq!(parsed.use_cases, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_parse_contract_picks_first_matching_object() {
        let reply = r#"Schema {"type": "object"} then {"pros": ["ok"], "cons": [], "quality_score": 6} done {x}"#;
        let parsed = parse_contract::<EvaluationResult>(reply).unwrap();
        assert_eq!(parsed.pros, vec!["ok".to_string()]);
        assert!((parsed.quality_score.value() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_contract_reports_outermost_error() {
        let err = parse_contract::<UseCases>("{not json} and {still not}").unwrap_err();
        assert!(matches!(
            err,
            DomainError::SchemaValidation {
                contract: "UseCases",
                ..
            }
        ));
    }

    #[test]
    fn test_extract_json_without_object() {
        assert_eq!(extract_json("  nothing here "), "nothing here");
    }

    #[tokio::test]
    async fn test_invoke_text_returns_content() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::text("hello")).await;

        let text = invoker(&mock).invoke_text("m", "sys", "hi").await.unwrap();
        assert_eq!(text, "hello");

        let calls = mock.calls_for("m").await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system_text(), Some("sys"));
        assert_eq!(calls[0].user_text(), "hi");
        assert!(calls[0].response_schema.is_none());
    }

    #[tokio::test]
    async fn test_invoke_text_empty_is_error() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::Empty).await;
        mock.push("m", MockReply::text("   \n")).await;

        let inv = invoker(&mock);
        assert!(matches!(
            inv.invoke_text("m", "", "hi").await,
            Err(DomainError::EmptyResponse { model }) if model == "m"
        ));
        assert!(matches!(
            inv.invoke_text("m", "", "hi").await,
            Err(DomainError::EmptyResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_text_omits_empty_system() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::text("ok")).await;

        invoker(&mock).invoke_text("m", "", "hi").await.unwrap();
        let calls = mock.calls_for("m").await;
        assert_eq!(calls[0].system_text(), None);
        assert_eq!(calls[0].messages.len(), 1);
    }

    #[tokio::test]
    async fn test_invoke_structured_attaches_schema() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::text(r#"{"use_cases": ["a", "b"]}"#))
            .await;

        let parsed: UseCases = invoker(&mock)
            .invoke_structured("m", "sys", "gen")
            .await
            .unwrap();
        assert_eq!(parsed.use_cases, vec!["a", "b"]);

        let calls = mock.calls_for("m").await;
        let schema = calls[0].response_schema.as_ref().unwrap();
        assert_eq!(schema.name, "UseCases");
        assert_eq!(schema.schema["required"][0], "use_cases");
    }

    #[tokio::test]
    async fn test_invoke_structured_malformed_json() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::text("not json at all")).await;

        let result: DomainResult<UseCases> =
            invoker(&mock).invoke_structured("m", "sys", "gen").await;
        assert!(matches!(
            result,
            Err(DomainError::SchemaValidation { contract: "UseCases", .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_structured_absent_content() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::Empty).await;

        let result: DomainResult<EvaluationResult> =
            invoker(&mock).invoke_structured("m", "sys", "eval").await;
        assert!(matches!(
            result,
            Err(DomainError::SchemaValidation { contract: "EvaluationResult", .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_structured_out_of_range_score() {
        let mock = Arc::new(MockBackend::new());
        mock.push(
            "m",
            MockReply::text(r#"{"pros": [], "cons": [], "quality_score": 11}"#),
        )
        .await;

        let result: DomainResult<EvaluationResult> =
            invoker(&mock).invoke_structured("m", "sys", "eval").await;
        assert!(matches!(result, Err(DomainError::SchemaValidation { .. })));
    }

    #[tokio::test]
    async fn test_invoke_structured_empty_use_cases() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::text(r#"{"use_cases": []}"#)).await;

        let result: DomainResult<UseCases> =
            invoker(&mock).invoke_structured("m", "sys", "gen").await;
        assert!(matches!(result, Err(DomainError::SchemaValidation { .. })));
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let mock = Arc::new(MockBackend::new());
        mock.push("m", MockReply::error("boom")).await;

        let result = invoker(&mock).invoke_text("m", "", "hi").await;
        assert!(matches!(result, Err(DomainError::Backend(msg)) if msg == "boom"));
    }
}
