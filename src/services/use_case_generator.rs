//! Generates the frozen set of sample inputs for a run.

use tracing::{info, instrument, warn};

use crate::domain::errors::DomainResult;
use crate::domain::models::instructions::USE_CASE_GENERATOR_INSTRUCTION;
use crate::domain::models::{TaskDescription, UseCase, UseCases};
use crate::services::model_invoker::ModelInvoker;

pub struct UseCaseGenerator {
    invoker: ModelInvoker,
    model: String,
}

impl UseCaseGenerator {
    pub fn new(invoker: ModelInvoker, model: impl Into<String>) -> Self {
        Self {
            invoker,
            model: model.into(),
        }
    }

    /// Ask for `count` use cases.
    ///
    /// The list is kept as returned even when its length differs from
    /// `count`; an empty list fails contract validation.
    #[instrument(skip_all, fields(model = %self.model, count = count))]
    pub async fn generate(&self, task: &TaskDescription, count: usize) -> DomainResult<Vec<UseCase>> {
        let user = format!(
            "Generate {count} use cases for the following prompt description:\n\n{task}"
        );

        let generated: UseCases = self
            .invoker
            .invoke_structured(&self.model, USE_CASE_GENERATOR_INSTRUCTION, &user)
            .await?;

        if generated.use_cases.len() != count {
            warn!(
                requested = count,
                received = generated.use_cases.len(),
                "use case count differs from request"
            );
        }
        info!(count = generated.use_cases.len(), "use cases generated");

        Ok(generated.use_cases.into_iter().map(UseCase).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockBackend, MockReply};
    use crate::domain::errors::DomainError;
    use std::sync::Arc;

    fn generator(mock: &Arc<MockBackend>) -> UseCaseGenerator {
        UseCaseGenerator::new(ModelInvoker::new(mock.clone(), 0.7), "gen")
    }

    #[tokio::test]
    async fn test_generate_preserves_order() {
        let mock = Arc::new(MockBackend::new());
        mock.push("gen", MockReply::text(r#"{"use_cases": ["a", "b", "c"]}"#))
            .await;

        let task = TaskDescription::new("summarize articles").unwrap();
        let cases = generator(&mock).generate(&task, 3).await.unwrap();
        assert_eq!(
            cases,
            vec![
                UseCase("a".into()),
                UseCase("b".into()),
                UseCase("c".into())
            ]
        );

        let calls = mock.calls_for("gen").await;
        assert_eq!(
            calls[0].user_text(),
            "Generate 3 use cases for the following prompt description:\n\nsummarize articles"
        );
        assert!(calls[0].response_schema.is_some());
    }

    #[tokio::test]
    async fn test_generate_accepts_count_mismatch() {
        let mock = Arc::new(MockBackend::new());
        mock.push("gen", MockReply::text(r#"{"use_cases": ["only one"]}"#))
            .await;

        let task = TaskDescription::new("t").unwrap();
        let cases = generator(&mock).generate(&task, 5).await.unwrap();
        assert_eq!(cases.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_keeps_duplicates() {
        let mock = Arc::new(MockBackend::new());
        mock.push("gen", MockReply::text(r#"{"use_cases": ["x", "x"]}"#))
            .await;

        let task = TaskDescription::new("t").unwrap();
        let cases = generator(&mock).generate(&task, 2).await.unwrap();
        assert_eq!(cases.len(), 2);
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_list() {
        let mock = Arc::new(MockBackend::new());
        mock.push("gen", MockReply::text(r#"{"use_cases": []}"#)).await;

        let task = TaskDescription::new("t").unwrap();
        assert!(matches!(
            generator(&mock).generate(&task, 3).await,
            Err(DomainError::SchemaValidation { .. })
        ));
    }
}
