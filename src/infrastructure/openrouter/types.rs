/// Request and response types for the OpenRouter chat completions API
use serde::{Deserialize, Serialize};

use crate::domain::models::{ChatMessage, ChatRequest};

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier (e.g., "google/gemini-2.5-flash")
    pub model: String,

    /// Role-tagged conversation
    pub messages: Vec<ChatMessage>,

    /// Temperature for sampling (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Structured-output constraint (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl From<ChatRequest> for CompletionRequest {
    fn from(request: ChatRequest) -> Self {
        Self {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
            response_format: request.response_schema.map(|rs| ResponseFormat::JsonSchema {
                json_schema: JsonSchemaFormat {
                    name: rs.name.to_string(),
                    strict: true,
                    schema: rs.schema,
                },
            }),
        }
    }
}

/// Response format constraint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

/// Named JSON schema for structured outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// Generation ID
    #[serde(default)]
    pub id: Option<String>,

    /// Model that actually served the request
    #[serde(default)]
    pub model: Option<String>,

    /// Generated choices (normally exactly one)
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Token usage statistics
    #[serde(default)]
    pub usage: Option<Usage>,

    /// Provider error reported with a 200 status
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

impl CompletionResponse {
    /// Content of the first choice, if any
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: i64,
    pub message: String,
}
