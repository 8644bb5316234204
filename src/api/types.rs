use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::chat::StructuredOutputFormat;

/// Structured reply produced by the model for the JSON endpoints.
///
/// Plain value object with no lifecycle beyond the request that built it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAnswer {
    /// Short title for the reply
    pub title: String,
    /// Free-form reply text
    pub content: String,
    /// Timestamp string filled in by the model
    pub created_at: String,
}

/// Wire shape for the list endpoint. OpenAI structured output requires an
/// object at the schema root, so the array is wrapped in a single field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiAnswerList {
    pub answers: Vec<AiAnswer>,
}

/// Query parameters for the prompt endpoints.
#[derive(Debug, Deserialize)]
pub struct ChatParams {
    /// The user-provided input text
    pub prompt: String,
}

/// Query parameters for the template endpoints.
#[derive(Debug, Deserialize)]
pub struct TemplateParams {
    #[serde(default)]
    pub sport: Option<String>,
    #[serde(default)]
    pub player: Option<String>,
}

/// Schema constraining a reply to a single [`AiAnswer`] object.
pub fn answer_schema() -> StructuredOutputFormat {
    StructuredOutputFormat {
        name: "AiAnswer".to_string(),
        description: Some("A single structured answer".to_string()),
        schema: Some(json!({
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "content": { "type": "string" },
                "created_at": { "type": "string" }
            },
            "required": ["title", "content", "created_at"]
        })),
        strict: Some(true),
    }
}

/// Schema constraining a reply to a list of [`AiAnswer`] objects.
pub fn answer_list_schema() -> StructuredOutputFormat {
    StructuredOutputFormat {
        name: "AiAnswerList".to_string(),
        description: Some("A list of structured answers".to_string()),
        schema: Some(json!({
            "type": "object",
            "properties": {
                "answers": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" },
                            "content": { "type": "string" },
                            "created_at": { "type": "string" }
                        },
                        "required": ["title", "content", "created_at"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["answers"]
        })),
        strict: Some(true),
    }
}
