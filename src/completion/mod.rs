//! Completion service abstraction for Pensum.
//!
//! Defines the typed request/response protocol spoken with the completion
//! model (messages made of content blocks, tool definitions, stop reasons)
//! and a trait-based seam so the orchestration logic can be tested against
//! scripted services.

mod anthropic;

pub use anthropic::AnthropicClient;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Serializable tool definition sent to the completion service.
///
/// Derived from a registered tool, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Role of a message in the conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single content block within a message or response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text emitted by the model (or sent by the user).
    Text { text: String },
    /// A tool invocation requested by the model.
    ToolUse { id: String, name: String, input: Value },
    /// A tool result echoed back to the model; `tool_use_id` must match
    /// the originating invocation's id exactly.
    ToolResult { tool_use_id: String, content: String },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

/// A conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    StopSequence,
    /// Unknown stop reasons are preserved rather than rejected.
    #[serde(other)]
    Other,
}

/// Tool selection policy for a request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolChoice {
    /// The model may answer directly or request tools.
    Auto,
}

/// A request to the completion service.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
}

/// A response from the completion service.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub stop_reason: StopReason,
    pub content: Vec<ContentBlock>,
}

impl CompletionResponse {
    /// First text block of the response, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Trait for completion service implementations.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Send one request and wait for the model's response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted completion service for exercising the orchestration
    //! protocol without a network.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub(crate) struct ScriptedCompletion {
        responses: Mutex<VecDeque<CompletionResponse>>,
        pub(crate) requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedCompletion {
        pub(crate) fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionService for ScriptedCompletion {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| crate::PensumError::Completion("Script exhausted".to_string()))
        }
    }

    /// Response that answers directly.
    pub(crate) fn direct_response(text: &str) -> CompletionResponse {
        CompletionResponse {
            stop_reason: StopReason::EndTurn,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Response requesting the given tool invocations, with a leading
    /// reasoning-text block as the API produces.
    pub(crate) fn tool_use_response(invocations: Vec<(&str, &str, Value)>) -> CompletionResponse {
        let mut content = vec![ContentBlock::text("I'll look that up.")];
        for (id, name, input) in invocations {
            content.push(ContentBlock::ToolUse {
                id: id.to_string(),
                name: name.to_string(),
                input,
            });
        }
        CompletionResponse {
            stop_reason: StopReason::ToolUse,
            content,
        }
    }
}
