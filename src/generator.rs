//! Two-phase tool-use orchestration.
//!
//! Runs the mediation protocol for one query: a first completion request
//! offering tool definitions, an optional serial tool-dispatch round, and
//! at most one follow-up request carrying the results. Tool use is
//! strictly single-round; results are never re-offered for further
//! invocation.

use crate::completion::{
    CompletionRequest, CompletionService, ContentBlock, Message, StopReason, ToolChoice,
    ToolDefinition,
};
use crate::error::{PensumError, Result};
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tracing::{debug, info};

/// Static instruction block for the first request's system prompt.
const SYSTEM_PROMPT: &str = "\
You are an AI assistant specialized in course materials, with tools for \
searching course content and retrieving course outlines.

Tool usage:
- Use 'search_course_content' for questions about specific topics covered in the materials
- Use 'get_course_outline' when asked about a course's structure, lesson list, or instructor
- Answer general knowledge questions directly, without tools

When answering from search results, be concise and ground every claim in \
the retrieved material. If a tool reports that nothing was found, say so \
plainly instead of inventing an answer.";

/// Orchestrator for the completion/tool-use protocol.
pub struct ResponseGenerator {
    client: Arc<dyn CompletionService>,
}

impl ResponseGenerator {
    pub fn new(client: Arc<dyn CompletionService>) -> Self {
        Self { client }
    }

    /// Answer one query.
    ///
    /// `history` is an opaque prior-conversation snapshot; it is appended
    /// to the system prompt when non-empty and never parsed or mutated.
    pub async fn generate(
        &self,
        query: &str,
        history: Option<&str>,
        tools: Vec<ToolDefinition>,
        registry: &ToolRegistry,
    ) -> Result<String> {
        let system = match history {
            Some(history) if !history.is_empty() => {
                format!("{}\n\nPrevious conversation:\n{}", SYSTEM_PROMPT, history)
            }
            _ => SYSTEM_PROMPT.to_string(),
        };

        let mut messages = vec![Message::user(vec![ContentBlock::text(query)])];

        let first = self
            .client
            .complete(CompletionRequest {
                system: system.clone(),
                messages: messages.clone(),
                tools: Some(tools),
                tool_choice: Some(ToolChoice::Auto),
            })
            .await?;

        if first.stop_reason != StopReason::ToolUse {
            debug!("Model answered directly");
            return extract_text(&first.content);
        }

        // Dispatch every requested invocation serially, in the order the
        // model emitted them; citation order and identifier pairing depend
        // on this.
        let mut result_blocks = Vec::new();
        for block in &first.content {
            if let ContentBlock::ToolUse { id, name, input } = block {
                info!(tool = %name, id = %id, "Executing tool invocation");
                let result = registry.execute(name, input).await;
                result_blocks.push(ContentBlock::tool_result(id.clone(), result));
            }
        }

        // The assistant turn is preserved exactly as received, reasoning
        // text included, followed by one user turn of ordered results
        messages.push(Message::assistant(first.content));
        messages.push(Message::user(result_blocks));

        let second = self
            .client
            .complete(CompletionRequest {
                system,
                messages,
                tools: None,
                tool_choice: None,
            })
            .await?;

        extract_text(&second.content)
    }
}

/// First text block of a response, verbatim.
fn extract_text(content: &[ContentBlock]) -> Result<String> {
    content
        .iter()
        .find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.clone()),
            _ => None,
        })
        .ok_or_else(|| PensumError::Completion("Empty response from model".to_string()))
}
