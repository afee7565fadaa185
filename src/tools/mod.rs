//! Tool capability interface and registry for Pensum.
//!
//! Tools are the retrieval capabilities the completion model can invoke.
//! The registry owns them for the lifetime of the process, exposes their
//! definitions in registration order, dispatches execution by name, and
//! aggregates the citations each execution produced for the current turn.

mod outline;
mod search;

pub use outline::OutlineTool;
pub use search::SearchTool;

use crate::completion::ToolDefinition;
use crate::error::{PensumError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// A citation crediting retrieved material, exposed to the end consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Display text, e.g. `Test Course - Lesson 1`.
    pub text: String,
    /// Optional deep link into the course material.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// Result of one tool execution: the text handed back to the model plus
/// the citations produced while rendering it.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub text: String,
    pub sources: Vec<Source>,
}

impl ToolOutput {
    /// An output carrying no citations.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }
}

/// Trait for tool implementations.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Definition sent to the completion service.
    fn definition(&self) -> ToolDefinition;

    /// Execute with the named arguments emitted by the model.
    async fn execute(&self, args: &Value) -> Result<ToolOutput>;
}

/// Registry of tools, keyed by definition name.
pub struct ToolRegistry {
    tools: Vec<(String, Arc<dyn Tool>)>,
    /// Citations per tool for the current turn, in execution order.
    citations: Mutex<Vec<(String, Vec<Source>)>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            citations: Mutex::new(Vec::new()),
        }
    }

    /// Register a tool. Fails if its definition lacks a name or the name
    /// is already taken; registration happens once at startup, so this is
    /// the one condition treated as fatal.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let name = tool.definition().name;
        if name.is_empty() {
            return Err(PensumError::Config(
                "Tool definition must have a name".to_string(),
            ));
        }
        if self.tools.iter().any(|(existing, _)| existing == &name) {
            return Err(PensumError::Config(format!(
                "Tool '{}' is already registered",
                name
            )));
        }
        self.tools.push((name, tool));
        Ok(())
    }

    /// All tool definitions, in registration order (stable, so prompt
    /// construction is deterministic across runs).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|(_, tool)| tool.definition()).collect()
    }

    /// Execute a tool by name.
    ///
    /// An unknown name or a failed execution comes back as text so the
    /// failure stays visible to the model in the next turn instead of
    /// crashing the query.
    pub async fn execute(&self, name: &str, args: &Value) -> String {
        let Some((_, tool)) = self.tools.iter().find(|(n, _)| n == name) else {
            warn!(tool = %name, "Unknown tool requested");
            return format!("Tool '{}' not found", name);
        };

        match tool.execute(args).await {
            Ok(ToolOutput { text, sources }) => {
                let mut citations = self.citations.lock().unwrap();
                // A repeat invocation replaces the tool's previous slot
                // rather than appending across invocations
                if let Some(slot) = citations.iter_mut().find(|(n, _)| n == name) {
                    slot.1 = sources;
                } else {
                    citations.push((name.to_string(), sources));
                }
                text
            }
            Err(e) => {
                warn!(tool = %name, error = %e, "Tool execution failed");
                format!("Tool error: {}", e)
            }
        }
    }

    /// Citations produced by the tool invocations of the current turn,
    /// in execution order.
    pub fn collect_citations(&self) -> Vec<Source> {
        let citations = self.citations.lock().unwrap();
        citations.iter().flat_map(|(_, sources)| sources.clone()).collect()
    }

    /// Reset the citation accumulator for the next turn.
    pub fn clear_citations(&self) {
        self.citations.lock().unwrap().clear();
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
