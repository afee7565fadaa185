//! Top-level query coordination.
//!
//! Wires session history, the orchestrator, and citation collection around
//! one query: history in, answer out, citations collected then cleared,
//! exchange persisted.

use crate::completion::CompletionService;
use crate::config::Settings;
use crate::error::Result;
use crate::generator::ResponseGenerator;
use crate::session::{MemorySessionStore, SessionStore};
use crate::store::CourseStore;
use crate::tools::{OutlineTool, SearchTool, Source, ToolRegistry};
use std::sync::Arc;
use tracing::{info, instrument};

/// Answer plus the citations accumulated while producing it.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Coordinates one orchestrator run per query.
pub struct QueryCoordinator {
    generator: ResponseGenerator,
    registry: ToolRegistry,
    sessions: Arc<dyn SessionStore>,
}

impl QueryCoordinator {
    /// Build a coordinator with both retrieval tools registered.
    ///
    /// Registration failures are build-time invariant violations and are
    /// returned immediately rather than deferred to query time.
    pub fn new(
        settings: Settings,
        client: Arc<dyn CompletionService>,
        store: Arc<dyn CourseStore>,
    ) -> Result<Self> {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(SearchTool::new(store.clone())))?;
        registry.register(Arc::new(OutlineTool::new(store)))?;

        Ok(Self {
            generator: ResponseGenerator::new(client),
            registry,
            sessions: Arc::new(MemorySessionStore::new(settings.session.max_history)),
        })
    }

    /// Swap in a different session store.
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Create a new conversation session.
    pub fn create_session(&self) -> String {
        self.sessions.create_session()
    }

    /// Answer a question, optionally within a session.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn query(&self, query: &str, session_id: Option<&str>) -> Result<QueryOutcome> {
        let prompt = format!("Answer this question about course materials: {}", query);
        let history = session_id.and_then(|id| self.sessions.history(id));

        let answer = self
            .generator
            .generate(
                &prompt,
                history.as_deref(),
                self.registry.definitions(),
                &self.registry,
            )
            .await?;

        // Citations are read once per query, then cleared so they never
        // leak into the next one
        let sources = self.registry.collect_citations();
        self.registry.clear_citations();

        if let Some(id) = session_id {
            self.sessions.add_exchange(id, query, &answer);
        }

        info!(sources = sources.len(), "Query answered");
        Ok(QueryOutcome { answer, sources })
    }
}
