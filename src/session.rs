//! Conversation session tracking.
//!
//! Sessions hold past query/answer exchanges so follow-up questions carry
//! context. The orchestration core only ever sees a session as a rendered
//! history string.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// One completed query/answer exchange.
#[derive(Debug, Clone)]
struct Exchange {
    user: String,
    assistant: String,
    at: DateTime<Utc>,
}

/// Trait for session store implementations.
pub trait SessionStore: Send + Sync {
    /// Create a new session and return its identifier.
    fn create_session(&self) -> String;

    /// Rendered history for a session, or `None` if the session is
    /// unknown or has no exchanges yet.
    fn history(&self, session_id: &str) -> Option<String>;

    /// Record one exchange, trimming the session to its history bound.
    fn add_exchange(&self, session_id: &str, user_message: &str, assistant_message: &str);
}

/// In-memory session store bounded to `max_history` exchanges per session.
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, Vec<Exchange>>>,
    max_history: usize,
}

impl MemorySessionStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_history,
        }
    }

    /// Timestamp of the most recent exchange in a session.
    pub fn last_activity(&self, session_id: &str) -> Option<DateTime<Utc>> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(session_id)?.last().map(|e| e.at)
    }
}

impl SessionStore for MemorySessionStore {
    fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(id.clone(), Vec::new());
        id
    }

    fn history(&self, session_id: &str) -> Option<String> {
        let sessions = self.sessions.lock().unwrap();
        let exchanges = sessions.get(session_id)?;
        if exchanges.is_empty() {
            return None;
        }

        let rendered = exchanges
            .iter()
            .map(|e| format!("User: {}\nAssistant: {}", e.user, e.assistant))
            .collect::<Vec<_>>()
            .join("\n");
        Some(rendered)
    }

    fn add_exchange(&self, session_id: &str, user_message: &str, assistant_message: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let exchanges = sessions.entry(session_id.to_string()).or_default();

        exchanges.push(Exchange {
            user: user_message.to_string(),
            assistant: assistant_message.to_string(),
            at: Utc::now(),
        });

        if exchanges.len() > self.max_history {
            let excess = exchanges.len() - self.max_history;
            exchanges.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_has_no_history() {
        let store = MemorySessionStore::new(2);
        let id = store.create_session();
        assert!(store.history(&id).is_none());
        assert!(store.history("unknown").is_none());
    }

    #[test]
    fn test_history_renders_user_assistant_lines() {
        let store = MemorySessionStore::new(2);
        let id = store.create_session();
        store.add_exchange(&id, "What is Python?", "Python is a programming language.");

        assert_eq!(
            store.history(&id).unwrap(),
            "User: What is Python?\nAssistant: Python is a programming language."
        );
    }

    #[test]
    fn test_history_trims_to_max_exchanges() {
        let store = MemorySessionStore::new(2);
        let id = store.create_session();
        store.add_exchange(&id, "q1", "a1");
        store.add_exchange(&id, "q2", "a2");
        store.add_exchange(&id, "q3", "a3");

        let history = store.history(&id).unwrap();
        assert!(!history.contains("q1"));
        assert!(history.contains("q2"));
        assert!(history.contains("q3"));
    }

    #[test]
    fn test_add_exchange_creates_missing_session() {
        let store = MemorySessionStore::new(2);
        store.add_exchange("fresh", "hello", "hi");
        assert!(store.history("fresh").unwrap().contains("hello"));
        assert!(store.last_activity("fresh").is_some());
    }
}
