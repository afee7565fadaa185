//! Pensum - Course Material Q&A with Tool Calling
//!
//! A library for answering natural-language questions about a corpus of
//! course transcripts. Per query, a completion model decides whether to
//! call a retrieval capability (content search or course outline) before
//! answering.
//!
//! The name "Pensum" comes from the Norwegian word for required course
//! reading.
//!
//! # Overview
//!
//! Pensum mediates between a completion service and retrieval capabilities:
//!
//! - The model sees tool definitions and may answer directly or request
//!   one or more tool invocations
//! - Tool results are fed back for a single follow-up completion
//! - Citations collected during tool execution are returned alongside the
//!   answer
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `completion` - Completion service protocol and client
//! - `store` - Course store abstraction (catalog + content chunks)
//! - `tools` - Tool capability interface, registry, and the two tools
//! - `generator` - Two-phase tool-use orchestration
//! - `session` - Conversation session tracking
//! - `coordinator` - Top-level query coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use pensum::config::Settings;
//! use pensum::coordinator::QueryCoordinator;
//! use pensum::completion::AnthropicClient;
//! use pensum::store::MemoryCourseStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pensum::Result<()> {
//!     let settings = Settings::default();
//!     let store = Arc::new(MemoryCourseStore::new(settings.search.max_results));
//!     let client = Arc::new(AnthropicClient::new(&settings.completion)?);
//!     let coordinator = QueryCoordinator::new(settings, client, store)?;
//!
//!     let outcome = coordinator.query("What is covered in lesson 1?", None).await?;
//!     println!("{}", outcome.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod generator;
pub mod session;
pub mod store;
pub mod tools;

pub use error::{PensumError, Result};
