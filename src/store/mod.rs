//! Course store abstraction for Pensum.
//!
//! Provides a trait-based interface to the catalog (course titles,
//! instructors, lesson structure) and the chunk-level content index. The
//! pipeline that populates the store lives outside this crate; the core
//! only consumes it.

mod memory;

pub use memory::MemoryCourseStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata carried by one retrieved content chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub course_title: String,
    pub lesson_number: Option<u32>,
}

/// Results of one content search.
///
/// Produced fresh per call, never cached. A store-level failure (such as
/// an unresolvable course filter) travels in `error` as user-facing text
/// rather than as an exception.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    pub documents: Vec<String>,
    pub metadata: Vec<ChunkMetadata>,
    pub distances: Vec<f32>,
    pub error: Option<String>,
}

impl SearchResults {
    /// Build an error-carrying result set.
    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// One lesson parsed from catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub lesson_number: u32,
    pub lesson_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_link: Option<String>,
}

impl Lesson {
    /// Decode a lesson blob into a typed sequence.
    ///
    /// Malformed input degrades to an empty sequence; a broken catalog
    /// entry must never surface a parse error through formatting code.
    pub fn parse_list(lessons_json: &str) -> Vec<Lesson> {
        serde_json::from_str(lessons_json).unwrap_or_default()
    }
}

/// A course catalog entry keyed by canonical title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub title: String,
    pub course_link: Option<String>,
    pub instructor: String,
    /// Lesson structure as a JSON blob; decode with [`Lesson::parse_list`].
    pub lessons_json: String,
}

/// Trait for course store implementations.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Search content chunks, optionally filtered by course and lesson.
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults;

    /// Deep link for a specific lesson, if one is known.
    async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String>;

    /// Resolve a partial or approximate course name to a canonical title.
    async fn resolve_course_name(&self, partial: &str) -> Option<String>;

    /// All canonical course titles in the catalog.
    async fn course_titles(&self) -> Vec<String>;

    /// Catalog entry for a canonical title.
    async fn catalog_entry(&self, title: &str) -> Option<CatalogEntry>;
}
