//! In-memory course store implementation.
//!
//! Useful for testing and small corpora. Content search is keyword based;
//! a production deployment would swap in an embedding-backed store behind
//! the same trait.

use super::{CatalogEntry, ChunkMetadata, CourseStore, Lesson, SearchResults};
use async_trait::async_trait;
use std::sync::RwLock;

/// A course registered in the in-memory catalog.
#[derive(Debug, Clone)]
struct CourseRecord {
    title: String,
    course_link: Option<String>,
    instructor: String,
    lessons: Vec<Lesson>,
}

/// One indexed content chunk.
#[derive(Debug, Clone)]
struct ContentChunk {
    course_title: String,
    lesson_number: Option<u32>,
    content: String,
}

/// In-memory course store.
pub struct MemoryCourseStore {
    courses: RwLock<Vec<CourseRecord>>,
    chunks: RwLock<Vec<ContentChunk>>,
    max_results: usize,
}

impl MemoryCourseStore {
    /// Create a new in-memory store returning at most `max_results` hits
    /// per search.
    pub fn new(max_results: usize) -> Self {
        Self {
            courses: RwLock::new(Vec::new()),
            chunks: RwLock::new(Vec::new()),
            max_results,
        }
    }

    /// Register a course in the catalog. Lessons keep their given order.
    pub fn add_course(
        &self,
        title: &str,
        course_link: Option<&str>,
        instructor: &str,
        lessons: Vec<Lesson>,
    ) {
        let mut courses = self.courses.write().unwrap();
        courses.push(CourseRecord {
            title: title.to_string(),
            course_link: course_link.map(str::to_string),
            instructor: instructor.to_string(),
            lessons,
        });
    }

    /// Index a content chunk under a course (and optionally a lesson).
    pub fn add_chunk(&self, course_title: &str, lesson_number: Option<u32>, content: &str) {
        let mut chunks = self.chunks.write().unwrap();
        chunks.push(ContentChunk {
            course_title: course_title.to_string(),
            lesson_number,
            content: content.to_string(),
        });
    }

    fn resolve(&self, partial: &str) -> Option<String> {
        let courses = self.courses.read().unwrap();
        let needle = partial.to_lowercase();

        // Exact match wins over substring match
        courses
            .iter()
            .find(|c| c.title.to_lowercase() == needle)
            .or_else(|| courses.iter().find(|c| c.title.to_lowercase().contains(&needle)))
            .map(|c| c.title.clone())
    }
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn search(
        &self,
        query: &str,
        course_name: Option<&str>,
        lesson_number: Option<u32>,
    ) -> SearchResults {
        // Resolve the course filter first so an unknown course becomes a
        // descriptive error rather than an empty result set.
        let course_filter = match course_name {
            Some(name) => match self.resolve(name) {
                Some(title) => Some(title),
                None => {
                    return SearchResults::from_error(format!(
                        "No course found matching '{}'",
                        name
                    ))
                }
            },
            None => None,
        };

        let chunks = self.chunks.read().unwrap();
        let terms: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let mut results = SearchResults::default();
        for chunk in chunks.iter() {
            if let Some(title) = &course_filter {
                if &chunk.course_title != title {
                    continue;
                }
            }
            if let Some(lesson) = lesson_number {
                if chunk.lesson_number != Some(lesson) {
                    continue;
                }
            }

            let haystack = chunk.content.to_lowercase();
            let matched = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
            if matched == 0 {
                continue;
            }

            results.documents.push(chunk.content.clone());
            results.metadata.push(ChunkMetadata {
                course_title: chunk.course_title.clone(),
                lesson_number: chunk.lesson_number,
            });
            // Fewer matched terms rank as farther away
            results.distances.push(1.0 - matched as f32 / terms.len().max(1) as f32);

            if results.documents.len() >= self.max_results {
                break;
            }
        }

        results
    }

    async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
        let courses = self.courses.read().unwrap();
        courses
            .iter()
            .find(|c| c.title == course_title)?
            .lessons
            .iter()
            .find(|l| l.lesson_number == lesson_number)?
            .lesson_link
            .clone()
    }

    async fn resolve_course_name(&self, partial: &str) -> Option<String> {
        self.resolve(partial)
    }

    async fn course_titles(&self) -> Vec<String> {
        let courses = self.courses.read().unwrap();
        courses.iter().map(|c| c.title.clone()).collect()
    }

    async fn catalog_entry(&self, title: &str) -> Option<CatalogEntry> {
        let courses = self.courses.read().unwrap();
        let course = courses.iter().find(|c| c.title == title)?;

        Some(CatalogEntry {
            title: course.title.clone(),
            course_link: course.course_link.clone(),
            instructor: course.instructor.clone(),
            lessons_json: serde_json::to_string(&course.lessons)
                .unwrap_or_else(|_| "[]".to_string()),
        })
    }
}
