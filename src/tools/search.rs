//! Content search tool.

use super::{Source, Tool, ToolOutput};
use crate::completion::ToolDefinition;
use crate::error::{PensumError, Result};
use crate::store::{CourseStore, SearchResults};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool for searching course content with smart course name matching and
/// lesson filtering.
pub struct SearchTool {
    store: Arc<dyn CourseStore>,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
    course_name: Option<String>,
    lesson_number: Option<u32>,
}

impl SearchTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    /// Render hits with course/lesson context headers and resolve one
    /// citation per hit, in hit order.
    async fn format_results(&self, results: &SearchResults) -> ToolOutput {
        let mut rendered = Vec::new();
        let mut sources = Vec::new();

        for (doc, meta) in results.documents.iter().zip(results.metadata.iter()) {
            let mut header = format!("[{}", meta.course_title);
            let mut source_text = meta.course_title.clone();
            if let Some(lesson) = meta.lesson_number {
                header.push_str(&format!(" - Lesson {}", lesson));
                source_text.push_str(&format!(" - Lesson {}", lesson));
            }
            header.push(']');

            // Absence of a deep link is not an error; the citation simply
            // carries no link
            let link = match meta.lesson_number {
                Some(lesson) => self.store.get_lesson_link(&meta.course_title, lesson).await,
                None => None,
            };

            sources.push(Source {
                text: source_text,
                link,
            });
            rendered.push(format!("{}\n{}", header, doc));
        }

        ToolOutput {
            text: rendered.join("\n\n"),
            sources,
        }
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "search_course_content".to_string(),
            description: "Search course materials with smart course name matching and lesson filtering"
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to search for in the course content"
                    },
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    },
                    "lesson_number": {
                        "type": "integer",
                        "description": "Specific lesson number to search within (e.g. 1, 2, 3)"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput> {
        let args: SearchArgs = serde_json::from_value(args.clone())
            .map_err(|e| PensumError::Tool(format!("Invalid search arguments: {}", e)))?;

        let results = self
            .store
            .search(&args.query, args.course_name.as_deref(), args.lesson_number)
            .await;

        // Store-reported errors are user-facing text, surfaced verbatim
        if let Some(error) = results.error {
            return Ok(ToolOutput::text_only(error));
        }

        if results.is_empty() {
            let mut filter_info = String::new();
            if let Some(course) = &args.course_name {
                filter_info.push_str(&format!(" in course '{}'", course));
            }
            if let Some(lesson) = args.lesson_number {
                filter_info.push_str(&format!(" in lesson {}", lesson));
            }
            return Ok(ToolOutput::text_only(format!(
                "No relevant content found{}.",
                filter_info
            )));
        }

        Ok(self.format_results(&results).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogEntry, ChunkMetadata};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Store stub returning scripted search results and lesson links,
    /// recording the filters it was called with.
    struct StubStore {
        results: SearchResults,
        links: HashMap<(String, u32), String>,
        calls: Mutex<Vec<(String, Option<String>, Option<u32>)>>,
    }

    impl StubStore {
        fn new(results: SearchResults) -> Self {
            Self {
                results,
                links: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_link(mut self, course: &str, lesson: u32, link: &str) -> Self {
            self.links
                .insert((course.to_string(), lesson), link.to_string());
            self
        }
    }

    #[async_trait]
    impl CourseStore for StubStore {
        async fn search(
            &self,
            query: &str,
            course_name: Option<&str>,
            lesson_number: Option<u32>,
        ) -> SearchResults {
            self.calls.lock().unwrap().push((
                query.to_string(),
                course_name.map(str::to_string),
                lesson_number,
            ));
            self.results.clone()
        }

        async fn get_lesson_link(&self, course_title: &str, lesson_number: u32) -> Option<String> {
            self.links
                .get(&(course_title.to_string(), lesson_number))
                .cloned()
        }

        async fn resolve_course_name(&self, _partial: &str) -> Option<String> {
            None
        }

        async fn course_titles(&self) -> Vec<String> {
            Vec::new()
        }

        async fn catalog_entry(&self, _title: &str) -> Option<CatalogEntry> {
            None
        }
    }

    fn two_hit_results() -> SearchResults {
        SearchResults {
            documents: vec![
                "This is content from lesson 1 about basic concepts.".to_string(),
                "This is content from lesson 2 about advanced topics.".to_string(),
            ],
            metadata: vec![
                ChunkMetadata {
                    course_title: "Test Course".to_string(),
                    lesson_number: Some(1),
                },
                ChunkMetadata {
                    course_title: "Test Course".to_string(),
                    lesson_number: Some(2),
                },
            ],
            distances: vec![0.1, 0.15],
            error: None,
        }
    }

    #[tokio::test]
    async fn test_successful_search_renders_headers_and_sources() {
        let store = Arc::new(
            StubStore::new(two_hit_results())
                .with_link("Test Course", 1, "https://example.com/lesson1")
                .with_link("Test Course", 2, "https://example.com/lesson2"),
        );
        let tool = SearchTool::new(store.clone());

        let output = tool.execute(&json!({"query": "test query"})).await.unwrap();

        assert!(output.text.contains("[Test Course - Lesson 1]"));
        assert!(output.text.contains("[Test Course - Lesson 2]"));
        assert!(output.text.contains("basic concepts"));
        assert!(output.text.contains("advanced topics"));
        // Hits joined with a blank line
        assert_eq!(output.text.split("\n\n").count(), 2);

        assert_eq!(output.sources.len(), 2);
        assert_eq!(output.sources[0].text, "Test Course - Lesson 1");
        assert_eq!(
            output.sources[0].link.as_deref(),
            Some("https://example.com/lesson1")
        );
        assert_eq!(output.sources[1].text, "Test Course - Lesson 2");

        let calls = store.calls.lock().unwrap();
        assert_eq!(calls[0], ("test query".to_string(), None, None));
    }

    #[tokio::test]
    async fn test_filters_forwarded_to_store() {
        let store = Arc::new(StubStore::new(two_hit_results()));
        let tool = SearchTool::new(store.clone());

        tool.execute(&json!({
            "query": "decorators",
            "course_name": "Python Basics",
            "lesson_number": 3
        }))
        .await
        .unwrap();

        let calls = store.calls.lock().unwrap();
        assert_eq!(
            calls[0],
            (
                "decorators".to_string(),
                Some("Python Basics".to_string()),
                Some(3)
            )
        );
    }

    #[tokio::test]
    async fn test_empty_results_without_filters() {
        let store = Arc::new(StubStore::new(SearchResults::default()));
        let tool = SearchTool::new(store);

        let output = tool
            .execute(&json!({"query": "nonexistent topic"}))
            .await
            .unwrap();
        assert_eq!(output.text, "No relevant content found.");
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_empty_results_mention_filters() {
        let store = Arc::new(StubStore::new(SearchResults::default()));
        let tool = SearchTool::new(store);

        let output = tool
            .execute(&json!({"query": "test", "course_name": "MCP", "lesson_number": 2}))
            .await
            .unwrap();
        assert_eq!(
            output.text,
            "No relevant content found in course 'MCP' in lesson 2."
        );
    }

    #[tokio::test]
    async fn test_store_error_surfaces_verbatim() {
        let store = Arc::new(StubStore::new(SearchResults::from_error(
            "No course found matching 'NonExistentCourse'",
        )));
        let tool = SearchTool::new(store);

        let output = tool.execute(&json!({"query": "test"})).await.unwrap();
        assert_eq!(output.text, "No course found matching 'NonExistentCourse'");
        assert!(output.sources.is_empty());
    }

    #[tokio::test]
    async fn test_missing_lesson_links_leave_sources_linkless() {
        // Only lesson 1 has a resolvable link
        let store = Arc::new(
            StubStore::new(two_hit_results()).with_link("Test Course", 1, "https://example.com/l1"),
        );
        let tool = SearchTool::new(store);

        let output = tool.execute(&json!({"query": "test"})).await.unwrap();
        assert_eq!(output.sources.len(), 2);
        assert_eq!(output.sources[0].link.as_deref(), Some("https://example.com/l1"));
        assert!(output.sources[1].link.is_none());
    }

    #[tokio::test]
    async fn test_hit_without_lesson_number_gets_bare_header() {
        let results = SearchResults {
            documents: vec!["Course-level overview text.".to_string()],
            metadata: vec![ChunkMetadata {
                course_title: "Test Course".to_string(),
                lesson_number: None,
            }],
            distances: vec![0.2],
            error: None,
        };
        let tool = SearchTool::new(Arc::new(StubStore::new(results)));

        let output = tool.execute(&json!({"query": "overview"})).await.unwrap();
        assert!(output.text.starts_with("[Test Course]\n"));
        assert_eq!(output.sources[0].text, "Test Course");
        assert!(output.sources[0].link.is_none());
    }

    #[tokio::test]
    async fn test_missing_query_is_a_tool_error() {
        let tool = SearchTool::new(Arc::new(StubStore::new(SearchResults::default())));
        let err = tool.execute(&json!({"course_name": "MCP"})).await.unwrap_err();
        assert!(matches!(err, PensumError::Tool(_)));
    }

    #[test]
    fn test_definition_schema() {
        let tool = SearchTool::new(Arc::new(StubStore::new(SearchResults::default())));
        let def = tool.definition();

        assert_eq!(def.name, "search_course_content");
        assert_eq!(def.input_schema["type"], "object");
        assert_eq!(def.input_schema["required"], json!(["query"]));
        assert_eq!(def.input_schema["properties"]["query"]["type"], "string");
        assert_eq!(
            def.input_schema["properties"]["lesson_number"]["type"],
            "integer"
        );
    }
}
