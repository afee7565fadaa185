//! Course outline tool.

use super::{Source, Tool, ToolOutput};
use crate::completion::ToolDefinition;
use crate::error::{PensumError, Result};
use crate::store::{CatalogEntry, CourseStore, Lesson};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Tool for retrieving a complete course outline with lesson structure.
pub struct OutlineTool {
    store: Arc<dyn CourseStore>,
}

#[derive(Debug, Deserialize)]
struct OutlineArgs {
    course_name: String,
}

impl OutlineTool {
    pub fn new(store: Arc<dyn CourseStore>) -> Self {
        Self { store }
    }

    /// Render the outline and build one citation per lesson that carries
    /// a link. Lessons without a link stay in the text listing but are
    /// skipped for citation purposes.
    fn format_outline(entry: &CatalogEntry, lessons: &[Lesson]) -> ToolOutput {
        let mut lines = vec![format!("Course: {}", entry.title)];
        if let Some(link) = &entry.course_link {
            lines.push(format!("Link: {}", link));
        }
        lines.push(format!("Instructor: {}", entry.instructor));
        lines.push(String::new());
        lines.push("Lessons:".to_string());

        let mut sources = Vec::new();
        if lessons.is_empty() {
            lines.push("- No lessons available".to_string());
        } else {
            for lesson in lessons {
                lines.push(format!(
                    "- Lesson {}: {}",
                    lesson.lesson_number, lesson.lesson_title
                ));
                if let Some(link) = &lesson.lesson_link {
                    sources.push(Source {
                        text: format!("{} - Lesson {}", entry.title, lesson.lesson_number),
                        link: Some(link.clone()),
                    });
                }
            }
        }

        ToolOutput {
            text: lines.join("\n"),
            sources,
        }
    }
}

#[async_trait]
impl Tool for OutlineTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "get_course_outline".to_string(),
            description: "Get complete course outline including course title, link, instructor, \
                and all lessons with numbers and titles. Use when users ask about course \
                structure or lesson list."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "course_name": {
                        "type": "string",
                        "description": "Course title (partial matches work, e.g. 'MCP', 'Introduction')"
                    }
                },
                "required": ["course_name"]
            }),
        }
    }

    async fn execute(&self, args: &Value) -> Result<ToolOutput> {
        let args: OutlineArgs = serde_json::from_value(args.clone())
            .map_err(|e| PensumError::Tool(format!("Invalid outline arguments: {}", e)))?;

        let Some(resolved) = self.store.resolve_course_name(&args.course_name).await else {
            let titles = self.store.course_titles().await;
            if titles.is_empty() {
                return Ok(ToolOutput::text_only("No courses available in the system."));
            }
            return Ok(ToolOutput::text_only(format!(
                "No course found matching '{}'. Available courses: {}",
                args.course_name,
                titles.join(", ")
            )));
        };

        let Some(entry) = self.store.catalog_entry(&resolved).await else {
            return Ok(ToolOutput::text_only(format!(
                "Error: Unable to retrieve metadata for '{}'",
                resolved
            )));
        };

        let lessons = Lesson::parse_list(&entry.lessons_json);
        Ok(Self::format_outline(&entry, &lessons))
    }
}
