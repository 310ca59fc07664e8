//! Blog-writing assistant: edits the open post through client-side tools.
//!
//! The post being edited is never ambient state; it is reached only
//! through the [`PostEditor`] handle passed to [`config`].

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::search_web_tool;
use crate::config::{ControllerConfig, ConverseSettings, SystemPromptFn};
use crate::tools::{ToolDefinition, ToolDispatchTable, ToolInsert, ToolSchema};
use crate::types::ToolUse;

pub const UPDATE_CONTENT_TOOL: &str = "update_post_content";
pub const UPDATE_METADATA_TOOL: &str = "update_post_metadata";

/// Title and body of the post currently open in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSnapshot {
    pub title: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub content: String,
}

/// Fields of a `update_post_metadata` call. Absent fields stay unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl MetadataUpdate {
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.excerpt.is_some() {
            fields.push("excerpt");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        fields
    }

    pub fn apply(&self, post: &mut PostSnapshot) {
        if let Some(title) = &self.title {
            post.title = title.clone();
        }
        if let Some(excerpt) = &self.excerpt {
            post.excerpt = excerpt.clone();
        }
        if let Some(tags) = &self.tags {
            post.tags = tags.clone();
        }
    }
}

/// Document state owned by the host editor.
pub trait PostEditor: Send + Sync {
    fn snapshot(&self) -> PostSnapshot;
    fn replace_content(&self, content: &str);
    fn update_metadata(&self, update: &MetadataUpdate);
}

/// [`PostEditor`] backed by an in-memory post.
#[derive(Debug, Default)]
pub struct MemoryPostEditor {
    post: Mutex<PostSnapshot>,
}

impl MemoryPostEditor {
    pub fn new(post: PostSnapshot) -> Self {
        Self {
            post: Mutex::new(post),
        }
    }
}

impl PostEditor for MemoryPostEditor {
    fn snapshot(&self) -> PostSnapshot {
        self.post
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_content(&self, content: &str) {
        self.post
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .content = content.to_string();
    }

    fn update_metadata(&self, update: &MetadataUpdate) {
        update.apply(&mut self.post.lock().unwrap_or_else(PoisonError::into_inner));
    }
}

/// Controller configuration for the blog assistant.
pub fn config(settings: &ConverseSettings, editor: Arc<dyn PostEditor>) -> ControllerConfig {
    ControllerConfig::builder()
        .maybe_backend(settings.backend())
        .tools(vec![
            update_content_tool(),
            update_metadata_tool(),
            search_web_tool(),
        ])
        .handlers(handlers(editor.clone()))
        .system_prompt(system_prompt(editor, settings.system_prompt.clone()))
        .maybe_max_tokens(settings.max_tokens)
        .build()
}

fn update_content_tool() -> ToolDefinition {
    ToolDefinition::new(
        UPDATE_CONTENT_TOOL,
        "Replace the full markdown body of the post being edited.",
        ToolSchema::object().string("content", "New markdown body", true),
    )
}

fn update_metadata_tool() -> ToolDefinition {
    ToolDefinition::new(
        UPDATE_METADATA_TOOL,
        "Update the title, excerpt or tags of the post being edited.",
        ToolSchema::object()
            .string("title", "New title", false)
            .string("excerpt", "New excerpt", false)
            .string_list("tags", "Replacement tag list", false),
    )
}

fn handlers(editor: Arc<dyn PostEditor>) -> ToolDispatchTable {
    let content_editor = editor.clone();
    ToolDispatchTable::new()
        .with_handler(UPDATE_CONTENT_TOOL, move |call, insert| {
            update_content(content_editor.as_ref(), call, insert)
        })
        .with_handler(UPDATE_METADATA_TOOL, move |call, insert| {
            update_metadata(editor.as_ref(), call, insert)
        })
}

fn update_content(editor: &dyn PostEditor, call: &ToolUse, insert: &ToolInsert<'_>) {
    match call.input_str("content") {
        Some(content) => {
            editor.replace_content(content);
            insert.insert("Updated post content", &call.tool_name);
        }
        None => {
            tracing::warn!(tool_name = %call.tool_name, "tool call without content");
            insert.insert("Could not update post content: missing content", &call.tool_name);
        }
    }
}

fn update_metadata(editor: &dyn PostEditor, call: &ToolUse, insert: &ToolInsert<'_>) {
    let update: MetadataUpdate = match serde_json::from_value(call.tool_input.clone()) {
        Ok(update) => update,
        Err(err) => {
            tracing::warn!(tool_name = %call.tool_name, error = %err, "invalid metadata update");
            insert.insert(
                &format!("Could not update post metadata: {err}"),
                &call.tool_name,
            );
            return;
        }
    };
    let fields = update.changed_fields();
    if fields.is_empty() {
        return;
    }
    editor.update_metadata(&update);
    insert.insert(
        &format!("Updated post metadata: {}", fields.join(", ")),
        &call.tool_name,
    );
}

fn system_prompt(editor: Arc<dyn PostEditor>, extra: Option<String>) -> SystemPromptFn {
    Arc::new(move || {
        let post = editor.snapshot();
        let mut prompt = String::from(
            "You are a writing assistant for a blog editor. Edit the open post only through \
the update_post_content and update_post_metadata tools.",
        );
        if let Some(extra) = &extra {
            prompt.push_str("\n\n");
            prompt.push_str(extra);
        }
        prompt.push_str("\n\nCurrent title: ");
        prompt.push_str(if post.title.is_empty() {
            "(untitled)"
        } else {
            &post.title
        });
        if !post.tags.is_empty() {
            prompt.push_str("\nTags: ");
            prompt.push_str(&post.tags.join(", "));
        }
        prompt.push_str("\n\nCurrent content:\n");
        prompt.push_str(&post.content);
        prompt
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn editor() -> Arc<MemoryPostEditor> {
        Arc::new(MemoryPostEditor::new(PostSnapshot {
            title: "Draft".into(),
            content: "Old body".into(),
            ..Default::default()
        }))
    }

    fn run(config: &ControllerConfig, call: ToolUse) -> Vec<(String, String)> {
        let inserted = Mutex::new(Vec::new());
        let record = |content: &str, name: &str| {
            inserted
                .lock()
                .unwrap()
                .push((content.to_string(), name.to_string()));
        };
        assert!(config.handlers.dispatch(&call, &ToolInsert::new(&record)));
        inserted.into_inner().unwrap()
    }

    #[test]
    fn content_tool_replaces_body() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let inserted = run(
            &config,
            ToolUse {
                tool_name: UPDATE_CONTENT_TOOL.into(),
                tool_input: json!({"content": "New body"}),
            },
        );
        assert_eq!(editor.snapshot().content, "New body");
        assert_eq!(
            inserted,
            vec![("Updated post content".to_string(), UPDATE_CONTENT_TOOL.to_string())]
        );
    }

    #[test]
    fn content_tool_without_content_reports_and_keeps_body() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let inserted = run(
            &config,
            ToolUse {
                tool_name: UPDATE_CONTENT_TOOL.into(),
                tool_input: json!({}),
            },
        );
        assert_eq!(editor.snapshot().content, "Old body");
        assert!(inserted[0].0.starts_with("Could not update post content"));
    }

    #[test]
    fn metadata_tool_lists_changed_fields() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let inserted = run(
            &config,
            ToolUse {
                tool_name: UPDATE_METADATA_TOOL.into(),
                tool_input: json!({"title": "Final", "tags": ["rust", "async"]}),
            },
        );
        let post = editor.snapshot();
        assert_eq!(post.title, "Final");
        assert_eq!(post.tags, vec!["rust".to_string(), "async".to_string()]);
        assert_eq!(inserted[0].0, "Updated post metadata: title, tags");
    }

    #[test]
    fn metadata_tool_with_nothing_to_change_inserts_nothing() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let inserted = run(
            &config,
            ToolUse {
                tool_name: UPDATE_METADATA_TOOL.into(),
                tool_input: json!({}),
            },
        );
        assert!(inserted.is_empty());
        assert_eq!(editor.snapshot().title, "Draft");
    }

    #[test]
    fn metadata_tool_rejects_malformed_input() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let inserted = run(
            &config,
            ToolUse {
                tool_name: UPDATE_METADATA_TOOL.into(),
                tool_input: json!({"tags": "not-a-list"}),
            },
        );
        assert!(inserted[0].0.starts_with("Could not update post metadata"));
    }

    #[test]
    fn system_prompt_reflects_current_post() {
        let editor = editor();
        let config = config(&ConverseSettings::default(), editor.clone());
        let prompt = config.render_system_prompt().unwrap();
        assert!(prompt.contains("Current title: Draft"));
        assert!(prompt.contains("Old body"));

        editor.replace_content("Rewritten");
        let prompt = config.render_system_prompt().unwrap();
        assert!(prompt.contains("Rewritten"));
    }
}
