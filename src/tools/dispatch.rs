//! Client-side tool dispatch table.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::types::ToolUse;

/// Callback handed to a tool handler to put an entry on the timeline.
///
/// Bound to the assistant message of the current send; calling it performs
/// `insert_tool_message(assistant, content, tool_name, loading = false)`.
pub struct ToolInsert<'a> {
    insert: &'a dyn Fn(&str, &str),
}

impl<'a> ToolInsert<'a> {
    pub fn new(insert: &'a dyn Fn(&str, &str)) -> Self {
        Self { insert }
    }

    pub fn insert(&self, content: &str, tool_name: &str) {
        (self.insert)(content, tool_name)
    }
}

/// Handler for one client-handled tool. Runs synchronously and must not block.
pub type ToolHandler = Arc<dyn Fn(&ToolUse, &ToolInsert<'_>) + Send + Sync>;

/// Immutable map from tool name to handler.
#[derive(Clone, Default)]
pub struct ToolDispatchTable {
    handlers: HashMap<String, ToolHandler>,
}

impl ToolDispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `name`, replacing any existing one.
    pub fn with_handler<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ToolUse, &ToolInsert<'_>) + Send + Sync + 'static,
    {
        self.handlers.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run the handler registered for `tool_use.tool_name`.
    ///
    /// Returns `false` when the name is not registered.
    pub fn dispatch(&self, tool_use: &ToolUse, insert: &ToolInsert<'_>) -> bool {
        match self.handlers.get(&tool_use.tool_name) {
            Some(handler) => {
                handler(tool_use, insert);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for ToolDispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("ToolDispatchTable")
            .field("handlers", &names)
            .finish()
    }
}
