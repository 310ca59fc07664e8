//! Tool schema types advertised to the backend.

use serde::{Deserialize, Serialize};

/// A tool the backend may call, as advertised in the request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the tool input.
    pub input_schema: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: ToolSchema,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema.into_value(),
        }
    }
}

/// Builder for object-shaped input schemas.
#[derive(Debug, Default)]
pub struct ToolSchema {
    properties: serde_json::Map<String, serde_json::Value>,
    required: Vec<String>,
}

impl ToolSchema {
    pub fn object() -> Self {
        Self::default()
    }

    /// Add a string property.
    pub fn string(self, name: impl Into<String>, description: impl Into<String>, required: bool) -> Self {
        self.property(
            name,
            serde_json::json!({
                "type": "string",
                "description": description.into(),
            }),
            required,
        )
    }

    /// Add an array-of-strings property.
    pub fn string_list(
        self,
        name: impl Into<String>,
        description: impl Into<String>,
        required: bool,
    ) -> Self {
        self.property(
            name,
            serde_json::json!({
                "type": "array",
                "items": { "type": "string" },
                "description": description.into(),
            }),
            required,
        )
    }

    fn property(mut self, name: impl Into<String>, schema: serde_json::Value, required: bool) -> Self {
        let name = name.into();
        self.properties.insert(name.clone(), schema);
        if required {
            self.required.push(name);
        }
        self
    }

    pub fn into_value(self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": self.properties,
            "required": self.required,
        })
    }
}
