//! ToolCall - read-only record of one tool invocation
//!
//! The expertise tracker consumes a session's action log purely for
//! keyword/pattern domain detection; it never re-executes or mutates the
//! recorded calls. Arguments and results stay as raw JSON so detection can
//! match against their serialized text regardless of tool schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool invocation observed during an agent session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name as invoked (e.g. "cargo_build", "swap_tokens")
    pub name: String,

    /// Raw invocation arguments
    #[serde(default)]
    pub arguments: Value,

    /// Raw tool result, if the tool produced one
    #[serde(default)]
    pub result: Value,
}

impl ToolCall {
    /// Create a tool call record with arguments and no result
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
            result: Value::Null,
        }
    }

    /// Attach a result to the record
    pub fn with_result(mut self, result: Value) -> Self {
        self.result = result;
        self
    }

    /// Arguments serialized to lowercase text, for pattern matching
    pub fn arguments_text(&self) -> String {
        serde_json::to_string(&self.arguments)
            .unwrap_or_default()
            .to_lowercase()
    }

    /// Result serialized to lowercase text, for keyword matching
    pub fn result_text(&self) -> String {
        serde_json::to_string(&self.result)
            .unwrap_or_default()
            .to_lowercase()
    }
}
