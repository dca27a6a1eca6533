//! Tool trait and shared tool types.

use std::time::Duration;

use async_trait::async_trait;

/// Errors a tool can produce during execution.
///
/// Every variant is captured into a failed [`crate::agent::ToolResult`]
/// by the invoker; none of them propagate to the session loop.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Tool is not configured: {0}")]
    NotConfigured(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for ToolError {
    fn from(e: reqwest::Error) -> Self {
        ToolError::Http(e.to_string())
    }
}

/// Output from a successful tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Structured result payload.
    pub result: serde_json::Value,
    /// How long the execution took.
    pub duration: Duration,
}

impl ToolOutput {
    /// Create output from a plain text result.
    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self {
            result: serde_json::Value::String(content.into()),
            duration,
        }
    }

    /// Create output from a structured result.
    pub fn success(result: serde_json::Value, duration: Duration) -> Self {
        Self { result, duration }
    }
}

/// Description of a tool as presented to the LLM in the selection prompt.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// An external data-fetching capability invocable with structured arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (the registry key).
    fn name(&self) -> &str;

    /// Human/LLM-readable description of what the tool does.
    fn description(&self) -> &str;

    /// JSON schema for the tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: serde_json::Value) -> Result<ToolOutput, ToolError>;
}

/// Extract a required string parameter.
pub fn require_str<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingParameter(key.to_string()))
}

/// Extract a required string parameter, accepting any of the given aliases.
///
/// The selection stage maps a bare `"input"` field from the model onto the
/// arguments map, so every builtin tool accepts `input` as an alias for its
/// primary parameter.
pub fn require_str_any<'a>(
    params: &'a serde_json::Value,
    keys: &[&str],
) -> Result<&'a str, ToolError> {
    keys.iter()
        .find_map(|key| params.get(*key).and_then(|v| v.as_str()))
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ToolError::MissingParameter(keys.join("|")))
}
