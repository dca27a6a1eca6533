//! Tool Invocation: registry lookup plus a bounded execution budget.

use std::sync::Arc;
use std::time::Duration;

use crate::agent::selection::ToolDecision;
use crate::tools::ToolRegistry;

/// Outcome of one tool invocation.
///
/// Failures are data, not errors: provider faults, missing credentials,
/// unknown tool names, and timeouts all end up here so the responder can
/// phrase a graceful reply.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub success: bool,
    pub payload: serde_json::Value,
    pub error: Option<String>,
}

impl ToolResult {
    pub fn ok(payload: serde_json::Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: serde_json::Value::Null,
            error: Some(error.into()),
        }
    }

    /// Payload rendered as text for the responder prompt.
    pub fn payload_text(&self) -> String {
        match &self.payload {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Executes tool decisions against the registry under a timeout.
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Invoke the decision's tool, capturing every failure into the result.
    ///
    /// An absent or unregistered tool name returns a failed result without
    /// touching the network.
    pub async fn invoke(&self, decision: &ToolDecision) -> ToolResult {
        let Some(name) = decision.tool.as_deref() else {
            return ToolResult::failed("no tool selected");
        };

        let Some(tool) = self.registry.get(name) else {
            tracing::warn!(tool = %name, "Model selected an unregistered tool");
            return ToolResult::failed(format!("unknown tool: {}", name));
        };

        let params = decision.arguments_json();
        tracing::info!(tool = %name, "Invoking tool");

        match tokio::time::timeout(self.timeout, tool.execute(params)).await {
            Ok(Ok(output)) => {
                tracing::debug!(tool = %name, duration = ?output.duration, "Tool succeeded");
                ToolResult::ok(output.result)
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = %name, error = %e, "Tool failed");
                ToolResult::failed(e.to_string())
            }
            Err(_) => {
                tracing::warn!(tool = %name, timeout = ?self.timeout, "Tool timed out");
                ToolResult::failed(format!("{} timed out after {:?}", name, self.timeout))
            }
        }
    }
}
