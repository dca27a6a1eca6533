//! The two-stage dispatch pipeline.
//!
//! Stage one asks the model whether a tool should run (tool selection);
//! stage two streams the final reply, with the tool's outcome folded into
//! the prompt. The intermediate [`ToolDecision`] and [`ToolResult`] values
//! are explicit so each stage stays independently testable.

pub mod invoker;
pub mod selection;
pub mod turn;

pub use invoker::{ToolInvoker, ToolResult};
pub use selection::{ToolDecision, parse_decision};
pub use turn::{ConversationTurn, TurnOutput};

use std::sync::Arc;

use uuid::Uuid;

use crate::config::{AssistantConfig, DEFAULT_RESPONDER_PROMPT, render_selection_prompt};
use crate::error::LlmError;
use crate::llm::{ChatMessage, ChunkStream, CompletionRequest, LlmProvider};
use crate::tools::ToolRegistry;

/// Tool payloads longer than this are cut before entering the responder
/// prompt; small local models drown in long context.
const MAX_TOOL_CONTEXT_CHARS: usize = 4000;

/// The assistant pipeline: select a tool, invoke it, compose the reply.
pub struct Assistant {
    llm: Arc<dyn LlmProvider>,
    invoker: ToolInvoker,
    selection_prompt: String,
    responder_prompt: String,
}

impl Assistant {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: &AssistantConfig,
    ) -> Self {
        let selection_prompt = config
            .selection_prompt
            .clone()
            .unwrap_or_else(|| render_selection_prompt(&tools.tool_definitions()));
        let responder_prompt = config
            .responder_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_RESPONDER_PROMPT.to_string());
        let invoker = ToolInvoker::new(tools, config.tool_timeout);

        Self {
            llm,
            invoker,
            selection_prompt,
            responder_prompt,
        }
    }

    /// Tool-Selection Stage: one non-streamed completion, parsed into a
    /// decision. Only an unreachable model propagates as an error; garbled
    /// output degrades to "no tool".
    pub async fn select_tool(&self, user_text: &str) -> Result<ToolDecision, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(&self.selection_prompt),
            ChatMessage::user(user_text),
        ]);
        let response = self.llm.complete(request).await?;
        let decision = parse_decision(&response.content);
        tracing::debug!(?decision, "Tool selection");
        Ok(decision)
    }

    /// Tool Invocation. Returns `None` when the decision was "no tool".
    pub async fn invoke(&self, decision: &ToolDecision) -> Option<ToolResult> {
        if decision.is_no_tool() {
            return None;
        }
        Some(self.invoker.invoke(decision).await)
    }

    /// Response-Generation Stage: a streamed completion over the user text
    /// plus the tool outcome.
    pub async fn respond(
        &self,
        user_text: &str,
        tool_result: Option<&ToolResult>,
    ) -> Result<ChunkStream, LlmError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(&self.responder_prompt),
            ChatMessage::user(tool_context(user_text, tool_result)),
        ]);
        self.llm.complete_stream(request).await
    }

    /// Drive one full turn: select, invoke, start the reply stream.
    pub async fn run_turn(&self, user_text: &str) -> Result<TurnOutput, LlmError> {
        let id = Uuid::new_v4();
        tracing::debug!(turn = %id, chars = user_text.len(), "Turn started");

        let decision = self.select_tool(user_text).await?;
        let tool_result = self.invoke(&decision).await;
        let reply = self.respond(user_text, tool_result.as_ref()).await?;

        Ok(TurnOutput {
            id,
            decision,
            tool_result,
            reply,
        })
    }
}

/// Build the responder's user message from the utterance and tool outcome.
fn tool_context(user_text: &str, tool_result: Option<&ToolResult>) -> String {
    match tool_result {
        None => format!(
            "User message:\n{}\n\nNo tool was used. Answer directly.",
            user_text
        ),
        Some(result) if result.success => format!(
            "User message:\n{}\n\nTool succeeded. Tool output:\n{}",
            user_text,
            truncate_payload(&result.payload_text())
        ),
        Some(result) => format!(
            "User message:\n{}\n\nTool failed: {}. Acknowledge briefly that the data could not be fetched.",
            user_text,
            result.error.as_deref().unwrap_or("unknown error")
        ),
    }
}

fn truncate_payload(text: &str) -> String {
    if text.chars().count() <= MAX_TOOL_CONTEXT_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_TOOL_CONTEXT_CHARS).collect();
    format!("{}\n... [truncated]", cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_context_no_tool() {
        let ctx = tool_context("Tell me a joke", None);
        assert!(ctx.contains("Tell me a joke"));
        assert!(ctx.contains("No tool was used"));
    }

    #[test]
    fn test_tool_context_success_includes_payload() {
        let result = ToolResult::ok(serde_json::json!("Sunny, 21C in Paris"));
        let ctx = tool_context("Weather in Paris?", Some(&result));
        assert!(ctx.contains("Tool succeeded"));
        assert!(ctx.contains("Sunny, 21C in Paris"));
    }

    #[test]
    fn test_tool_context_failure_includes_error() {
        let result = ToolResult::failed("status 401: bad key");
        let ctx = tool_context("Weather in Paris?", Some(&result));
        assert!(ctx.contains("Tool failed"));
        assert!(ctx.contains("status 401"));
        assert!(ctx.contains("could not be fetched"));
    }

    #[test]
    fn test_truncate_payload_short_unchanged() {
        assert_eq!(truncate_payload("short"), "short");
    }

    #[test]
    fn test_truncate_payload_long_is_cut() {
        let long = "x".repeat(MAX_TOOL_CONTEXT_CHARS + 500);
        let cut = truncate_payload(&long);
        assert!(cut.len() < long.len());
        assert!(cut.ends_with("[truncated]"));
    }

    #[test]
    fn test_truncate_payload_multibyte_safe() {
        let long = "é".repeat(MAX_TOOL_CONTEXT_CHARS + 10);
        let cut = truncate_payload(&long);
        assert!(cut.ends_with("[truncated]"));
    }
}
