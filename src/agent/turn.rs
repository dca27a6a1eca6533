//! Per-turn value types.

use uuid::Uuid;

use crate::agent::invoker::ToolResult;
use crate::agent::selection::ToolDecision;
use crate::llm::ChunkStream;

/// Live output of one turn: the routing decision, the tool outcome (if a
/// tool ran), and the streaming reply still being generated.
pub struct TurnOutput {
    pub id: Uuid,
    pub decision: ToolDecision,
    pub tool_result: Option<ToolResult>,
    pub reply: ChunkStream,
}

/// A completed turn. Exists for one loop iteration only; no history is
/// carried across turns.
#[derive(Debug)]
pub struct ConversationTurn {
    pub id: Uuid,
    pub user_text: String,
    pub decision: ToolDecision,
    pub tool_result: Option<ToolResult>,
    pub reply: String,
}
