//! LLM provider abstraction.
//!
//! Two request shapes exist: a single-shot completion returning the full
//! text, and a streaming completion yielding ordered text chunks until the
//! provider signals end-of-stream.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Request for a completion.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self { messages }
    }
}

/// Response from a single-shot completion.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}

/// Ordered, finite stream of text chunks from a streaming completion.
///
/// Chunks arrive in generation order; the stream terminates when the
/// provider signals completion. A mid-stream failure yields an `Err`
/// item after whatever text was already delivered.
pub type ChunkStream = BoxStream<'static, Result<String, LlmError>>;

/// A language-model service.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name of the configured model.
    fn model_name(&self) -> &str;

    /// Single-shot completion returning the full text.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Streaming completion returning ordered text chunks.
    async fn complete_stream(&self, request: CompletionRequest) -> Result<ChunkStream, LlmError>;
}
