//! Ollama chat client.
//!
//! Talks to a local Ollama server via `/api/chat`. Streaming responses
//! arrive as newline-delimited JSON objects, one chunk per line, with a
//! final `"done": true` object marking end-of-stream.

use futures::{StreamExt, stream};
use serde::Deserialize;

use crate::error::LlmError;
use crate::llm::provider::{
    ChatMessage, ChunkStream, CompletionRequest, CompletionResponse, LlmProvider,
};

const PROVIDER: &str = "ollama";

/// Client for an Ollama server.
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url)
    }

    async fn send_chat(
        &self,
        messages: &[ChatMessage],
        stream: bool,
    ) -> Result<reqwest::Response, LlmError> {
        let payload = serde_json::json!({
            "model": &self.model,
            "messages": messages,
            "stream": stream,
        });

        let response = self
            .http
            .post(self.chat_url())
            .json(&payload)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("status {}: {}", status, body),
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Ollama completion");
        let response = self.send_chat(&request.messages, false).await?;

        let body: OllamaChatResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: e.to_string(),
            })?;

        let content = body
            .message
            .ok_or_else(|| LlmError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "missing message in response".to_string(),
            })?
            .content;

        Ok(CompletionResponse { content })
    }

    async fn complete_stream(&self, request: CompletionRequest) -> Result<ChunkStream, LlmError> {
        tracing::debug!(model = %self.model, messages = request.messages.len(), "Ollama streaming completion");
        let response = self.send_chat(&request.messages, true).await?;

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Result<String, LlmError>>();

        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            // Raw byte buffer: network chunks can split a line, or even a
            // single UTF-8 codepoint, at any byte boundary.
            let mut buffer: Vec<u8> = Vec::new();

            'outer: while let Some(item) = bytes.next().await {
                let chunk = match item {
                    Ok(c) => c,
                    Err(e) => {
                        let _ = tx.send(Err(LlmError::StreamFailed {
                            provider: PROVIDER.to_string(),
                            reason: e.to_string(),
                        }));
                        return;
                    }
                };
                buffer.extend_from_slice(&chunk);

                for line in drain_lines(&mut buffer) {
                    match parse_stream_line(&line) {
                        Ok(Some((content, done))) => {
                            if !content.is_empty() && tx.send(Ok(content)).is_err() {
                                return; // receiver dropped
                            }
                            if done {
                                break 'outer;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            let _ = tx.send(Err(e));
                            return;
                        }
                    }
                }
            }
        });

        let stream = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

/// Split complete lines out of the byte buffer, leaving any partial line
/// (including a partial codepoint) behind for the next chunk.
fn drain_lines(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        let line = line.trim_ascii().to_vec();
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Parse one NDJSON stream line into (content, done). Empty lines yield None.
fn parse_stream_line(line: &[u8]) -> Result<Option<(String, bool)>, LlmError> {
    if line.is_empty() {
        return Ok(None);
    }
    let chunk: OllamaStreamChunk =
        serde_json::from_slice(line).map_err(|e| LlmError::InvalidResponse {
            provider: PROVIDER.to_string(),
            reason: format!("bad stream chunk: {}", e),
        })?;
    let content = chunk.message.map(|m| m.content).unwrap_or_default();
    Ok(Some((content, chunk.done)))
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: Option<OllamaMessage>,
}

#[derive(Deserialize)]
struct OllamaStreamChunk {
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
