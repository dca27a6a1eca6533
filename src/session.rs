//! Session Loop: a line-oriented REPL over the assistant pipeline.
//!
//! Two working states: `AwaitingInput` and `Processing`. A sentinel line
//! moves to `Terminal` and ends the process. A turn-level LLM failure is
//! logged and the loop returns to `AwaitingInput`; nothing short of the
//! sentinel terminates the session.

use std::io::Write;

use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::agent::{Assistant, ConversationTurn};
use crate::error::Error;

/// Inputs that end the session.
const SENTINELS: &[&str] = &["break", "exit", "quit"];

/// Control state of the session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Processing,
    Terminal,
}

/// Whether a line of input is a termination sentinel.
pub fn is_sentinel(line: &str) -> bool {
    let line = line.trim();
    SENTINELS.iter().any(|s| line.eq_ignore_ascii_case(s))
}

/// State transition on a line of user input.
pub fn on_input(state: SessionState, line: &str) -> SessionState {
    match state {
        SessionState::AwaitingInput if is_sentinel(line) => SessionState::Terminal,
        SessionState::AwaitingInput => SessionState::Processing,
        other => other,
    }
}

/// One interactive session over stdin/stdout.
pub struct Session {
    assistant: Assistant,
    state: SessionState,
}

impl Session {
    pub fn new(assistant: Assistant) -> Self {
        Self {
            assistant,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run the read-eval loop until the sentinel or EOF.
    pub async fn run(&mut self) -> Result<(), Error> {
        let stdin = tokio::io::stdin();
        let reader = BufReader::new(stdin);
        let mut lines = reader.lines();

        prompt();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                prompt();
                continue;
            }

            self.state = on_input(self.state, &line);
            if self.state == SessionState::Terminal {
                break;
            }

            if let Err(e) = self.process_turn(&line).await {
                tracing::error!("Turn aborted: {}", e);
                eprintln!("(turn failed: {})", e);
            }

            self.state = SessionState::AwaitingInput;
            prompt();
        }

        self.state = SessionState::Terminal;
        tracing::info!("Session ended");
        Ok(())
    }

    /// Drive one turn, printing reply chunks as they arrive.
    async fn process_turn(&self, user_text: &str) -> Result<(), Error> {
        let mut turn = self.assistant.run_turn(user_text).await?;

        let mut reply = String::new();
        while let Some(chunk) = turn.reply.next().await {
            match chunk {
                Ok(text) => {
                    print!("{}", text);
                    let _ = std::io::stdout().flush();
                    reply.push_str(&text);
                }
                Err(e) => {
                    // Partial output stays delivered; the turn just ends here.
                    println!();
                    return Err(e.into());
                }
            }
        }
        println!();

        let record = ConversationTurn {
            id: turn.id,
            user_text: user_text.to_string(),
            decision: turn.decision,
            tool_result: turn.tool_result,
            reply,
        };
        tracing::debug!(
            turn = %record.id,
            tool = record.decision.tool.as_deref().unwrap_or("none"),
            reply_chars = record.reply.len(),
            "Turn complete"
        );
        Ok(())
    }
}

fn prompt() {
    eprint!("Chat with Eve :- ");
}
