//! Configuration types and default prompts.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::tools::tool::ToolDefinition;

/// Default Ollama server address.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model identifier.
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// Default budget for a single tool invocation.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(15);

/// System prompt for the response-generation stage.
pub const DEFAULT_RESPONDER_PROMPT: &str = "\
You are Eve, a helpful assistant. You are given the user's message and, \
when a tool was used, the tool's result. Compose a natural, concise reply \
that answers the user using the tool data when it is present. If the tool \
failed, apologize briefly and say what could not be fetched. Never mention \
tools, JSON, or internal machinery.";

/// Fixed header of the tool-selection prompt; the tool catalog is appended.
const SELECTION_PROMPT_HEADER: &str = "\
You are a tool router. Decide whether the user's message needs one of the \
tools below. Reply with exactly one JSON object and nothing else.\n\
To call a tool: {\"tool\": \"<name>\", \"args\": {<parameters>}}\n\
If no tool is needed: {\"tool\": \"none\"}\n\n\
Available tools:";

/// Assistant configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Model identifier passed to Ollama.
    pub model: String,
    /// Base URL of the Ollama server.
    pub ollama_url: String,
    /// Override for the tool-selection system prompt.
    pub selection_prompt: Option<String>,
    /// Override for the response-generation system prompt.
    pub responder_prompt: Option<String>,
    /// Budget for a single tool invocation.
    pub tool_timeout: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            selection_prompt: None,
            responder_prompt: None,
            tool_timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }
}

impl AssistantConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let tool_timeout = match std::env::var("EVE_TOOL_TIMEOUT_SECS") {
            Ok(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                    key: "EVE_TOOL_TIMEOUT_SECS".to_string(),
                    message: format!("expected an integer number of seconds, got {:?}", raw),
                })?;
                Duration::from_secs(secs)
            }
            Err(_) => DEFAULT_TOOL_TIMEOUT,
        };

        Ok(Self {
            model: std::env::var("EVE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            ollama_url: std::env::var("OLLAMA_URL")
                .unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string()),
            selection_prompt: std::env::var("SYSTEM_PROMPT_TOOL").ok(),
            responder_prompt: std::env::var("SYSTEM_PROMPT_RESPONDER").ok(),
            tool_timeout,
        })
    }
}

/// API keys for the tool providers.
///
/// All keys are optional at startup: a missing key makes the affected
/// tool fail at invocation time instead of blocking the whole process.
#[derive(Default)]
pub struct ToolKeys {
    pub weather: Option<SecretString>,
    pub news: Option<SecretString>,
    pub search: Option<SecretString>,
    pub search_cx: Option<String>,
}

impl ToolKeys {
    /// Load tool provider credentials from the environment.
    pub fn from_env() -> Self {
        Self {
            weather: secret_var("WEATHER_API_KEY"),
            news: secret_var("NEWS_API_KEY"),
            search: secret_var("SEARCH_API_KEY"),
            search_cx: std::env::var("SEARCH_CSX_ID").ok().filter(|v| !v.is_empty()),
        }
    }
}

fn secret_var(name: &str) -> Option<SecretString> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Render the tool-selection system prompt for the given tool catalog.
pub fn render_selection_prompt(tools: &[ToolDefinition]) -> String {
    let mut prompt = String::from(SELECTION_PROMPT_HEADER);
    for tool in tools {
        prompt.push_str(&format!(
            "\n- {}: {}\n  parameters: {}",
            tool.name, tool.description, tool.parameters
        ));
    }
    prompt
}
