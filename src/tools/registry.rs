//! Tool registry for managing available tools.
//!
//! The registry is populated once at startup and shared immutably
//! behind an `Arc` afterwards. An unknown lookup means "skip tool
//! invocation" for callers, never a fatal error.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tools::tool::{Tool, ToolDefinition};

/// Errors from registry construction.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Tool {0} is already registered")]
    Duplicate(String),
}

/// Registry of available tools.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Rejects a second registration under the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        tracing::debug!("Registered tool: {}", name);
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Check if a tool exists.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// List all tool names.
    pub fn list(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Get the number of registered tools.
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// Get tool definitions for rendering the selection prompt.
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        // Stable prompt text across runs.
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }
}
