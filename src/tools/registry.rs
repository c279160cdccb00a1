//! Name-keyed tool registry with a total `invoke`.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tracing::warn;

use super::lookup::{ArxivLookup, DuckDuckGoSearch, WikipediaLookup};
use super::tool::Tool;
use crate::config::{LookoutConfig, DEFAULT_TOOL_TIMEOUT};
use crate::error::LookoutError;
use crate::provider::ToolDefinition;
use crate::util::timeout::with_timeout;

/// Text result of one tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutcome {
    pub content: String,
    /// True when the content is a failure message rather than tool output.
    pub is_error: bool,
}

/// Immutable set of tools, built once and shared read-only by every dispatch.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
    timeout: Duration,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
            timeout: DEFAULT_TOOL_TIMEOUT,
        }
    }

    /// The web search, paper and encyclopedia tools, configured from `config`.
    pub fn standard(config: &LookoutConfig) -> Self {
        Self::new()
            .with_timeout(config.tool_timeout)
            .with(Arc::new(DuckDuckGoSearch::new(config.base_url("duckduckgo"))))
            .with(Arc::new(ArxivLookup::new(config.base_url("arxiv"), config.lookup)))
            .with(Arc::new(WikipediaLookup::new(config.base_url("wikipedia"), config.lookup)))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a tool; a later tool with the same name replaces the earlier one.
    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    /// Add a tool, rejecting duplicate names.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), LookoutError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(LookoutError::InvalidArgument(format!(
                "Tool '{name}' is already registered"
            )));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Name, description and schema of every tool, for the model request.
    pub fn manifest(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                parameters: t.parameters().schema.clone(),
            })
            .collect()
    }

    /// Invoke a tool by name. Never fails: unknown tools, tool errors,
    /// timeouts and panics all come back as readable text.
    pub async fn invoke(&self, name: &str, query: &str) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            return ToolOutcome {
                content: format!("Tool '{name}' not found. Available tools: {}", self.names().join(", ")),
                is_error: true,
            };
        };

        let run = AssertUnwindSafe(with_timeout(self.timeout, tool.invoke(query))).catch_unwind();
        match run.await {
            Ok(Ok(content)) => ToolOutcome {
                content,
                is_error: false,
            },
            Err(_panic) => {
                warn!(tool = name, "tool panicked");
                ToolOutcome {
                    content: format!("{name} failed: tool panicked"),
                    is_error: true,
                }
            }
            Ok(Err(err)) => {
                warn!(tool = name, error = %err, "tool invocation failed");
                ToolOutcome {
                    content: format!("{name} failed: {err}"),
                    is_error: true,
                }
            }
        }
    }
}
