//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use super::types::AgentToolParameters;
use crate::error::LookoutError;

/// A lookup capability the reasoning engine may call by name.
///
/// `name` and `description` are read by the remote model, not by code, so
/// they should say plainly what the tool is good for.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema parameters.
    fn parameters(&self) -> &AgentToolParameters;

    /// Run the tool on a free-text query.
    async fn invoke(&self, query: &str) -> Result<String, LookoutError>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<String, LookoutError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct AgentTool {
    name: String,
    description: String,
    parameters: AgentToolParameters,
    handler: Arc<ToolHandler>,
}

impl AgentTool {
    /// Create a query tool from a closure.
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, LookoutError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: AgentToolParameters::query("The search query"),
            handler: Arc::new(move |query| Box::pin(handler(query))),
        }
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn invoke(&self, query: &str) -> Result<String, LookoutError> {
        (self.handler)(query.to_string()).await
    }
}

impl std::fmt::Debug for AgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
