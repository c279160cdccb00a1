//! Model provider trait and the Groq implementation.

pub mod groq;
pub mod http;
pub mod openai;

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::LookoutConfig;
use crate::error::LookoutError;
use crate::types::{GenerationSettings, ModelMessage, TextStreamDelta};

pub use groq::GroqProvider;
pub use openai::ChatCompletionsClient;

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Core trait implemented by model providers.
///
/// Streaming is the only mode: the engine needs tool calls and text as they
/// arrive, never a buffered response.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "groq").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate text (streaming).
    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, LookoutError>>, LookoutError>;
}

/// Create the provider described by the config.
///
/// Never fails on a missing credential; that surfaces on the first request.
pub fn create_provider(config: &LookoutConfig) -> Arc<dyn ModelProvider> {
    Arc::new(GroqProvider::new(
        config.model.clone(),
        config.api_key("groq"),
        config.base_url("groq"),
    ))
}
