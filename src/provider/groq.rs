//! Groq provider (OpenAI-compatible).

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::ApiKey;
use crate::error::LookoutError;
use crate::types::TextStreamDelta;

use super::openai::ChatCompletionsClient;
use super::{ModelProvider, ProviderRequest};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqProvider {
    inner: ChatCompletionsClient,
}

impl GroqProvider {
    pub fn new(model: impl Into<String>, api_key: ApiKey, base_url: Option<String>) -> Self {
        Self {
            inner: ChatCompletionsClient::new(
                "groq",
                model,
                api_key,
                base_url.unwrap_or_else(|| GROQ_BASE_URL.to_string()),
            ),
        }
    }
}

#[async_trait]
impl ModelProvider for GroqProvider {
    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, LookoutError>>, LookoutError> {
        if !self.inner.api_key().is_present() {
            return Err(LookoutError::Authentication(
                "Missing GROQ_API_KEY; enter a Groq API key to chat".into(),
            ));
        }
        self.inner.stream_text(request).await
    }
}
