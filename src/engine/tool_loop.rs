//! Tool-calling loop over a streaming model provider.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::{EngineRequest, EventSink, ReasoningEngine};
use crate::dispatch::DispatchEvent;
use crate::error::Result;
use crate::provider::{ModelProvider, ProviderRequest, ToolDefinition};
use crate::tools::{ToolArguments, ToolRegistry};
use crate::types::{
    AgentToolCall, GenerationSettings, ModelMessage, StreamEventType, TextStreamDelta, Usage,
};
use crate::util::retry::RetryPolicy;

/// Answer returned when the model keeps asking for tools past the budget.
pub const ITERATION_LIMIT_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant that can search the web. \
Answer the user's latest message using the conversation so far. When a question needs facts \
you are unsure of, call one of the available tools with a short search query, read the result, \
and repeat if needed. When you know enough, reply with the final answer in plain text.";

/// Model output for one iteration.
#[derive(Debug, Default)]
struct Completion {
    text: String,
    tool_calls: Vec<AgentToolCall>,
    usage: Usage,
}

/// Reason-then-act loop: stream the model, run the tools it asks for, feed
/// the results back, and stop when it answers without tool calls.
pub struct ToolLoopEngine {
    provider: Arc<dyn ModelProvider>,
    settings: GenerationSettings,
    system_prompt: String,
    retry: RetryPolicy,
}

impl ToolLoopEngine {
    pub fn new(provider: Arc<dyn ModelProvider>) -> Self {
        Self {
            provider,
            settings: GenerationSettings::default(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    async fn complete(&self, request: &ProviderRequest) -> Result<Completion> {
        let mut stream = self
            .retry
            .execute(|| self.provider.stream_text(request))
            .await?;

        let mut completion = Completion::default();
        while let Some(delta) = stream.next().await {
            let TextStreamDelta {
                text,
                event_type,
                tool_call,
                usage,
                ..
            } = delta?;
            if let Some(usage) = usage {
                completion.usage.merge(&usage);
            }
            match event_type {
                StreamEventType::TextDelta => completion.text.push_str(&text),
                StreamEventType::ToolCall => completion.tool_calls.extend(tool_call),
                StreamEventType::Done => break,
            }
        }
        Ok(completion)
    }

    async fn run_tool(
        &self,
        tools: &ToolRegistry,
        call: &AgentToolCall,
        events: &EventSink,
    ) -> ModelMessage {
        let query = match ToolArguments::new(call.arguments.clone()).query() {
            Ok(query) => query,
            Err(err) => {
                debug!(tool = %call.name, error = %err, "rejected tool arguments");
                return ModelMessage::tool_result(
                    call.id.clone(),
                    format!("Invalid tool input: {err}. Call the tool with a single \"query\" string."),
                    true,
                );
            }
        };

        events(DispatchEvent::ToolInvocationStarted {
            tool_name: call.name.clone(),
            query: query.clone(),
        });
        let outcome = tools.invoke(&call.name, &query).await;
        events(DispatchEvent::ToolInvocationFinished {
            tool_name: call.name.clone(),
            result: outcome.content.clone(),
        });

        ModelMessage::tool_result(call.id.clone(), outcome.content, outcome.is_error)
    }
}

#[async_trait]
impl ReasoningEngine for ToolLoopEngine {
    async fn run(&self, request: EngineRequest, events: EventSink) -> Result<String> {
        let EngineRequest {
            history,
            tools,
            max_iterations,
        } = request;

        let manifest: Vec<ToolDefinition> = tools.manifest();
        let tool_defs = (!manifest.is_empty()).then_some(manifest);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(ModelMessage::system(self.system_prompt.clone()));
        messages.extend(history);

        let mut usage = Usage::default();
        for iteration in 1..=max_iterations {
            let provider_request = ProviderRequest {
                messages: messages.clone(),
                settings: self.settings.clone(),
                tools: tool_defs.clone(),
            };
            let completion = self.complete(&provider_request).await?;
            usage.merge(&completion.usage);

            debug!(
                iteration,
                tool_calls = completion.tool_calls.len(),
                text_len = completion.text.len(),
                "engine iteration complete"
            );

            if completion.tool_calls.is_empty() {
                info!(
                    iterations = iteration,
                    input_tokens = usage.input_tokens,
                    output_tokens = usage.output_tokens,
                    "engine produced an answer"
                );
                return Ok(completion.text.trim().to_string());
            }

            let thought = completion.text.trim();
            if !thought.is_empty() {
                events(DispatchEvent::Thought {
                    text: thought.to_string(),
                });
            }

            messages.push(ModelMessage::assistant_tool_calls(
                completion.text.clone(),
                completion.tool_calls.clone(),
            ));
            for call in &completion.tool_calls {
                let result = self.run_tool(&tools, call, &events).await;
                messages.push(result);
            }
        }

        warn!(max_iterations, "engine hit its iteration limit");
        Ok(ITERATION_LIMIT_ANSWER.to_string())
    }
}
