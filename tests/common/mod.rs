//! Shared test helpers: scripted provider, scripted engines.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::BoxStream;

use lookout::dispatch::{DispatchEvent, Dispatcher};
use lookout::engine::{EngineRequest, EventSink, ReasoningEngine};
use lookout::error::LookoutError;
use lookout::provider::{ModelProvider, ProviderRequest};
use lookout::tools::{AgentTool, Tool, ToolRegistry};
use lookout::types::*;
use lookout::util::retry::RetryPolicy;

/// One scripted model reply.
pub enum Reply {
    Text(String),
    ToolCall {
        id: String,
        name: String,
        arguments: serde_json::Value,
    },
    Fail(fn() -> LookoutError),
}

/// A provider that plays back queued replies and records every request.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a final text answer.
    pub fn queue_text(&self, text: &str) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Text(text.to_string()));
        self
    }

    /// Queue a tool call request.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: args,
        });
        self
    }

    /// Queue a request-level failure.
    pub fn queue_failure(&self, err: fn() -> LookoutError) -> &Self {
        self.replies.lock().unwrap().push_back(Reply::Fail(err));
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_id(&self) -> &str {
        "scripted-model"
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, LookoutError>>, LookoutError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Text("Mock streamed response".to_string()));

        let usage = Usage {
            input_tokens: 10,
            output_tokens: 5,
            total_tokens: 15,
        };
        let deltas: Vec<TextStreamDelta> = match reply {
            Reply::Fail(make) => return Err(make()),
            Reply::Text(text) => {
                let mut deltas: Vec<TextStreamDelta> = text
                    .chars()
                    .collect::<Vec<_>>()
                    .chunks(5)
                    .map(|chunk| TextStreamDelta::text(chunk.iter().collect::<String>()))
                    .collect();
                deltas.push(TextStreamDelta::done(Some(FinishReason::Stop), Some(usage)));
                deltas
            }
            Reply::ToolCall {
                id,
                name,
                arguments,
            } => vec![
                TextStreamDelta::text("I should look this up."),
                TextStreamDelta::tool_call(AgentToolCall {
                    id,
                    name,
                    arguments,
                }),
                TextStreamDelta::done(Some(FinishReason::ToolCalls), Some(usage)),
            ],
        };

        let stream = async_stream::stream! {
            for delta in deltas {
                yield Ok(delta);
            }
        };
        Ok(Box::pin(stream))
    }
}

/// Retry policy that never sleeps long.
pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(1),
        multiplier: 1.0,
    }
}

/// A web search tool that always fails the way an unreachable service does.
pub fn failing_search() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new("search", "Search the web.", |_query| async {
        Ok("Search failed: timeout".to_string())
    }))
}

/// A web search tool whose implementation panics.
pub fn panicking_search() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new("search", "Search the web.", |query| async move {
        assert!(query.is_empty(), "search backend bug");
        Ok(query)
    }))
}

pub fn registry_with(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
    let registry = tools
        .into_iter()
        .fold(ToolRegistry::new(), |registry, tool| registry.with(tool));
    Arc::new(registry)
}

/// Engine that calls one tool (if the registry has it) and then answers
/// based on what the tool returned.
pub struct ScriptedEngine {
    pub tool: Option<(String, String)>,
    pub answer_on_failure: String,
    pub answer: String,
    pub seen_history: Mutex<Vec<Vec<ModelMessage>>>,
}

impl ScriptedEngine {
    pub fn answering(answer: &str) -> Self {
        Self {
            tool: None,
            answer_on_failure: answer.to_string(),
            answer: answer.to_string(),
            seen_history: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tool(mut self, name: &str, query: &str) -> Self {
        self.tool = Some((name.to_string(), query.to_string()));
        self
    }

    pub fn on_tool_failure(mut self, answer: &str) -> Self {
        self.answer_on_failure = answer.to_string();
        self
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedEngine {
    async fn run(&self, request: EngineRequest, events: EventSink) -> lookout::Result<String> {
        self.seen_history.lock().unwrap().push(request.history.clone());

        let Some((name, query)) = &self.tool else {
            return Ok(self.answer.clone());
        };
        events(DispatchEvent::ToolInvocationStarted {
            tool_name: name.clone(),
            query: query.clone(),
        });
        let outcome = request.tools.invoke(name, query).await;
        events(DispatchEvent::ToolInvocationFinished {
            tool_name: name.clone(),
            result: outcome.content.clone(),
        });

        if outcome.is_error || outcome.content.contains("failed:") {
            Ok(self.answer_on_failure.clone())
        } else {
            Ok(self.answer.clone())
        }
    }
}

/// Engine that always fails with the given error.
pub struct FailingEngine(pub fn() -> LookoutError);

#[async_trait]
impl ReasoningEngine for FailingEngine {
    async fn run(&self, _request: EngineRequest, _events: EventSink) -> lookout::Result<String> {
        Err((self.0)())
    }
}

/// Engine that panics mid-run.
pub struct PanickingEngine;

#[async_trait]
impl ReasoningEngine for PanickingEngine {
    async fn run(&self, _request: EngineRequest, events: EventSink) -> lookout::Result<String> {
        events(DispatchEvent::Thought {
            text: "about to fail".into(),
        });
        panic!("engine bug");
    }
}

/// Engine that emits one event and then never finishes.
pub struct StuckEngine;

#[async_trait]
impl ReasoningEngine for StuckEngine {
    async fn run(&self, _request: EngineRequest, events: EventSink) -> lookout::Result<String> {
        events(DispatchEvent::ToolInvocationStarted {
            tool_name: "search".into(),
            query: "forever".into(),
        });
        std::future::pending::<()>().await;
        Ok(String::new())
    }
}

pub fn dispatcher(engine: impl ReasoningEngine + 'static, tools: Arc<ToolRegistry>) -> Dispatcher {
    Dispatcher::new(Arc::new(engine), tools)
}
