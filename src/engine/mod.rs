//! The reasoning engine: decides which tools to call and when to answer.

mod tool_loop;

pub use tool_loop::{ToolLoopEngine, DEFAULT_SYSTEM_PROMPT, ITERATION_LIMIT_ANSWER};

use std::sync::Arc;

use async_trait::async_trait;

use crate::dispatch::DispatchEvent;
use crate::error::Result;
use crate::tools::ToolRegistry;
use crate::types::ModelMessage;

/// Callback receiving intermediate events as the engine produces them.
pub type EventSink = Arc<dyn Fn(DispatchEvent) + Send + Sync>;

/// Input for one engine run.
#[derive(Debug, Clone)]
pub struct EngineRequest {
    /// Full conversation so far, oldest first. The last entry is the user
    /// turn being answered.
    pub history: Vec<ModelMessage>,
    pub tools: Arc<ToolRegistry>,
    pub max_iterations: usize,
}

/// Produces a final answer for a conversation, optionally calling tools.
///
/// Implementations report tool activity through `events` while running and
/// return the answer text. Tool failures are not errors: they reach the
/// engine as ordinary tool results. An `Err` means the engine itself could
/// not produce an answer.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    async fn run(&self, request: EngineRequest, events: EventSink) -> Result<String>;
}
