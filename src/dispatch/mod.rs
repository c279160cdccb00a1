//! Agent dispatcher: runs the reasoning engine for one user turn and streams
//! its progress.
//!
//! Whatever happens inside the engine (network failure, rejected credentials,
//! a malformed response, even a panic) the caller sees an ordinary event
//! stream that ends in a single [`DispatchEvent::FinalAnswer`]. The only way
//! to end a stream without an answer is [`DispatchHandle::abort`].

pub mod events;

pub use events::DispatchEvent;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::{LookoutConfig, DEFAULT_MAX_ITERATIONS};
use crate::engine::{EngineRequest, EventSink, ReasoningEngine, ToolLoopEngine};
use crate::error::{LookoutError, Result};
use crate::provider::create_provider;
use crate::session::Turn;
use crate::tools::ToolRegistry;

/// Prefix of every answer that reports a dispatch failure.
pub const FAILURE_PREFIX: &str = "Agent failed: ";

/// Render an engine error as the answer shown to the user.
pub fn failure_answer(err: &LookoutError) -> String {
    match err.recovery_suggestion().hint() {
        Some(hint) => format!("{FAILURE_PREFIX}{err} ({hint})"),
        None => format!("{FAILURE_PREFIX}{err}"),
    }
}

/// Starts dispatches against a shared engine and tool set.
///
/// Cheap to clone; holds no per-session state.
#[derive(Clone)]
pub struct Dispatcher {
    engine: Arc<dyn ReasoningEngine>,
    tools: Arc<ToolRegistry>,
    max_iterations: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.tools)
            .field("max_iterations", &self.max_iterations)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(engine: Arc<dyn ReasoningEngine>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            engine,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Groq-backed tool loop over the standard lookup tools.
    pub fn from_config(config: &LookoutConfig) -> Self {
        let mut engine = ToolLoopEngine::new(create_provider(config));
        if let Some(prompt) = &config.system_prompt {
            engine = engine.with_system_prompt(prompt.clone());
        }
        Self::new(Arc::new(engine), Arc::new(ToolRegistry::standard(config)))
            .with_max_iterations(config.max_iterations)
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    /// Start answering the last turn of `history`.
    ///
    /// Returns immediately; events arrive on the handle as the engine
    /// produces them. Must be called inside a Tokio runtime.
    pub fn dispatch(&self, history: &[Turn]) -> DispatchHandle {
        self.dispatch_with_cancel(history, CancellationToken::new())
    }

    /// Like [`dispatch`](Self::dispatch), aborted when `cancel` fires.
    pub fn dispatch_with_cancel(&self, history: &[Turn], cancel: CancellationToken) -> DispatchHandle {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let request = EngineRequest {
            history: history.iter().map(Turn::to_message).collect(),
            tools: Arc::clone(&self.tools),
            max_iterations: self.max_iterations,
        };
        let sink_tx = tx.clone();
        let sink: EventSink = Arc::new(move |event| {
            let _ = sink_tx.send(event);
        });

        let engine = Arc::clone(&self.engine);
        let token = cancel.clone();
        let span = info_span!("dispatch", %id, turns = history.len());
        tokio::spawn(
            async move {
                info!("dispatch started");
                let mut run = tokio::spawn(
                    async move { engine.run(request, sink).await }.in_current_span(),
                );

                let answer = tokio::select! {
                    biased;
                    _ = token.cancelled() => {
                        run.abort();
                        info!("dispatch aborted");
                        return;
                    }
                    joined = &mut run => match joined {
                        Ok(Ok(answer)) => answer,
                        Ok(Err(err)) => {
                            warn!(error = %err, category = ?err.category(), "dispatch failed");
                            failure_answer(&err)
                        }
                        Err(join_err) => {
                            warn!(error = %join_err, "reasoning engine panicked");
                            format!("{FAILURE_PREFIX}internal error in the reasoning engine")
                        }
                    },
                };

                info!(answer_len = answer.len(), "dispatch finished");
                let _ = tx.send(DispatchEvent::FinalAnswer { content: answer });
            }
            .instrument(span),
        );

        DispatchHandle {
            id,
            events: UnboundedReceiverStream::new(rx),
            cancel,
        }
    }

    /// Dispatch and wait for the answer, discarding intermediate events.
    pub async fn answer(&self, history: &[Turn]) -> Result<String> {
        use futures::StreamExt;

        let mut handle = self.dispatch(history);
        while let Some(event) = handle.next().await {
            if let DispatchEvent::FinalAnswer { content } = event {
                return Ok(content);
            }
        }
        Err(LookoutError::Canceled)
    }
}

/// Event stream of one in-flight dispatch.
///
/// Dropping the handle stops delivery but lets the engine run to completion;
/// call [`abort`](Self::abort) to stop the engine as well.
#[derive(Debug)]
pub struct DispatchHandle {
    id: Uuid,
    events: UnboundedReceiverStream<DispatchEvent>,
    cancel: CancellationToken,
}

impl DispatchHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Stop the engine. The stream then ends without a final answer.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for DispatchHandle {
    type Item = DispatchEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}
