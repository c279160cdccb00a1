//! Progress reporting and transcript display.
//!
//! A [`DisplaySink`] is anything that can show turns and intermediate steps.
//! [`ProgressReporter`] sits between a dispatch and a sink, turning
//! [`DispatchEvent`]s into [`RenderedStep`]s as they arrive.

mod sink;

pub use sink::{RecordingSink, Shown, TerminalSink};

use serde::{Deserialize, Serialize};

use crate::dispatch::DispatchEvent;
use crate::session::{Role, Session, Turn};

/// A turn as handed to a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedTurn {
    pub role: Role,
    pub content: String,
}

impl From<&Turn> for RenderedTurn {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
        }
    }
}

/// An intermediate step of a dispatch as handed to a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RenderedStep {
    Thought { text: String },
    ToolStarted { tool_name: String, query: String },
    ToolFinished { tool_name: String, result: String },
}

/// Where turns and steps end up.
pub trait DisplaySink {
    fn show_turn(&mut self, turn: &RenderedTurn);
    fn show_step(&mut self, step: &RenderedStep);
}

/// The display form of a session. Pure: same session, same output.
pub fn render(session: &Session) -> Vec<RenderedTurn> {
    session.history().iter().map(RenderedTurn::from).collect()
}

/// Show every turn of `session` on `sink`, in order.
pub fn replay(session: &Session, sink: &mut dyn DisplaySink) {
    for turn in render(session) {
        sink.show_turn(&turn);
    }
}

/// Forwards one session's turns and dispatch progress to a sink.
#[derive(Debug)]
pub struct ProgressReporter<S> {
    sink: S,
    steps: usize,
}

impl<S: DisplaySink> ProgressReporter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, steps: 0 }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Intermediate steps shown since the last turn.
    pub fn steps_since_turn(&self) -> usize {
        self.steps
    }

    pub fn replay(&mut self, session: &Session) {
        replay(session, &mut self.sink);
        self.steps = 0;
    }

    pub fn show_turn(&mut self, turn: &Turn) {
        self.sink.show_turn(&RenderedTurn::from(turn));
        self.steps = 0;
    }

    /// Show one dispatch event. Final answers are not steps; they reach the
    /// display as a turn once appended to the session.
    pub fn on_event(&mut self, event: &DispatchEvent) {
        let step = match event {
            DispatchEvent::Thought { text } => RenderedStep::Thought { text: text.clone() },
            DispatchEvent::ToolInvocationStarted { tool_name, query } => RenderedStep::ToolStarted {
                tool_name: tool_name.clone(),
                query: query.clone(),
            },
            DispatchEvent::ToolInvocationFinished { tool_name, result } => {
                RenderedStep::ToolFinished {
                    tool_name: tool_name.clone(),
                    result: result.clone(),
                }
            }
            DispatchEvent::FinalAnswer { .. } => return,
        };
        self.sink.show_step(&step);
        self.steps += 1;
    }
}
