//! Convenience re-exports for common use.

pub use crate::chat::{ChatSession, TurnOutcome, TurnState};
pub use crate::config::LookoutConfig;
pub use crate::dispatch::{DispatchEvent, DispatchHandle, Dispatcher};
pub use crate::engine::{EngineRequest, EventSink, ReasoningEngine, ToolLoopEngine};
pub use crate::error::{LookoutError, Result};
pub use crate::provider::ModelProvider;
pub use crate::report::{DisplaySink, ProgressReporter, RecordingSink, TerminalSink};
pub use crate::session::{Role, Session, Turn};
pub use crate::tools::{AgentTool, Tool, ToolRegistry};
