//! Lookup tools the reasoning engine can call.

pub mod arguments;
pub mod lookup;
pub mod registry;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use lookup::{ArxivLookup, DuckDuckGoSearch, WikipediaLookup};
pub use registry::{ToolOutcome, ToolRegistry};
pub use tool::{AgentTool, Tool};
pub use types::AgentToolParameters;
