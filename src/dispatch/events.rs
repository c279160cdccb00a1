//! Events emitted while a dispatch is in flight.

use serde::{Deserialize, Serialize};

/// One observable step of a dispatch, in the order it happened.
///
/// Every dispatch that is not aborted ends with exactly one `FinalAnswer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DispatchEvent {
    /// Intermediate reasoning the model produced alongside a tool request.
    Thought { text: String },
    ToolInvocationStarted { tool_name: String, query: String },
    ToolInvocationFinished { tool_name: String, result: String },
    FinalAnswer { content: String },
}

impl DispatchEvent {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::FinalAnswer { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = DispatchEvent::ToolInvocationStarted {
            tool_name: "search".into(),
            query: "rust".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tool_invocation_started");
        assert_eq!(json["tool_name"], "search");
    }
}
