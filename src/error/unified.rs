//! Error classification and recovery hints.

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Canceled,
    Unknown,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySuggestion {
    RetryWithBackoff,
    CheckCredentials,
    CheckConfiguration,
    IncreaseTimeout,
    CheckToolImplementation,
    ReportIssue,
    None,
}

impl RecoverySuggestion {
    /// Short hint appended to user-visible error messages.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::RetryWithBackoff => Some("try again in a moment"),
            Self::CheckCredentials => Some("check your Groq API key"),
            Self::CheckConfiguration => Some("check your configuration"),
            Self::IncreaseTimeout => Some("the service was slow to respond"),
            Self::CheckToolImplementation => None,
            Self::ReportIssue => None,
            Self::None => None,
        }
    }
}
