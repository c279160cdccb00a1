//! Generation settings and related enums.

use bon::Builder;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Settings controlling text generation.
#[derive(Debug, Clone, Builder, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationSettings {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub stop_sequences: Option<Vec<String>>,
    pub seed: Option<u64>,
}

/// Why generation finished.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_reason_parses_wire_names() {
        assert_eq!("tool_calls".parse::<FinishReason>().unwrap(), FinishReason::ToolCalls);
        assert_eq!("stop".parse::<FinishReason>().unwrap(), FinishReason::Stop);
        assert!("eos".parse::<FinishReason>().is_err());
    }

    #[test]
    fn builder_leaves_unset_fields_empty() {
        let settings = GenerationSettings::builder().temperature(0.0).build();
        assert_eq!(settings.temperature, Some(0.0));
        assert_eq!(settings.max_tokens, None);
    }
}
