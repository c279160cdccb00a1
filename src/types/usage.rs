//! Token usage accounting.

use serde::{Deserialize, Serialize};

/// Token usage reported by the model service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Merge another usage into this one (accumulate).
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_all_counters() {
        let mut total = Usage::default();
        total.merge(&Usage { input_tokens: 10, output_tokens: 2, total_tokens: 12 });
        total.merge(&Usage { input_tokens: 5, output_tokens: 1, total_tokens: 6 });
        assert_eq!(total, Usage { input_tokens: 15, output_tokens: 3, total_tokens: 18 });
    }
}
