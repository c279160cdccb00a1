//! Extraction of the query string from model-supplied tool arguments.

use crate::error::LookoutError;

/// Wrapper around tool call arguments as the model sent them.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: serde_json::Value,
}

impl ToolArguments {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, LookoutError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| LookoutError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// The free-text query for a lookup tool.
    ///
    /// Accepts `{"query": "..."}`, a bare JSON string, or an object with a
    /// single string field under another name, since smaller models do not
    /// always follow the schema exactly.
    pub fn query(&self) -> Result<String, LookoutError> {
        let query = match &self.value {
            serde_json::Value::String(raw) => raw.clone(),
            serde_json::Value::Object(map) => match self.get_str("query") {
                Ok(q) => q.to_string(),
                Err(err) => {
                    let mut strings = map.values().filter_map(|v| v.as_str());
                    match (strings.next(), strings.next()) {
                        (Some(only), None) => only.to_string(),
                        _ => return Err(err),
                    }
                }
            },
            other => {
                return Err(LookoutError::InvalidArgument(format!(
                    "Expected a query string, got {other}"
                )))
            }
        };

        let query = query.trim();
        if query.is_empty() {
            return Err(LookoutError::InvalidArgument("Query is empty".into()));
        }
        Ok(query.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_from_schema_shape() {
        let args = ToolArguments::new(json!({"query": "  rust ownership "}));
        assert_eq!(args.query().unwrap(), "rust ownership");
    }

    #[test]
    fn query_from_bare_string() {
        let args = ToolArguments::new(json!("transformers"));
        assert_eq!(args.query().unwrap(), "transformers");
    }

    #[test]
    fn query_from_single_misnamed_field() {
        let args = ToolArguments::new(json!({"q": "tokio"}));
        assert_eq!(args.query().unwrap(), "tokio");
    }

    #[test]
    fn ambiguous_or_empty_input_is_rejected() {
        assert!(ToolArguments::new(json!({"a": "x", "b": "y"})).query().is_err());
        assert!(ToolArguments::new(json!({"query": "   "})).query().is_err());
        assert!(ToolArguments::new(json!(42)).query().is_err());
    }
}
