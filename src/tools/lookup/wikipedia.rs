//! Wikipedia lookup via the MediaWiki action API.

use async_trait::async_trait;
use serde::Deserialize;

use super::{bounded_query, contain, get_text};
use crate::config::LookupLimits;
use crate::error::{LookoutError, Result};
use crate::tools::tool::Tool;
use crate::tools::types::AgentToolParameters;
use crate::util::text::truncate_chars;

const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org";
const NO_RESULT: &str = "No good Wikipedia Search Result was found";

pub struct WikipediaLookup {
    base_url: String,
    limits: LookupLimits,
    parameters: AgentToolParameters,
}

impl WikipediaLookup {
    pub fn new(base_url: Option<String>, limits: LookupLimits) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            limits,
            parameters: AgentToolParameters::query("Topic to look up on Wikipedia"),
        }
    }

    async fn search(&self, query: &str) -> Result<String> {
        let query = bounded_query(query)?;
        let limit = self.limits.top_k_results.max(1).to_string();
        let params = [
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("formatversion", "2".to_string()),
            ("generator", "search".to_string()),
            ("gsrsearch", query),
            ("gsrlimit", limit.clone()),
            ("prop", "extracts".to_string()),
            ("exintro", "1".to_string()),
            ("explaintext", "1".to_string()),
            ("exlimit", limit),
            ("redirects", "1".to_string()),
        ];

        let body = get_text(&format!("{}/w/api.php", self.base_url), &params).await?;
        let response: QueryResponse = serde_json::from_str(&body)?;
        if let Some(error) = response.error {
            return Err(LookoutError::api(400, error.info));
        }

        let mut pages = response.query.map(|q| q.pages).unwrap_or_default();
        pages.sort_by_key(|p| p.index);

        let summaries: Vec<String> = pages
            .into_iter()
            .take(self.limits.top_k_results)
            .filter(|p| !p.extract.trim().is_empty())
            .map(|p| format!("Page: {}\nSummary: {}", p.title, p.extract.trim()))
            .collect();

        if summaries.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        Ok(truncate_chars(&summaries.join("\n\n"), self.limits.max_chars))
    }
}

#[async_trait]
impl Tool for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn description(&self) -> &str {
        "A wrapper around Wikipedia. Useful for general questions about people, places, \
         companies, facts, historical events, or other subjects. Input should be a search query."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        Ok(contain("Wikipedia", self.search(query).await))
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<QueryPages>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: String,
}

#[derive(Deserialize)]
struct ApiError {
    info: String,
}
