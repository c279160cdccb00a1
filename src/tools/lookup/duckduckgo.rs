//! Web search via DuckDuckGo's HTML results page.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{bounded_query, contain, decode_entities, get_text};
use crate::error::Result;
use crate::tools::tool::Tool;
use crate::tools::types::AgentToolParameters;
use crate::util::text::squash_whitespace;

const DEFAULT_BASE_URL: &str = "https://html.duckduckgo.com";
const NO_RESULT: &str = "No good DuckDuckGo Search Result was found";
/// Number of result snippets joined into one answer.
const MAX_RESULTS: usize = 5;

static SNIPPET_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(?:a|td|div)[^>]*class="result__snippet[^"]*"[^>]*>(.*?)</(?:a|td|div)>"#)
        .expect("snippet regex must compile")
});
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex must compile"));

pub struct DuckDuckGoSearch {
    base_url: String,
    parameters: AgentToolParameters,
}

impl DuckDuckGoSearch {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            parameters: AgentToolParameters::query("Web search query"),
        }
    }

    async fn search(&self, query: &str) -> Result<String> {
        let params = [("q", bounded_query(query)?), ("kl", "wt-wt".to_string())];

        let page = get_text(&format!("{}/html/", self.base_url), &params).await?;
        let snippets = extract_snippets(&page, MAX_RESULTS);
        if snippets.is_empty() {
            return Ok(NO_RESULT.to_string());
        }
        Ok(snippets.join(" "))
    }
}

#[async_trait]
impl Tool for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web using DuckDuckGo. Returns search results or error message."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        Ok(contain("Search", self.search(query).await))
    }
}

/// Plain-text snippets of the first `limit` results on a results page, in
/// page order, skipping empty and repeated ones.
pub fn extract_snippets(page: &str, limit: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for caps in SNIPPET_RE.captures_iter(page) {
        let text = squash_whitespace(&decode_entities(&TAG_RE.replace_all(&caps[1], "")));
        if !text.is_empty() && !out.contains(&text) {
            out.push(text);
        }
        if out.len() == limit {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div class="results">
  <div class="result results_links web-result">
    <h2 class="result__title"><a class="result__a" href="https://www.rust-lang.org/">Rust</a></h2>
    <a class="result__snippet" href="https://www.rust-lang.org/">A language empowering everyone to build <b>reliable</b> and efficient software.</a>
  </div>
  <div class="result results_links web-result">
    <a class="result__snippet" href="https://doc.rust-lang.org/book/">The Rust Programming Language &#x27;the book&#x27; &amp; more.</a>
  </div>
  <div class="result results_links web-result">
    <a class="result__snippet" href="https://example.com/">   </a>
  </div>
</div>"#;

    #[test]
    fn snippets_are_plain_text_in_page_order() {
        assert_eq!(
            extract_snippets(PAGE, MAX_RESULTS),
            vec![
                "A language empowering everyone to build reliable and efficient software.",
                "The Rust Programming Language 'the book' & more.",
            ]
        );
    }

    #[test]
    fn snippets_stop_at_limit() {
        assert_eq!(extract_snippets(PAGE, 1).len(), 1);
    }

    #[test]
    fn page_without_results_has_no_snippets() {
        assert!(extract_snippets("<html><body>No results.</body></html>", MAX_RESULTS).is_empty());
    }
}
