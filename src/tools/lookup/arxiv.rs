//! arXiv lookup via the export Atom API.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{bounded_query, contain, decode_entities, get_text};
use crate::config::LookupLimits;
use crate::error::{LookoutError, Result};
use crate::tools::tool::Tool;
use crate::tools::types::AgentToolParameters;
use crate::util::text::{squash_whitespace, truncate_chars};

const DEFAULT_BASE_URL: &str = "https://export.arxiv.org";
const NO_RESULT: &str = "No good Arxiv Result was found";

static ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<entry>(.*?)</entry>").expect("entry regex must compile"));
static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<id>(.*?)</id>").expect("id regex must compile"));
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("title regex must compile"));
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<summary[^>]*>(.*?)</summary>").expect("summary regex must compile")
});
static PUBLISHED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<published>(\d{4}-\d{2}-\d{2})").expect("published regex must compile")
});
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<author>\s*<name>(.*?)</name>").expect("author regex must compile")
});
pub struct ArxivLookup {
    base_url: String,
    limits: LookupLimits,
    parameters: AgentToolParameters,
}

/// One paper parsed out of the Atom feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub published: String,
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
}

impl Paper {
    fn render(&self) -> String {
        format!(
            "Published: {}\nTitle: {}\nAuthors: {}\nSummary: {}",
            self.published,
            self.title,
            self.authors.join(", "),
            self.summary
        )
    }
}

impl ArxivLookup {
    pub fn new(base_url: Option<String>, limits: LookupLimits) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            limits,
            parameters: AgentToolParameters::query("Search terms for arXiv papers"),
        }
    }

    async fn search(&self, query: &str) -> Result<String> {
        let query = bounded_query(query)?;
        let params = [
            ("search_query", query),
            ("start", "0".to_string()),
            ("max_results", self.limits.top_k_results.max(1).to_string()),
        ];

        let feed = get_text(&format!("{}/api/query", self.base_url), &params).await?;
        let papers = parse_feed(&feed)?;
        if papers.is_empty() {
            return Ok(NO_RESULT.to_string());
        }

        let docs: Vec<String> = papers
            .iter()
            .take(self.limits.top_k_results)
            .map(Paper::render)
            .collect();
        Ok(truncate_chars(&docs.join("\n\n"), self.limits.max_chars))
    }
}

#[async_trait]
impl Tool for ArxivLookup {
    fn name(&self) -> &str {
        "arxiv"
    }

    fn description(&self) -> &str {
        "A wrapper around arxiv.org. Useful for questions about physics, mathematics, \
         computer science, quantitative biology, quantitative finance, statistics, \
         electrical engineering, and economics from scientific articles. \
         Input should be a search query."
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn invoke(&self, query: &str) -> Result<String> {
        Ok(contain("Arxiv", self.search(query).await))
    }
}

/// Parse the entries of an arXiv Atom feed.
///
/// arXiv reports bad queries as a feed with a single entry whose id points at
/// `/api/errors`; that is returned as an API error.
pub fn parse_feed(feed: &str) -> Result<Vec<Paper>> {
    let mut papers = Vec::new();
    for entry in ENTRY_RE.captures_iter(feed) {
        let body = &entry[1];
        let field = |re: &Regex| {
            re.captures(body)
                .map(|c| decode_entities(&squash_whitespace(&c[1])))
                .unwrap_or_default()
        };

        if field(&ID_RE).contains("/api/errors") {
            return Err(LookoutError::api(400, field(&SUMMARY_RE)));
        }

        papers.push(Paper {
            published: field(&PUBLISHED_RE),
            title: field(&TITLE_RE),
            authors: AUTHOR_RE
                .captures_iter(body)
                .map(|c| decode_entities(&squash_whitespace(&c[1])))
                .collect(),
            summary: field(&SUMMARY_RE),
        });
    }
    Ok(papers)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:attention</title>
  <entry>
    <id>http://arxiv.org/abs/1706.03762v7</id>
    <published>2017-06-12T17:57:34Z</published>
    <title>Attention Is All
      You Need</title>
    <summary>  The dominant sequence transduction models are based on complex
      recurrent or convolutional neural networks &amp; attention.</summary>
    <author>
      <name>Ashish Vaswani</name>
    </author>
    <author>
      <name>Noam Shazeer</name>
    </author>
    <author>
      <name>&#321;ukasz Kaiser</name>
    </author>
  </entry>
</feed>"#;

    #[test]
    fn parses_entry_fields_without_feed_title() {
        let papers = parse_feed(FEED).unwrap();
        assert_eq!(papers.len(), 1);
        let paper = &papers[0];
        assert_eq!(paper.published, "2017-06-12");
        assert_eq!(paper.title, "Attention Is All You Need");
        assert_eq!(paper.authors, vec!["Ashish Vaswani", "Noam Shazeer", "Łukasz Kaiser"]);
        assert!(paper.summary.ends_with("networks & attention."));
    }

    #[test]
    fn rendered_paper_uses_labelled_lines() {
        let text = parse_feed(FEED).unwrap()[0].render();
        assert!(text.starts_with("Published: 2017-06-12\nTitle: Attention Is All You Need\nAuthors: "));
    }

    #[test]
    fn error_feed_is_an_api_error() {
        let feed = r#"<feed><entry><id>http://arxiv.org/api/errors#incorrect_id_format</id>
            <title>Error</title><summary>incorrect id format</summary></entry></feed>"#;
        let err = parse_feed(feed).unwrap_err();
        assert!(matches!(err, LookoutError::Api { status: 400, ref message } if message == "incorrect id format"));
    }

    #[test]
    fn empty_feed_has_no_papers() {
        assert!(parse_feed("<feed></feed>").unwrap().is_empty());
    }
}
