//! Lookup tools backed by public search services.
//!
//! Each tool catches its own failures and reports them as ordinary text
//! (`"<Label> failed: ..."`), so the reasoning engine sees a result it can
//! reason about instead of an error.

pub mod arxiv;
pub mod duckduckgo;
pub mod wikipedia;

pub use arxiv::ArxivLookup;
pub use duckduckgo::DuckDuckGoSearch;
pub use wikipedia::WikipediaLookup;

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{LookoutError, Result};
use crate::provider::http::{shared_client, status_to_error};

/// Queries longer than this are cut before being sent to a service.
pub(crate) const MAX_QUERY_CHARS: usize = 300;

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|lt|gt|quot|apos|amp);")
        .expect("entity regex must compile")
});

/// GET `url` with query parameters and return the body as text.
///
/// Anything but 200 is an error; DuckDuckGo answers 202 when it throttles.
pub(crate) async fn get_text(url: &str, params: &[(&str, String)]) -> Result<String> {
    debug!(url, "lookup request");
    let resp = shared_client().get(url).query(params).send().await?;

    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if status != 200 {
        return Err(status_to_error(status, &body));
    }
    Ok(body)
}

/// Turn a lookup result into the text handed to the engine.
pub(crate) fn contain(label: &str, result: Result<String>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => {
            warn!(tool = label, error = %err, "lookup failed");
            format!("{label} failed: {err}")
        }
    }
}

/// Clamp a query to what the services accept.
pub(crate) fn bounded_query(query: &str) -> Result<String> {
    let query = crate::util::text::truncate_chars(query.trim(), MAX_QUERY_CHARS);
    if query.is_empty() {
        return Err(LookoutError::InvalidArgument("Query is empty".into()));
    }
    Ok(query)
}

/// Decode XML/HTML character references in one pass. Unknown or invalid
/// references are kept as written.
pub(crate) fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_and_numeric_entities() {
        assert_eq!(decode_entities("Caf&#233; &amp; Na&#xEF;ve"), "Café & Naïve");
        assert_eq!(decode_entities("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(decode_entities("&#x110000; &nbsp;"), "&#x110000; &nbsp;");
    }

    #[test]
    fn contain_prefixes_failures_with_label() {
        let text = contain("Search", Err(LookoutError::Timeout(1000)));
        assert_eq!(text, "Search failed: Timeout after 1000ms");
        assert_eq!(contain("Search", Ok("ok".into())), "ok");
    }

    #[test]
    fn bounded_query_trims_and_caps() {
        let long = "a".repeat(MAX_QUERY_CHARS + 50);
        assert_eq!(bounded_query(&long).unwrap().len(), MAX_QUERY_CHARS);
        assert!(bounded_query("   ").is_err());
    }
}
