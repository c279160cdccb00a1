//! Shared HTTP client, SSE parsing, and auth utilities.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER, USER_AGENT,
};

use crate::error::LookoutError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

const CLIENT_USER_AGENT: &str = concat!("lookout/", env!("CARGO_PKG_VERSION"));

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .user_agent(CLIENT_USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> LookoutError {
    match status {
        401 | 403 => LookoutError::Authentication(error_message(body)),
        429 => LookoutError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => LookoutError::api(status, error_message(body)),
    }
}

/// Map a failed response to an error, taking the rate-limit delay from the
/// `retry-after` header when the body does not carry one.
pub fn response_error(status: u16, headers: &HeaderMap, body: &str) -> LookoutError {
    match status_to_error(status, body) {
        LookoutError::RateLimited {
            retry_after_ms: None,
        } => LookoutError::RateLimited {
            retry_after_ms: retry_after_header(headers),
        },
        err => err,
    }
}

/// `retry-after` in delta-seconds. HTTP dates are ignored.
fn retry_after_header(headers: &HeaderMap) -> Option<u64> {
    let secs: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    (secs.is_finite() && secs >= 0.0).then(|| (secs * 1000.0) as u64)
}

/// Pull `error.message` out of an OpenAI-style error body, else the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
