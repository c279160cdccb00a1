//! OpenAI-compatible Chat Completions client (streaming, function tools).

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::config::ApiKey;
use crate::error::LookoutError;
use crate::types::*;

use super::http::{bearer_headers, parse_sse_data, response_error, shared_client};
use super::{ModelProvider, ProviderRequest};

/// Chat Completions client for any OpenAI-compatible endpoint.
pub struct ChatCompletionsClient {
    provider_name: &'static str,
    model: String,
    api_key: ApiKey,
    base_url: String,
}

impl ChatCompletionsClient {
    pub fn new(
        provider_name: &'static str,
        model: impl Into<String>,
        api_key: ApiKey,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            provider_name,
            model: model.into(),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    pub(crate) fn build_request_body(&self, request: &ProviderRequest) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": messages,
            "stream": true,
        });

        let Some(obj) = body.as_object_mut() else {
            return body;
        };

        if let Some(max) = request.settings.max_tokens {
            obj.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            obj.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            obj.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            obj.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            obj.insert("seed".into(), seed.into());
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                obj.insert("tools".into(), tool_defs.into());
                obj.insert("tool_choice".into(), "auto".into());
            }
        }

        body
    }
}

#[async_trait]
impl ModelProvider for ChatCompletionsClient {
    fn provider_name(&self) -> &str {
        self.provider_name
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, LookoutError>>, LookoutError> {
        let body = self.build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url);

        debug!(
            provider = self.provider_name,
            model = %self.model,
            messages = request.messages.len(),
            "chat completions stream_text"
        );

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(self.api_key.expose()))
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !(200..300).contains(&status) {
            let headers = resp.headers().clone();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(response_error(status, &headers, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut pending: BTreeMap<usize, PartialToolCall> = BTreeMap::new();
            let mut finish_reason = None;
            let mut usage = None;
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(LookoutError::Network(e));
                        return;
                    }
                };

                buffer.extend_from_slice(&chunk);

                // Lines are decoded whole; a chunk may end inside a character.
                while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                    let raw: Vec<u8> = buffer.drain(..=line_end).collect();
                    let line = match std::str::from_utf8(&raw) {
                        Ok(line) => line.trim().to_string(),
                        Err(e) => {
                            yield Err(LookoutError::Stream(format!("invalid UTF-8 in stream: {e}")));
                            return;
                        }
                    };

                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }
                    let Some(data) = parse_sse_data(&line) else {
                        continue;
                    };

                    let chunk = match serde_json::from_str::<ChatStreamChunk>(data) {
                        Ok(chunk) => chunk,
                        Err(e) => {
                            yield Err(LookoutError::Stream(format!("malformed stream chunk: {e}")));
                            return;
                        }
                    };

                    if let Some(error) = chunk.error {
                        yield Err(LookoutError::Stream(error.message));
                        return;
                    }

                    if let Some(u) = chunk.usage.or_else(|| chunk.x_groq.and_then(|x| x.usage)) {
                        usage = Some(u.into());
                    }

                    let Some(choice) = chunk.choices.into_iter().next() else {
                        continue;
                    };

                    if let Some(text) = choice.delta.content {
                        if !text.is_empty() {
                            yield Ok(TextStreamDelta::text(text));
                        }
                    }
                    for fragment in choice.delta.tool_calls.unwrap_or_default() {
                        pending.entry(fragment.index).or_default().absorb(fragment);
                    }
                    if let Some(reason) = choice.finish_reason {
                        finish_reason = reason.parse::<FinishReason>().ok();
                    }
                }
            }

            for (index, partial) in std::mem::take(&mut pending) {
                yield Ok(TextStreamDelta::tool_call(partial.finish(index)));
            }
            yield Ok(TextStreamDelta::done(finish_reason, usage));
        };

        Ok(Box::pin(stream))
    }
}

/// Tool call being assembled from streamed fragments.
#[derive(Debug, Default)]
struct PartialToolCall {
    id: Option<String>,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn absorb(&mut self, fragment: ToolCallFragment) {
        if let Some(id) = fragment.id {
            self.id = Some(id);
        }
        if let Some(function) = fragment.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(args) = function.arguments {
                self.arguments.push_str(&args);
            }
        }
    }

    fn finish(self, index: usize) -> AgentToolCall {
        let raw = self.arguments.trim();
        let arguments = if raw.is_empty() {
            serde_json::json!({})
        } else {
            serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_string()))
        };
        AgentToolCall {
            id: self.id.unwrap_or_else(|| format!("call_{index}")),
            name: self.name,
            arguments,
        }
    }
}

pub(crate) fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    if let Some(tr) = msg.tool_result_part() {
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": tr.tool_call_id,
            "content": tr.content,
        });
    }

    let role = msg.role.to_string();
    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text_content();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    serde_json::json!({ "role": role, "content": msg.text_content() })
}

// Chat Completions stream types (internal)

#[derive(Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
    usage: Option<ChatUsage>,
    x_groq: Option<GroqExtension>,
    error: Option<ChatError>,
}

#[derive(Deserialize)]
struct GroqExtension {
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatError {
    message: String,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    delta: ChatStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallFragment>>,
}

#[derive(Deserialize)]
struct ToolCallFragment {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<FunctionFragment>,
}

#[derive(Deserialize)]
struct FunctionFragment {
    name: Option<String>,
    arguments: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<ChatUsage> for Usage {
    fn from(u: ChatUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}
