mod common;

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use lookout::config::{ApiKey, LookoutConfig};
use lookout::dispatch::{DispatchEvent, Dispatcher, FAILURE_PREFIX};
use lookout::engine::{ToolLoopEngine, ITERATION_LIMIT_ANSWER};
use lookout::error::LookoutError;
use lookout::provider::GroqProvider;
use lookout::session::Turn;
use lookout::tools::ToolRegistry;

fn question(text: &str) -> Vec<Turn> {
    vec![Turn::assistant("Hi"), Turn::user(text)]
}

async fn collect(dispatcher: &Dispatcher, history: &[Turn]) -> Vec<DispatchEvent> {
    dispatcher.dispatch(history).collect().await
}

fn finals(events: &[DispatchEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            DispatchEvent::FinalAnswer { content } => Some(content.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn unauthorized_engine_yields_one_error_answer() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"message": "Invalid API Key", "type": "invalid_request_error"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GroqProvider::new("llama-3.1-8b-instant", ApiKey::new("gsk_bad"), Some(server.uri()));
    let engine = ToolLoopEngine::new(Arc::new(provider)).with_retry(fast_retry(2));
    let dispatcher = Dispatcher::new(Arc::new(engine), Arc::new(ToolRegistry::new()));

    let events = collect(&dispatcher, &question("hello")).await;

    assert_eq!(events.len(), 1);
    let answers = finals(&events);
    assert_eq!(answers.len(), 1);
    assert!(answers[0].starts_with(FAILURE_PREFIX), "{}", answers[0]);
    assert!(answers[0].contains("Invalid API Key"), "{}", answers[0]);
}

#[tokio::test]
async fn missing_key_surfaces_at_dispatch_time() {
    let dispatcher = Dispatcher::from_config(&LookoutConfig::new());

    let events = collect(&dispatcher, &question("hello")).await;

    let answers = finals(&events);
    assert_eq!(answers.len(), 1);
    assert!(answers[0].contains("Missing GROQ_API_KEY"), "{}", answers[0]);
}

#[tokio::test]
async fn engine_timeout_is_retried_then_reported() {
    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_failure(|| LookoutError::Timeout(100))
        .queue_failure(|| LookoutError::Timeout(100));
    let engine = ToolLoopEngine::new(provider.clone()).with_retry(fast_retry(2));
    let dispatcher = Dispatcher::new(Arc::new(engine), Arc::new(ToolRegistry::new()));

    let events = collect(&dispatcher, &question("slow?")).await;

    assert_eq!(provider.requests().len(), 2);
    assert_eq!(
        finals(&events),
        vec!["Agent failed: Timeout after 100ms (the service was slow to respond)"]
    );
}

#[tokio::test]
async fn tool_events_precede_the_final_answer() {
    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call("call_1", "search", json!({"query": "machine learning"}))
        .queue_text("I was unable to search, but machine learning is...");
    let engine = ToolLoopEngine::new(provider.clone()).with_retry(fast_retry(1));
    let dispatcher = Dispatcher::new(Arc::new(engine), registry_with(vec![failing_search()]));

    let events = collect(&dispatcher, &question("What is machine learning?")).await;

    assert_eq!(
        events,
        vec![
            DispatchEvent::Thought {
                text: "I should look this up.".into()
            },
            DispatchEvent::ToolInvocationStarted {
                tool_name: "search".into(),
                query: "machine learning".into(),
            },
            DispatchEvent::ToolInvocationFinished {
                tool_name: "search".into(),
                result: "Search failed: timeout".into(),
            },
            DispatchEvent::FinalAnswer {
                content: "I was unable to search, but machine learning is...".into()
            },
        ]
    );
}

#[tokio::test]
async fn panicking_tool_is_reported_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call("call_1", "search", json!({"query": "anything"}))
        .queue_text("fine");
    let engine = ToolLoopEngine::new(provider.clone()).with_retry(fast_retry(1));
    let dispatcher = Dispatcher::new(Arc::new(engine), registry_with(vec![panicking_search()]));

    let events = collect(&dispatcher, &question("anything")).await;

    assert_eq!(
        events[1..],
        [
            DispatchEvent::ToolInvocationStarted {
                tool_name: "search".into(),
                query: "anything".into(),
            },
            DispatchEvent::ToolInvocationFinished {
                tool_name: "search".into(),
                result: "search failed: tool panicked".into(),
            },
            DispatchEvent::FinalAnswer {
                content: "fine".into()
            },
        ]
    );
    let fed_back = provider.requests()[1]
        .messages
        .last()
        .and_then(|m| m.tool_result_part())
        .cloned()
        .expect("tool result fed back");
    assert!(fed_back.is_error);
}

#[tokio::test]
async fn panicking_engine_is_contained() {
    let dispatcher = dispatcher(PanickingEngine, Arc::new(ToolRegistry::new()));

    let events = collect(&dispatcher, &question("boom")).await;

    assert!(events.last().is_some_and(DispatchEvent::is_final));
    let answers = finals(&events);
    assert_eq!(answers.len(), 1);
    assert!(answers[0].starts_with(FAILURE_PREFIX));
}

#[tokio::test]
async fn aborted_dispatch_ends_without_answer() {
    let dispatcher = dispatcher(StuckEngine, Arc::new(ToolRegistry::new()));
    let mut handle = dispatcher.dispatch(&question("wait"));

    let first = handle.next().await;
    assert!(matches!(first, Some(DispatchEvent::ToolInvocationStarted { .. })));

    handle.abort();
    assert!(handle.is_aborted());
    let rest = tokio::time::timeout(Duration::from_secs(5), handle.collect::<Vec<_>>())
        .await
        .expect("stream should end after abort");
    assert!(finals(&rest).is_empty());
}

#[tokio::test]
async fn iteration_budget_ends_with_fixed_answer() {
    let provider = Arc::new(ScriptedProvider::new());
    for n in 0..3 {
        provider.queue_tool_call(&format!("call_{n}"), "search", json!({"query": "loop"}));
    }
    let engine = ToolLoopEngine::new(provider.clone()).with_retry(fast_retry(1));
    let dispatcher = Dispatcher::new(Arc::new(engine), registry_with(vec![failing_search()]))
        .with_max_iterations(2);

    let events = collect(&dispatcher, &question("loop forever")).await;

    assert_eq!(provider.requests().len(), 2);
    assert_eq!(finals(&events), vec![ITERATION_LIMIT_ANSWER]);
}

#[tokio::test]
async fn malformed_tool_arguments_are_fed_back_to_the_model() {
    let provider = Arc::new(ScriptedProvider::new());
    provider
        .queue_tool_call("call_1", "search", json!({"a": 1, "b": 2}))
        .queue_text("Sorry, answering without search.");
    let engine = ToolLoopEngine::new(provider.clone()).with_retry(fast_retry(1));
    let dispatcher = Dispatcher::new(Arc::new(engine), registry_with(vec![failing_search()]));

    let events = collect(&dispatcher, &question("hi")).await;

    assert_eq!(finals(&events), vec!["Sorry, answering without search."]);
    assert!(!events
        .iter()
        .any(|e| matches!(e, DispatchEvent::ToolInvocationStarted { .. })));

    let second = &provider.requests()[1];
    let tool_result = second
        .messages
        .last()
        .and_then(|m| m.tool_result_part())
        .expect("tool result fed back");
    assert!(tool_result.is_error);
    assert!(tool_result.content.starts_with("Invalid tool input:"));
}

#[tokio::test]
async fn answer_waits_for_final_text() {
    let dispatcher = dispatcher(ScriptedEngine::answering("done"), Arc::new(ToolRegistry::new()));
    assert_eq!(dispatcher.answer(&question("q")).await.unwrap(), "done");
}
