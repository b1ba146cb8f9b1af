//! `LlmApi` against an in-process mock of the chat-completions API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chromance_llm::{ChatBackend, ChatMessage, LlmApi, LlmConfig, LlmError};
use serde_json::{json, Value};

const KEY: &str = "gsk_test";

/// What the mock answers, in order; the last entry repeats.
#[derive(Clone)]
struct Script {
    replies: Arc<Vec<(StatusCode, Value)>>,
    calls: Arc<AtomicUsize>,
    last_body: Arc<std::sync::Mutex<Option<Value>>>,
}

async fn completions(
    State(script): State<Script>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some("Bearer gsk_test") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "bad key" })));
    }
    *script.last_body.lock().unwrap() = Some(body);
    let n = script.calls.fetch_add(1, Ordering::SeqCst);
    let (status, reply) = script.replies[n.min(script.replies.len() - 1)].clone();
    (status, Json(reply))
}

async fn models() -> Json<Value> {
    Json(json!({ "data": [{ "id": "llama-3.1-70b-versatile" }] }))
}

/// Serve `replies` on an ephemeral port and return a client pointed at it.
async fn mock(replies: Vec<(StatusCode, Value)>) -> (LlmApi, Script) {
    let script = Script {
        replies: Arc::new(replies),
        calls: Arc::new(AtomicUsize::new(0)),
        last_body: Arc::new(std::sync::Mutex::new(None)),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .route("/v1/models", get(models))
        .with_state(script.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = LlmConfig::new(format!("http://{addr}/v1"), Some(KEY.into()));
    (LlmApi::new(config).unwrap(), script)
}

fn reply(text: &str) -> (StatusCode, Value) {
    (
        StatusCode::OK,
        json!({
            "model": "llama-3.1-70b-versatile",
            "choices": [{ "message": { "role": "assistant", "content": text } }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160 }
        }),
    )
}

#[tokio::test]
async fn completion_returns_text_and_usage() {
    let (api, script) = mock(vec![reply("  A chuva ácida cai sobre a cidade.  ")]).await;

    let messages = [ChatMessage::system("Você é o narrador."), ChatMessage::user("Olho ao redor")];
    let completion = api.complete(&messages).await.unwrap();

    assert_eq!(completion.content, "A chuva ácida cai sobre a cidade.");
    assert_eq!(completion.usage.unwrap().total_tokens, 160);

    let sent = script.last_body.lock().unwrap().clone().unwrap();
    assert_eq!(sent["model"], "llama-3.1-70b-versatile");
    assert_eq!(sent["max_tokens"], 500);
    assert_eq!(sent["messages"][0]["role"], "system");
    assert_eq!(sent["messages"][1]["content"], "Olho ao redor");
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    let (api, script) = mock(vec![(StatusCode::TOO_MANY_REQUESTS, json!({}))]).await;

    let err = api.complete(&[ChatMessage::user("oi")]).await.unwrap_err();
    assert_matches!(err, LlmError::RateLimited);
    assert_eq!(script.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_error_is_retried_once() {
    let (api, script) = mock(vec![
        (StatusCode::BAD_GATEWAY, json!({ "error": "upstream" })),
        reply("Segunda tentativa."),
    ])
    .await;

    let completion = api.complete(&[ChatMessage::user("oi")]).await.unwrap();
    assert_eq!(completion.content, "Segunda tentativa.");
    assert_eq!(script.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_server_error_surfaces_status() {
    let (api, script) = mock(vec![(StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "down" }))]).await;

    let err = api.complete(&[ChatMessage::user("oi")]).await.unwrap_err();
    assert_matches!(err, LlmError::Upstream { status: 503, .. });
    assert_eq!(script.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn blank_completion_is_an_error() {
    let (api, _) = mock(vec![reply("   ")]).await;

    let err = api.complete(&[ChatMessage::user("oi")]).await.unwrap_err();
    assert_matches!(err, LlmError::EmptyCompletion);
}

#[tokio::test]
async fn ping_through_the_trait() {
    let (api, _) = mock(vec![reply("ok")]).await;
    let backend: &dyn ChatBackend = &api;

    assert_eq!(backend.model(), "llama-3.1-70b-versatile");
    backend.ping().await.unwrap();
}
