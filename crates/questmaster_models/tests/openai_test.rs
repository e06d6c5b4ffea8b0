//! Tests for the OpenAI-compatible oracle against a local mock endpoint.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use questmaster_error::{OracleErrorKind, QuestErrorKind};
use questmaster_interface::{Oracle, OracleRequest};
use questmaster_models::{ChatCompletionRequest, OpenAiConfigBuilder, OpenAiOracle};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct MockState {
    replies: Arc<Mutex<VecDeque<(StatusCode, Value)>>>,
    seen: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

impl MockState {
    fn new(replies: Vec<(StatusCode, Value)>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into())),
            seen: Arc::default(),
        }
    }

    fn seen(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

async fn completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen.lock().unwrap().push((auth, body));
    let (status, reply) = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or((StatusCode::GONE, json!({"error": "script exhausted"})));
    (status, Json(reply))
}

async fn spawn_mock(state: MockState) -> String {
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/v1", addr)
}

fn completion(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 0,
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    })
}

fn oracle(base_url: String) -> OpenAiOracle {
    let config = OpenAiConfigBuilder::default()
        .base_url(base_url)
        .api_key("sk-test")
        .initial_backoff_ms(1u64)
        .max_retries(2usize)
        .build()
        .unwrap();
    OpenAiOracle::new(config).unwrap()
}

#[tokio::test]
async fn test_generate_returns_first_choice_text() {
    let state = MockState::new(vec![(StatusCode::OK, completion("Once upon a time"))]);
    let oracle = oracle(spawn_mock(state.clone()).await);

    let reply = oracle
        .generate(&OracleRequest::new("You are a storyteller.", "Begin."))
        .await
        .unwrap();
    assert_eq!(reply, "Once upon a time");

    let seen = state.seen();
    assert_eq!(seen.len(), 1);
    let (auth, body) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test"));
    assert_eq!(body["model"], "gpt-4o");
    assert_eq!(body["temperature"], 0.0);
    assert!(body.get("max_tokens").is_none());
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Begin.");
}

#[tokio::test]
async fn test_request_overrides_defaults() {
    let state = MockState::new(vec![(StatusCode::OK, completion("ok"))]);
    let oracle = oracle(spawn_mock(state.clone()).await);

    let mut request = OracleRequest::new("sys", "user");
    request.max_tokens = Some(64);
    request.temperature = Some(0.7);
    oracle.generate(&request).await.unwrap();

    let (_, body) = &state.seen()[0];
    assert_eq!(body["max_tokens"], 64);
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let state = MockState::new(vec![
        (StatusCode::SERVICE_UNAVAILABLE, json!({"error": "busy"})),
        (StatusCode::TOO_MANY_REQUESTS, json!({"error": "slow down"})),
        (StatusCode::OK, completion("third time lucky")),
    ]);
    let oracle = oracle(spawn_mock(state.clone()).await);

    let reply = oracle
        .generate(&OracleRequest::new("sys", "user"))
        .await
        .unwrap();
    assert_eq!(reply, "third time lucky");
    assert_eq!(state.seen().len(), 3);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let state = MockState::new(vec![
        (StatusCode::BAD_REQUEST, json!({"error": "bad model"})),
        (StatusCode::OK, completion("unreachable")),
    ]);
    let oracle = oracle(spawn_mock(state.clone()).await);

    let err = oracle
        .generate(&OracleRequest::new("sys", "user"))
        .await
        .unwrap_err();
    match err.kind() {
        QuestErrorKind::Oracle(e) => match &e.kind {
            OracleErrorKind::Api { status, message } => {
                assert_eq!(*status, 400);
                assert!(message.contains("bad model"));
            }
            other => panic!("unexpected kind: {:?}", other),
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(state.seen().len(), 1);
}

#[tokio::test]
async fn test_retries_are_bounded() {
    let busy = (StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "down"}));
    let state = MockState::new(vec![busy.clone(), busy.clone(), busy.clone(), busy]);
    let oracle = oracle(spawn_mock(state.clone()).await);

    let err = oracle
        .generate(&OracleRequest::new("sys", "user"))
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), QuestErrorKind::Oracle(_)));
    // One attempt plus max_retries.
    assert_eq!(state.seen().len(), 3);
}

#[tokio::test]
async fn test_missing_content_is_empty_response() {
    let state = MockState::new(vec![(
        StatusCode::OK,
        json!({"choices": [{"message": {"role": "assistant", "content": null}}]}),
    )]);
    let oracle = oracle(spawn_mock(state).await);

    let err = oracle
        .generate(&OracleRequest::new("sys", "user"))
        .await
        .unwrap_err();
    match err.kind() {
        QuestErrorKind::Oracle(e) => {
            assert!(matches!(e.kind, OracleErrorKind::EmptyResponse(ref m) if m == "gpt-4o"))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let state = MockState::new(vec![(StatusCode::OK, json!({"unexpected": true}))]);
    let oracle = oracle(spawn_mock(state).await);

    let err = oracle
        .generate(&OracleRequest::new("sys", "user"))
        .await
        .unwrap_err();
    match err.kind() {
        QuestErrorKind::Oracle(e) => {
            assert!(matches!(e.kind, OracleErrorKind::Deserialization(_)))
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_missing_api_key_is_configuration_error() {
    let config = OpenAiConfigBuilder::default()
        .api_key_env("QUESTMASTER_TEST_KEY_THAT_IS_NEVER_SET")
        .build()
        .unwrap();
    let err = OpenAiOracle::new(config).unwrap_err();
    assert!(matches!(err.kind, OracleErrorKind::Configuration(ref m)
        if m.contains("QUESTMASTER_TEST_KEY_THAT_IS_NEVER_SET")));
}

#[test]
fn test_completions_url_tolerates_trailing_slash() {
    let config = OpenAiConfigBuilder::default()
        .base_url("http://localhost:8080/v1/")
        .build()
        .unwrap();
    assert_eq!(
        config.completions_url(),
        "http://localhost:8080/v1/chat/completions"
    );
}

#[test]
fn test_debug_redacts_api_key() {
    let config = OpenAiConfigBuilder::default()
        .api_key("sk-secret")
        .build()
        .unwrap();
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_request_omits_unset_max_tokens() {
    let request = ChatCompletionRequest::from_oracle(
        &OracleRequest::new("sys", "user"),
        "local-model",
        0.2,
        None,
    );
    let value = serde_json::to_value(&request).unwrap();
    assert_eq!(value["model"], "local-model");
    assert!(value.get("max_tokens").is_none());
}
