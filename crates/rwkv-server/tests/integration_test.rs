use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use rwkv_chat::ChatConfig;
use rwkv_engine::{
    EngineError, Evaluation, MockEngine, ModelState, Result as EngineResult, RwkvEngine, TokenId,
};
use rwkv_server::{create_router, AppState, ServerConfig, SessionManager};
use rwkv_tokenizer::ByteTokenizer;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn test_state(max_concurrent: usize) -> AppState {
    let config = ServerConfig {
        chat: ChatConfig::default(),
        max_concurrent_sessions: max_concurrent,
    };
    AppState {
        engine: Arc::new(MockEngine::new()),
        tokenizer: Arc::new(ByteTokenizer::new()),
        sessions: SessionManager::new(config.max_concurrent_sessions),
        config,
    }
}

/// Backend that fails every evaluation, standing in for resource exhaustion
/// or a corrupt model state.
struct FailingEngine;

impl RwkvEngine for FailingEngine {
    fn evaluate(&self, _tokens: &[TokenId], _prior: Option<&ModelState>) -> EngineResult<Evaluation> {
        Err(EngineError::Evaluation("backend down".to_string()))
    }

    fn vocab_size(&self) -> usize {
        256
    }

    fn system_info(&self) -> String {
        "failing backend".to_string()
    }
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

// -- Root endpoint --

#[tokio::test]
async fn root_returns_fixed_hello_body() {
    let app = create_router(test_state(4));
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"<p>Hello, World!</p>");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = create_router(test_state(4));
    let req = Request::builder()
        .uri("/")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("access-control-allow-origin"));
}

// -- Chat completion --

#[tokio::test]
async fn chat_completion_returns_result_field() {
    let app = create_router(test_state(4));
    let req = json_request(
        "/chat/completion",
        json!({"user_input": "Hi!", "max_length": 8}),
    );
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let body_str = String::from_utf8_lossy(&body);
    assert_eq!(status, StatusCode::OK, "body: {body_str}");

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["result"].is_string());
    assert!(json.get("error").is_none());
}

#[tokio::test]
async fn chat_completion_accepts_overrides_and_debug_flag() {
    let app = create_router(test_state(4));
    let req = json_request(
        "/chat/completion",
        json!({
            "user_input": "Hi!",
            "max_length": 4,
            "temperature": 0.9,
            "top_p": 0.3,
            "debug": true
        }),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    // debug is server-side logging only; the response shape is unchanged
    assert!(json["result"].is_string());
}

#[tokio::test]
async fn empty_user_input_is_rejected() {
    let app = create_router(test_state(4));
    let req = json_request("/chat/completion", json!({"user_input": ""}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.get("result").is_none());
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert!(json["error"]["message"].as_str().unwrap().contains("user_input"));
}

#[tokio::test]
async fn missing_user_input_is_a_client_error() {
    let app = create_router(test_state(4));
    let req = json_request("/chat/completion", json!({"max_length": 4}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn invalid_temperature_is_a_client_error() {
    let app = create_router(test_state(4));
    let req = json_request(
        "/chat/completion",
        json!({"user_input": "Hi!", "temperature": 0.0}),
    );
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["type"], "invalid_request_error");
}

#[tokio::test]
async fn engine_failure_mid_turn_is_a_server_error() {
    let mut state = test_state(4);
    state.engine = Arc::new(FailingEngine);
    let app = create_router(state);

    let req = json_request("/chat/completion", json!({"user_input": "Hi!"}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json.get("result").is_none(), "no partial output on failure");
    assert_eq!(json["error"]["type"], "server_error");
    assert!(json["error"]["message"].as_str().unwrap().contains("backend down"));
}

#[tokio::test]
async fn session_limit_comes_from_config() {
    let state = test_state(3);
    assert_eq!(
        state.sessions.max_concurrent(),
        state.config.max_concurrent_sessions
    );
}

#[tokio::test]
async fn at_capacity_returns_service_unavailable() {
    // Zero slots: every chat request fails fast.
    let app = create_router(test_state(0));
    let req = json_request("/chat/completion", json!({"user_input": "Hi!"}));
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn requests_are_independent_sessions() {
    // Two identical requests against fresh state produce identical results:
    // nothing leaks across turns except the per-request seed, which we pin
    // by comparing two full round-trips of the same deterministic backend.
    let body = json!({"user_input": "Hi!", "max_length": 6, "temperature": 0.0001});

    let app = create_router(test_state(4));
    let resp1 = app
        .clone()
        .oneshot(json_request("/chat/completion", body.clone()))
        .await
        .unwrap();
    let resp2 = app
        .oneshot(json_request("/chat/completion", body))
        .await
        .unwrap();

    let b1 = resp1.into_body().collect().await.unwrap().to_bytes();
    let b2 = resp2.into_body().collect().await.unwrap().to_bytes();
    let j1: Value = serde_json::from_slice(&b1).unwrap();
    let j2: Value = serde_json::from_slice(&b2).unwrap();
    assert_eq!(j1["result"], j2["result"]);
}
