//! Mock HTTP server tests for `OpenAiCompatProvider::complete()`.
//!
//! Uses [`wiremock`] to emulate an OpenAI-compatible endpoint so the full
//! request/response path runs without a real API.

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use draftgate_llm::{
    ChatMessage, ChatRequest, LlmProviderConfig, OpenAiCompatProvider, Provider, ProviderError,
};

fn mock_config(server_url: &str) -> LlmProviderConfig {
    let mut config = LlmProviderConfig::openai("test-model");
    config.name = "mock-provider".into();
    config.base_url = server_url.into();
    config.api_key_env = "DRAFTGATE_MOCK_UNUSED_KEY".into();
    config
}

fn test_request() -> ChatRequest {
    ChatRequest::new("test-model", vec![ChatMessage::user("Follow up on invoice #123")])
}

fn provider(server: &MockServer) -> OpenAiCompatProvider {
    OpenAiCompatProvider::with_api_key(mock_config(&server.uri()), "sk-mock-key".into())
}

#[tokio::test]
async fn complete_success_text_response() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "chatcmpl-001",
        "object": "chat.completion",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "Dear team,\n\nPlease see invoice #123." },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 9, "total_tokens": 21 }
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-mock-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server).complete(&test_request()).await.unwrap();

    assert_eq!(response.id, "chatcmpl-001");
    assert_eq!(
        response.first_content(),
        Some("Dear team,\n\nPlease see invoice #123.")
    );
    assert_eq!(response.usage.unwrap().total_tokens, 21);
}

#[tokio::test]
async fn structured_request_sends_response_format() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "id": "chatcmpl-002",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"subject\":\"Invoice\",\"body\":\"Hi\"}" },
            "finish_reason": "stop"
        }]
    });

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "response_format": { "type": "json_schema", "json_schema": { "name": "email" } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let request = test_request().with_json_schema("email", serde_json::json!({"type": "object"}));
    let response = provider(&server).complete(&request).await.unwrap();
    assert!(response.first_content().unwrap().contains("\"subject\""));
}

#[tokio::test]
async fn unauthorized_maps_to_auth_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server).complete(&test_request()).await.unwrap_err();
    match err {
        ProviderError::AuthFailed(msg) => assert_eq!(msg, "Incorrect API key provided"),
        other => panic!("expected AuthFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_is_reported_once() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "2"))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server).complete(&test_request()).await.unwrap_err();
    match err {
        ProviderError::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, 2000),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn not_found_maps_to_model_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such model"))
        .mount(&server)
        .await;

    let err = provider(&server).complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::ModelNotFound(ref m) if m.contains("test-model")));
}

#[tokio::test]
async fn server_error_maps_to_request_failed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = provider(&server).complete(&test_request()).await.unwrap_err();
    match err {
        ProviderError::RequestFailed(msg) => {
            assert!(msg.contains("500"));
            assert!(msg.contains("boom"));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ nope"))
        .mount(&server)
        .await;

    let err = provider(&server).complete(&test_request()).await.unwrap_err();
    assert!(matches!(err, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn custom_headers_are_forwarded() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("x-org", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "h", "model": "test-model",
            "choices": [{ "index": 0, "message": { "role": "assistant", "content": "ok" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = mock_config(&server.uri());
    config.headers.insert("x-org".into(), "acme".into());
    let provider = OpenAiCompatProvider::with_api_key(config, "k".into());

    let response = provider.complete(&test_request()).await.unwrap();
    assert_eq!(response.first_content(), Some("ok"));
}
