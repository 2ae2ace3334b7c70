//! Integration tests for `GeminiProvider` against a mocked endpoint.
//!
//! These tests verify that:
//! - Requests hit `models/{model}:generateContent` with the API key header
//! - Text parts of the reply are returned as content
//! - A reply without text yields empty content instead of an error
//! - Non-2xx replies surface as errors carrying the endpoint's message
//! - A configured request timeout ends a slow call with an error

use std::time::Duration;

use omnilingua_core::{ChatMessage, LLMProvider};
use omnilingua_providers::GeminiProvider;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new("test-api-key".to_string()).with_base_url(server.uri())
}

#[tokio::test]
async fn test_chat_returns_reply_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "សួស្តី"}]}],
            "systemInstruction": {"parts": [{"text": "Answer in the user's language."}]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "សួស្តី! "}, {"text": "តើខ្ញុំអាចជួយអ្វីបាន?"}]}}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 9, "totalTokenCount": 21}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .chat(
            "Answer in the user's language.",
            &[ChatMessage::user("សួស្តី")],
            "gemini-2.5-flash",
        )
        .await
        .unwrap();

    assert_eq!(response.content, "សួស្តី! តើខ្ញុំអាចជួយអ្វីបាន?");
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(21));
}

#[tokio::test]
async fn test_chat_without_text_returns_empty_content() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&server)
        .await;

    let response = provider(&server)
        .chat("", &[ChatMessage::user("hi")], "gemini-2.5-flash")
        .await
        .unwrap();

    assert!(response.content.is_empty());
}

#[tokio::test]
async fn test_chat_error_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = provider(&server)
        .chat("", &[ChatMessage::user("hi")], "gemini-2.5-flash")
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("403"), "unexpected error: {message}");
    assert!(message.contains("PERMISSION_DENIED: API key not valid"));
}

#[tokio::test]
async fn test_chat_replays_history_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/custom-model:generateContent"))
        .and(body_partial_json(json!({
            "contents": [
                {"role": "user", "parts": [{"text": "Hola"}]},
                {"role": "model", "parts": [{"text": "¡Hola!"}]},
                {"role": "user", "parts": [{"text": "¿Qué tal?"}]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": "Bien"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let history = [
        ChatMessage::user("Hola"),
        ChatMessage::model("¡Hola!"),
        ChatMessage::user("¿Qué tal?"),
    ];
    let response = provider(&server)
        .chat("", &history, "custom-model")
        .await
        .unwrap();

    assert_eq!(response.content, "Bien");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let result = GeminiProvider::new("k".to_string())
        .with_base_url(uri)
        .chat("", &[ChatMessage::user("hi")], "gemini-2.5-flash")
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"candidates": []}))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let result = GeminiProvider::new("k".to_string())
        .with_timeout(Duration::from_millis(100))
        .unwrap()
        .with_base_url(server.uri())
        .chat("", &[ChatMessage::user("hi")], "gemini-2.5-flash")
        .await;

    assert!(result.is_err());
}
