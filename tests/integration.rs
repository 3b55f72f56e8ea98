use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use vaultid_extract::{
    ai::{FieldExtractionService, GroqVisionClient},
    app::{App, AppServices, EXTRACT_PATH},
    models::{Config, ErrorEnvelope, ExtractResponse},
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> Config {
    Config {
        groq_api_key: Some("gsk_integration".to_string()),
        groq_base_url: server.uri(),
        request_timeout: Some(Duration::from_secs(5)),
        ..Config::default()
    }
}

fn completion(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    }))
}

fn extract_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(EXTRACT_PATH)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_body(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_full_extraction_against_mock_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer gsk_integration"))
        .and(body_partial_json(serde_json::json!({
            "model": "meta-llama/llama-4-scout-17b-16e-instruct",
            "temperature": 0.0,
            "max_completion_tokens": 1024,
            "response_format": { "type": "json_object" }
        })))
        .respond_with(completion(
            "```json\n{\"surname\":\"Doe\",\"given_names\":\"Jane\",\"document_number\":\"X1234567\"}\n```",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let app = App::new(&config_for(&server));
    let response = app
        .router()
        .oneshot(extract_request(serde_json::json!({
            "mimeType": "image/png",
            "data64": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ExtractResponse = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(body.content.len(), 1);
    assert_eq!(body.content[0].block_type, "text");
    assert_eq!(
        body.content[0].text,
        r#"{"surname":"Doe","given_names":"Jane","document_number":"X1234567"}"#
    );
}

#[tokio::test]
async fn test_provider_rate_limit_is_relayed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "rate limited" }
        })))
        .mount(&server)
        .await;

    let response = App::new(&config_for(&server))
        .router()
        .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let envelope: ErrorEnvelope = serde_json::from_slice(&read_body(response).await).unwrap();
    assert_eq!(envelope.error.message, "rate limited");
}

#[tokio::test]
async fn test_unparseable_model_answer_is_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion("Sorry, I cannot process this."))
        .mount(&server)
        .await;

    let response = App::new(&config_for(&server))
        .router()
        .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let envelope: ErrorEnvelope = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(!envelope.error.message.is_empty());
}

#[tokio::test]
async fn test_identical_requests_are_not_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(r#"{"name":"Jane Doe"}"#))
        .expect(2)
        .mount(&server)
        .await;

    let app = App::new(&config_for(&server));
    for _ in 0..2 {
        let response = app
            .router()
            .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_unconfigured_key_never_calls_provider() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        groq_api_key: None,
        ..config_for(&server)
    };
    let response = App::new(&config)
        .router()
        .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_injected_client_uses_configured_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": "custom-vision" })))
        .respond_with(completion(r#"{"ok":true}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = GroqVisionClient::new(
        "key".to_string(),
        "custom-vision".to_string(),
        Some(Duration::from_secs(5)),
    )
    .with_base_url(server.uri());
    let app = App::with_services(
        AppServices {
            extractor: Some(Arc::new(client) as Arc<dyn FieldExtractionService>),
        },
        1024 * 1024,
    );

    let response = app
        .router()
        .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unreachable_provider_is_server_error() {
    let config = Config {
        groq_api_key: Some("gsk_integration".to_string()),
        groq_base_url: "http://127.0.0.1:1".to_string(),
        request_timeout: Some(Duration::from_secs(5)),
        ..Config::default()
    };

    let response = App::new(&config)
        .router()
        .oneshot(extract_request(serde_json::json!({ "data64": "abcd" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let envelope: ErrorEnvelope = serde_json::from_slice(&read_body(response).await).unwrap();
    assert!(!envelope.error.message.is_empty());
}
