use glucoplan::ai::{ClaudeClient, GenerationRequest, ProviderError, TextGenerator};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_claude_sends_messages_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "k"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-3-5-sonnet-20240620",
            "max_tokens": 1000,
            "temperature": 0.7,
            "system": "be brief",
            "messages": [{ "role": "user", "content": "plan please" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"content":[{"type":"text","text":"Breakfast: "},{"type":"text","text":"oats"}]}"#,
            "application/json",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = ClaudeClient::new("k", "claude-3-5-sonnet-20240620").with_base_url(server.uri());
    let request = GenerationRequest::new("plan please", 1000)
        .with_system("be brief")
        .with_temperature(0.7);
    let text = client.generate(&request).await.unwrap();
    assert_eq!(text, "Breakfast: oats");
}

#[tokio::test]
async fn test_claude_skips_non_text_blocks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"content":[{"type":"tool_use","id":"t1"},{"type":"text","text":"Lunch"}]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let client = ClaudeClient::new("k", "m").with_base_url(server.uri());
    let text = client
        .generate(&GenerationRequest::new("p", 10))
        .await
        .unwrap();
    assert_eq!(text, "Lunch");
}

#[tokio::test]
async fn test_claude_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid x-api-key"))
        .mount(&server)
        .await;

    let client = ClaudeClient::new("bad", "m").with_base_url(server.uri());
    let err = client
        .generate(&GenerationRequest::new("p", 10))
        .await
        .unwrap_err();
    match err {
        ProviderError::Status {
            provider,
            status,
            body,
        } => {
            assert_eq!(provider, "claude");
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "invalid x-api-key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_claude_empty_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"content":[]}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let client = ClaudeClient::new("k", "m").with_base_url(server.uri());
    let err = client
        .generate(&GenerationRequest::new("p", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::EmptyResponse { provider: "claude" }));
}

#[tokio::test]
async fn test_claude_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let client = ClaudeClient::new("k", "m").with_base_url(server.uri());
    let err = client
        .generate(&GenerationRequest::new("p", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Decode { .. }));
}
