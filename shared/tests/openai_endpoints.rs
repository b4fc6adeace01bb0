use serde_json::json;
use shared::openai_client::{ChatClient, CompletionBackend, PromptError};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ChatClient {
    ChatClient::new(
        &server.uri(),
        "test-key",
        "llama-test",
        Duration::from_secs(5),
    )
    .expect("client")
}

#[tokio::test]
async fn chat_endpoint_returns_first_choice_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({"model": "llama-test"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "{\"1\": [5, 5, 0.9]}"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let answer = client_for(&server).complete("ID: 1 Review: great food").await.unwrap();
    assert_eq!(answer, "{\"1\": [5, 5, 0.9]}");
}

#[tokio::test]
async fn trailing_slash_in_base_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": "ok"}}]
        })))
        .mount(&server)
        .await;

    let client = ChatClient::new(
        &format!("{}/", server.uri()),
        "k",
        "m",
        Duration::from_secs(5),
    )
    .unwrap();
    assert_eq!(client.complete("hi").await.unwrap(), "ok");
}

#[tokio::test]
async fn non_success_status_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("prompt").await.unwrap_err();
    assert!(matches!(err, PromptError::Http(401)));
}

#[tokio::test]
async fn missing_choices_is_an_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("prompt").await.unwrap_err();
    assert!(matches!(err, PromptError::EmptyResponse));
}

#[tokio::test]
async fn undecodable_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).complete("prompt").await.unwrap_err();
    assert!(matches!(err, PromptError::Parse(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    let client = ChatClient::new("http://127.0.0.1:9", "k", "m", Duration::from_secs(2)).unwrap();
    let err = client.complete("prompt").await.unwrap_err();
    assert!(matches!(err, PromptError::Network(_)));
}
