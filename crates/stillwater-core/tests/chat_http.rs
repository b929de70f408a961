//! Chat completion client against a mock endpoint.

use std::sync::Arc;

use stillwater_core::services::{ChatClient, ChatMessage};
use stillwater_core::{ChatCompanion, ChatError, OpenAiChatClient, FALLBACK_REPLY};

fn client_for(server: &mockito::Server, key: Option<&str>) -> OpenAiChatClient {
    OpenAiChatClient::new(&format!("{}/v1/", server.url()), "test-model", key.map(String::from))
        .unwrap()
}

#[tokio::test]
async fn successful_completion_returns_trimmed_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"model":"test-model","messages":[{"role":"system","content":"be kind"},{"role":"assistant","content":"earlier"},{"role":"user","content":"hello"}]}"#.to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"  Hi there.  "}}]}"#)
        .create_async()
        .await;

    let client = client_for(&server, Some("sk-test"));
    let reply = client
        .send_message("hello", &[ChatMessage::assistant("earlier")], "be kind")
        .await
        .unwrap();

    assert_eq!(reply, "Hi there.");
    mock.assert_async().await;
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let err = client_for(&server, Some("k"))
        .send_message("hi", &[], "sys")
        .await
        .unwrap_err();
    match err {
        ChatError::Status { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_are_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let err = client_for(&server, Some("k"))
        .send_message("hi", &[], "sys")
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::MalformedResponse(_)));
}

#[tokio::test]
async fn companion_falls_back_when_endpoint_fails() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(500)
        .create_async()
        .await;

    let client: Arc<dyn ChatClient> = Arc::new(client_for(&server, Some("k")));
    let mut companion = ChatCompanion::new(client, "sys", 10);
    assert_eq!(companion.reply("are you there?").await, FALLBACK_REPLY);
    assert!(companion.history().is_empty());
}
