//! Integration tests for request construction and non-streaming responses

use crate::integration::mock_server::{MockServerFixture, CHAT_PATH, TEST_KEY};
use ai_provider_runtime::{ContentPart, DispatchOptions, Message, ToolCall};
use serde_json::json;

const COMPLETION: &str = r#"{"id":"c1","choices":[{"index":0,"message":{"role":"assistant","content":"ok"}}],"usage":{"total_tokens":3}}"#;

#[tokio::test]
async fn test_json_response_passes_through() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            200,
            COMPLETION,
            Some(json!({"model": "corethink", "messages": [{"role": "user", "content": "hi"}]})),
        )
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let response = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    assert!(!response.is_event_stream);
    assert_eq!(&response.bytes().await.unwrap()[..], COMPLETION.as_bytes());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_blank_tool_call_content_is_sent_as_null() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            200,
            COMPLETION,
            Some(json!({"messages": [
                {"role": "user", "content": "list files"},
                {"role": "assistant", "content": null, "tool_calls": [
                    {"id": "call_1", "type": "function", "function": {"name": "ls", "arguments": "{}"}}
                ]},
                {"role": "tool", "content": "a.txt", "tool_call_id": "call_1"}
            ]})),
        )
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let messages = vec![
        Message::user("list files"),
        Message::assistant_tool_calls("  ", vec![ToolCall::function("call_1", "ls", "{}")]),
        Message::tool_result("call_1", "a.txt"),
    ];
    dispatcher
        .dispatch(&model, &messages, DispatchOptions::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unsupported_attachment_is_replaced_before_sending() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture
        .mock_json_response(
            200,
            COMPLETION,
            Some(json!({"messages": [{"role": "user", "content": [
                {"type": "text", "text": "what is this?"},
                {"type": "text", "text": "ERROR: Cannot read \"memo.mp3\" (this model does not support audio input). Inform the user."}
            ]}]})),
        )
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let messages = vec![Message::user_parts(vec![
        ContentPart::text("what is this?"),
        ContentPart::file_base64(Some("memo.mp3".into()), b"ID3\x03", "audio/mpeg"),
    ])];
    dispatcher
        .dispatch(&model, &messages, DispatchOptions::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_json_applies_wire_fix_and_headers() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .match_header("authorization", format!("Bearer {}", TEST_KEY).as_str())
            .match_header("x-team", "infra")
            .match_header("x-client-request-id", mockito::Matcher::Any)
            .match_body(mockito::Matcher::PartialJson(json!({
                "messages": [{"role": "assistant", "content": null}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(COMPLETION)
            .create_async()
            .await
    };

    let dispatcher = fixture.dispatcher(r#", "headers": {"x-team": "infra"}"#);
    let model = MockServerFixture::model(&dispatcher).await;
    let body = json!({
        "model": "corethink",
        "messages": [{"role": "assistant", "content": "", "tool_calls": [{"id": "1", "type": "function", "function": {"name": "f", "arguments": "{}"}}]}]
    });
    let value = dispatcher
        .dispatch_json(&model, body, DispatchOptions::new())
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(value["choices"][0]["message"]["content"], "ok");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_is_reused_across_requests() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_json_response(200, COMPLETION, None).await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    for _ in 0..3 {
        dispatcher
            .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
            .await
            .unwrap();
    }
    assert_eq!(dispatcher.state().cached_transports(), 1);

    let mut with_headers = model.clone();
    with_headers.headers.insert("x-variant".into(), "b".into());
    dispatcher
        .dispatch(&with_headers, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    assert_eq!(dispatcher.state().cached_transports(), 2);
}
