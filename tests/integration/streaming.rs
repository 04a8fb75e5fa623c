//! Integration tests for event-stream responses

use crate::integration::mock_server::MockServerFixture;
use ai_provider_runtime::{DispatchOptions, Message};
use futures::StreamExt;

const UPSTREAM: &str = concat!(
    ": upstream keep-alive\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"reasoning\":\"Thinking\"}}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"usage\":{\"prompt_tokens\":4,\"completion_tokens\":2,\"total_tokens\":6}}\n",
    "\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"total_tokens\":6}}\n",
    "\n",
    "data: [DONE]\n",
    "\n",
);

const EXPECTED: &str = concat!(
    ": upstream keep-alive\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"Thinking\"}}]}\n",
    "\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hello\"}}]}\n",
    "\n",
    "\n",
    "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"total_tokens\":6}}\n",
    "\n",
    "data: [DONE]\n",
    "\n",
);

#[tokio::test]
async fn test_sse_response_is_rewritten() {
    let fixture = MockServerFixture::new().await;
    let mock = fixture.mock_sse_body(UPSTREAM).await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let response = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::streaming())
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert!(response.is_event_stream);
    let body = response.bytes().await.unwrap();
    assert_eq!(std::str::from_utf8(&body).unwrap(), EXPECTED);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stream_chunks_only_hold_complete_lines() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_sse_body(UPSTREAM).await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let mut stream = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::streaming())
        .await
        .unwrap()
        .into_stream();

    let mut collected = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.unwrap();
        assert!(chunk.ends_with(b"\n"));
        collected.extend_from_slice(&chunk);
    }
    assert_eq!(collected, EXPECTED.as_bytes());
}

#[tokio::test]
async fn test_unterminated_final_line_is_dropped() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_sse_body("data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\ndata: {\"choices\"")
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let body = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::streaming())
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&body[..], b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n");
}
