//! Integration tests for error handling

use crate::integration::mock_server::MockServerFixture;
use ai_provider_runtime::{DispatchOptions, Error, Message};
use futures::StreamExt;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Drive a dispatch to completion and return the first error, whether it
/// surfaced before the response or while reading the body.
async fn first_error(
    result: ai_provider_runtime::Result<ai_provider_runtime::DispatchResponse>,
) -> Option<Error> {
    let mut stream = match result {
        Ok(response) => response.into_stream(),
        Err(e) => return Some(e),
    };
    while let Some(item) = stream.next().await {
        if let Err(e) = item {
            return Some(e);
        }
    }
    None
}

#[tokio::test]
async fn test_not_found_is_remote_error() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(404, r#"{"error":{"message":"no such model","type":"invalid_request_error"}}"#, None)
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let err = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    match err {
        Error::Remote { status, class, message, retryable } => {
            assert_eq!(status, 404);
            assert_eq!(class, "not_found");
            assert_eq!(message, "no such model");
            assert!(!retryable);
        }
        other => panic!("Expected remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rate_limit_is_retryable() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_json_response(429, r#"{"message":"slow down"}"#, None)
        .await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let err = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(err.to_string().contains("slow down"));
}

#[tokio::test]
async fn test_invalid_base_url_is_init_error() {
    let fixture = MockServerFixture::new().await;
    let config = ai_provider_runtime::config::Config::parse(
        r#"{"provider": {"corethink": {"options": {"baseURL": "not a url"}}}}"#,
    )
    .unwrap();
    let store = ai_provider_runtime::auth::MemoryCredentialStore::new().with(
        "corethink",
        ai_provider_runtime::auth::Credential::api("sk_test_key"),
    );
    let dispatcher = fixture.dispatcher_with(config, std::sync::Arc::new(store));
    let model = MockServerFixture::model(&dispatcher).await;

    let err = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    match &err {
        Error::Init { provider_id } => assert_eq!(provider_id, "corethink"),
        other => panic!("Expected init error, got {:?}", other),
    }
    assert!(!err.to_string().contains("not a url"));
    assert_eq!(dispatcher.state().cached_transports(), 0);
}

#[tokio::test]
async fn test_unknown_model_lists_suggestions() {
    let fixture = MockServerFixture::new().await;
    let dispatcher = fixture.dispatcher("");
    match dispatcher.resolve_model("corethink", "gpt-4o").await.unwrap_err() {
        Error::ModelNotFound { provider_id, model_id, suggestions } => {
            assert_eq!(provider_id, "corethink");
            assert_eq!(model_id, "gpt-4o");
            assert_eq!(suggestions, vec!["corethink".to_string()]);
        }
        other => panic!("Expected model not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dispatch_to_unknown_provider_or_model_is_model_not_found() {
    let fixture = MockServerFixture::new().await;
    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;

    let mut ghost_provider = model.clone();
    ghost_provider.provider_id = "ghost".to_string();
    let err = dispatcher
        .dispatch(&ghost_provider, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    match err {
        Error::ModelNotFound { provider_id, model_id, suggestions } => {
            assert_eq!(provider_id, "ghost");
            assert_eq!(model_id, "corethink");
            assert_eq!(suggestions, vec!["corethink".to_string()]);
        }
        other => panic!("Expected model not found, got {:?}", other),
    }

    let mut ghost_model = model.clone();
    ghost_model.id = "ghost-model".to_string();
    let err = dispatcher
        .dispatch(&ghost_model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    match err {
        Error::ModelNotFound { provider_id, model_id, suggestions } => {
            assert_eq!(provider_id, "corethink");
            assert_eq!(model_id, "ghost-model");
            assert_eq!(suggestions, vec!["corethink".to_string()]);
        }
        other => panic!("Expected model not found, got {:?}", other),
    }
    assert_eq!(dispatcher.state().cached_transports(), 0);
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_slow_body(Duration::from_secs(2)).await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let options = DispatchOptions::streaming().timeout(Duration::from_millis(200));
    let err = first_error(
        dispatcher
            .dispatch(&model, &[Message::user("hi")], options)
            .await,
    )
    .await;
    match err {
        Some(Error::Timeout { after_ms }) => assert_eq!(after_ms, 200),
        other => panic!("Expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_timeout_applies() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_slow_body(Duration::from_secs(2)).await;

    let dispatcher = fixture.dispatcher(r#", "timeout": 150"#);
    let model = MockServerFixture::model(&dispatcher).await;
    let err = first_error(
        dispatcher
            .dispatch(&model, &[Message::user("hi")], DispatchOptions::streaming())
            .await,
    )
    .await;
    assert!(matches!(err, Some(Error::Timeout { after_ms: 150 })), "got {:?}", err);
}

#[tokio::test]
async fn test_cancellation_aborts_request() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_slow_body(Duration::from_secs(2)).await;

    let dispatcher = fixture.dispatcher("");
    let model = MockServerFixture::model(&dispatcher).await;
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = std::time::Instant::now();
    let err = first_error(
        dispatcher
            .dispatch(
                &model,
                &[Message::user("hi")],
                DispatchOptions::streaming().cancel_token(token),
            )
            .await,
    )
    .await;
    assert!(matches!(err, Some(Error::Cancelled)), "got {:?}", err);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let dispatcher = {
        let fixture = MockServerFixture::new().await;
        let config = ai_provider_runtime::config::Config::parse(
            r#"{"provider": {"corethink": {"options": {"baseURL": "http://127.0.0.1:1"}}}}"#,
        )
        .unwrap();
        let store = ai_provider_runtime::auth::MemoryCredentialStore::new().with(
            "corethink",
            ai_provider_runtime::auth::Credential::api("sk_test_key"),
        );
        fixture.dispatcher_with(config, std::sync::Arc::new(store))
    };
    let model = MockServerFixture::model(&dispatcher).await;
    let err = dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {:?}", err);
}
