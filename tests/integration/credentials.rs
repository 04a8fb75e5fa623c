//! Integration tests for credential sources feeding the dispatcher

use crate::integration::mock_server::{MockServerFixture, CHAT_PATH};
use ai_provider_runtime::auth::{Credential, CredentialStore, FileCredentialStore};
use ai_provider_runtime::config::EnvSnapshot;
use ai_provider_runtime::model::builtin_providers;
use ai_provider_runtime::provider::ProviderSource;
use ai_provider_runtime::{DispatchOptions, Dispatcher, Message, ProviderState};
use std::sync::Arc;

const COMPLETION: &str = r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#;

async fn mock_with_key(fixture: &MockServerFixture, key: &str) -> mockito::Mock {
    let mut server = fixture.server.lock().await;
    server
        .mock("POST", CHAT_PATH)
        .match_header("authorization", format!("Bearer {}", key).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(COMPLETION)
        .create_async()
        .await
}

#[tokio::test]
async fn test_file_store_key_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("auth.json")));
    store.set("corethink", Credential::api("sk_from_file")).await.unwrap();

    let fixture = MockServerFixture::new().await;
    let mock = mock_with_key(&fixture, "sk_from_file").await;
    let dispatcher = fixture.dispatcher_with(fixture.config(""), store);

    let provider = dispatcher
        .state()
        .provider("corethink")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(provider.source, ProviderSource::Api);

    let model = MockServerFixture::model(&dispatcher).await;
    dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_env_key_wins_over_store_and_config() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("auth.json")));
    store.set("corethink", Credential::api("sk_from_file")).await.unwrap();

    let fixture = MockServerFixture::new().await;
    let mock = mock_with_key(&fixture, "sk_from_env").await;
    let state = ProviderState::new(
        fixture.config(r#", "apiKey": "sk_from_config""#),
        store,
        EnvSnapshot::empty().with("CORETHINK_API_KEY", "sk_from_env"),
        builtin_providers(),
    );
    let dispatcher = Dispatcher::new(Arc::new(state));

    let provider = dispatcher.state().provider("corethink").await.unwrap().unwrap();
    assert_eq!(provider.source, ProviderSource::Env);
    assert_eq!(provider.env, vec!["CORETHINK_API_KEY".to_string()]);

    let model = MockServerFixture::model(&dispatcher).await;
    dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reset_picks_up_new_credential() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("auth.json")));
    store.set("corethink", Credential::api("sk_old")).await.unwrap();

    let fixture = MockServerFixture::new().await;
    let old = mock_with_key(&fixture, "sk_old").await;
    let dispatcher = fixture.dispatcher_with(fixture.config(""), store.clone());
    let model = MockServerFixture::model(&dispatcher).await;
    dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    old.assert_async().await;

    store.set("corethink", Credential::api("sk_new")).await.unwrap();
    dispatcher.state().reset();
    assert_eq!(dispatcher.state().cached_transports(), 0);

    let new = mock_with_key(&fixture, "sk_new").await;
    dispatcher
        .dispatch(&model, &[Message::user("hi")], DispatchOptions::new())
        .await
        .unwrap();
    new.assert_async().await;
}

#[tokio::test]
async fn test_no_credential_means_no_provider() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileCredentialStore::new(dir.path().join("auth.json")));
    store
        .set(
            "corethink",
            Credential::Oauth {
                refresh: "r".into(),
                access: "a".into(),
                expires: 0,
            },
        )
        .await
        .unwrap();

    let fixture = MockServerFixture::new().await;
    let dispatcher = fixture.dispatcher_with(fixture.config(""), store);
    assert!(dispatcher.list_providers().await.unwrap().is_empty());
    assert!(dispatcher.default_model().await.is_err());
}
