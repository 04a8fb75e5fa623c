//! Mock HTTP server setup for integration tests

use ai_provider_runtime::auth::{Credential, CredentialStore, MemoryCredentialStore};
use ai_provider_runtime::config::{Config, EnvSnapshot};
use ai_provider_runtime::model::builtin_providers;
use ai_provider_runtime::{Dispatcher, ModelDescriptor, ProviderState};
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const TEST_KEY: &str = "sk_test_key";
pub const CHAT_PATH: &str = "/chat/completions";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Configuration pointing the built-in provider at the mock server.
    pub fn config(&self, extra_options: &str) -> Config {
        Config::parse(&format!(
            r#"{{"provider": {{"corethink": {{"options": {{"baseURL": "{}"{}}}}}}}}}"#,
            self.base_url, extra_options
        ))
        .expect("fixture config")
    }

    pub fn dispatcher_with(&self, config: Config, store: Arc<dyn CredentialStore>) -> Dispatcher {
        let env = EnvSnapshot::empty();
        Dispatcher::new(Arc::new(ProviderState::new(
            config,
            store,
            env,
            builtin_providers(),
        )))
    }

    /// Dispatcher with a stored API key and the given extra provider options
    /// (a JSON fragment starting with a comma, or empty).
    pub fn dispatcher(&self, extra_options: &str) -> Dispatcher {
        let store = MemoryCredentialStore::new().with("corethink", Credential::api(TEST_KEY));
        self.dispatcher_with(self.config(extra_options), Arc::new(store))
    }

    pub async fn model(dispatcher: &Dispatcher) -> ModelDescriptor {
        dispatcher
            .resolve_model("corethink", "corethink")
            .await
            .expect("corethink model")
    }

    /// Mock an event-stream response with a verbatim body.
    pub async fn mock_sse_body(&self, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .match_header("authorization", format!("Bearer {}", TEST_KEY).as_str())
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream; charset=utf-8")
            .with_body(body)
            .create_async()
            .await
    }

    /// Mock a JSON response, optionally requiring the request body to contain `expect`.
    pub async fn mock_json_response(
        &self,
        status: u16,
        body: &str,
        expect: Option<serde_json::Value>,
    ) -> Mock {
        let mut server = self.server.lock().await;
        let mut mock = server
            .mock("POST", CHAT_PATH)
            .with_status(status as usize)
            .with_header("content-type", "application/json")
            .with_body(body);
        if let Some(expect) = expect {
            mock = mock.match_body(Matcher::PartialJson(expect));
        }
        mock.create_async().await
    }

    /// Mock a response whose body only starts after `delay`.
    pub async fn mock_slow_body(&self, delay: std::time::Duration) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", CHAT_PATH)
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_chunked_body(move |w| {
                w.write_all(b": connected\n")?;
                std::thread::sleep(delay);
                w.write_all(b"data: [DONE]\n")
            })
            .create_async()
            .await
    }
}
