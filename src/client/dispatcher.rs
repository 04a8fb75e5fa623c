use super::cancel::CancelScope;
use super::error_classification::remote_error;
use super::options::DispatchOptions;
use super::response::DispatchResponse;
use crate::model::{max_output_tokens, ModelDescriptor};
use crate::pipeline::rewrite_event_stream;
use crate::provider::{parse_model, ProviderState, Providers};
use crate::transform::{clean_schema, sanitize_messages, sanitize_request_body};
use crate::transport::{HttpTransport, TransportError};
use crate::types::Message;
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

const CHAT_COMPLETIONS_PATH: &str = "chat/completions";

/// Entry point for model resolution and chat requests.
///
/// Cheap to clone; clones share provider state and cached transports.
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<ProviderState>,
}

impl Dispatcher {
    pub fn new(state: Arc<ProviderState>) -> Self {
        Self { state }
    }

    /// Dispatcher over [`ProviderState::from_env`].
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(Arc::new(ProviderState::from_env()?)))
    }

    pub fn state(&self) -> &Arc<ProviderState> {
        &self.state
    }

    pub async fn list_providers(&self) -> Result<Providers> {
        Ok(self.state.providers().await?.as_ref().clone())
    }

    pub async fn resolve_model(&self, provider_id: &str, model_id: &str) -> Result<ModelDescriptor> {
        self.state.get_model(provider_id, model_id).await
    }

    pub async fn closest(&self, provider_id: &str, query: &[&str]) -> Result<Option<(String, String)>> {
        self.state.closest(provider_id, query).await
    }

    pub async fn suggestions(&self, query: &str) -> Result<Vec<String>> {
        self.state.suggestions(query).await
    }

    pub async fn default_model(&self) -> Result<(String, String)> {
        self.state.default_model().await
    }

    pub async fn small_model(&self, provider_id: &str) -> Result<Option<ModelDescriptor>> {
        self.state.small_model(provider_id).await
    }

    pub fn parse_model(model: &str) -> (String, String) {
        parse_model(model)
    }

    pub async fn transport(&self, model: &ModelDescriptor) -> Result<Arc<HttpTransport>> {
        self.state.transport(model).await
    }

    /// Send a chat request built from `messages`.
    ///
    /// Messages are sanitized for the model first. Event-stream responses
    /// come back rewritten; any other successful body is returned as is.
    pub async fn dispatch(
        &self,
        model: &ModelDescriptor,
        messages: &[Message],
        options: DispatchOptions,
    ) -> Result<DispatchResponse> {
        let transport = self.transport(model).await?;
        let messages = sanitize_messages(messages, model);
        let body = build_chat_body(model, &messages, &options)?;
        self.send(model, &transport, body, options).await
    }

    /// Send a pre-built chat body. Only the wire-level tool-call fix is applied;
    /// `options` contributes cancellation and timeout.
    pub async fn dispatch_json(
        &self,
        model: &ModelDescriptor,
        body: Value,
        options: DispatchOptions,
    ) -> Result<DispatchResponse> {
        let transport = self.transport(model).await?;
        self.send(model, &transport, sanitize_request_body(body), options)
            .await
    }

    async fn send(
        &self,
        model: &ModelDescriptor,
        transport: &HttpTransport,
        body: Value,
        options: DispatchOptions,
    ) -> Result<DispatchResponse> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let scope = CancelScope::new(options.cancel, options.timeout.or(transport.timeout()));
        let started = Instant::now();
        debug!(
            provider_id = model.provider_id.as_str(),
            model = model.api.id.as_str(),
            request_id = request_id.as_str(),
            "dispatching chat request"
        );

        let response = scope
            .run(transport.post_json(CHAT_COMPLETIONS_PATH, &body, Some(&request_id)))
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = scope
                .run(async {
                    response
                        .bytes()
                        .await
                        .map_err(|e| Error::Transport(TransportError::Http(e)))
                })
                .await?;
            let err = remote_error(status.as_u16(), &body);
            if let Error::Remote { class, .. } = &err {
                info!(
                    provider_id = model.provider_id.as_str(),
                    request_id = request_id.as_str(),
                    http_status = status.as_u16(),
                    error_class = class.as_str(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "chat request failed"
                );
            }
            return Err(err);
        }

        let headers = response.headers().clone();
        let is_event_stream = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.to_ascii_lowercase().contains("text/event-stream"))
            .unwrap_or(false);

        let raw: BoxStream<'static, Bytes> = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| Error::Transport(TransportError::Http(e)))),
        );
        let body = if is_event_stream {
            rewrite_event_stream(raw)
        } else {
            raw
        };

        debug!(
            provider_id = model.provider_id.as_str(),
            request_id = request_id.as_str(),
            http_status = status.as_u16(),
            is_event_stream,
            duration_ms = started.elapsed().as_millis() as u64,
            "response headers received"
        );

        Ok(DispatchResponse {
            status: status.as_u16(),
            headers,
            is_event_stream,
            body: scope.guard_stream(body),
            request_id,
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("cached_transports", &self.state.cached_transports())
            .finish()
    }
}

/// OpenAI-compatible chat body for already sanitized `messages`.
pub(crate) fn build_chat_body(
    model: &ModelDescriptor,
    messages: &[Message],
    options: &DispatchOptions,
) -> Result<Value> {
    let mut body = Map::new();
    body.insert("model".into(), Value::String(model.api.id.clone()));
    body.insert("messages".into(), serde_json::to_value(messages)?);

    if options.stream {
        body.insert("stream".into(), Value::Bool(true));
        body.insert(
            "stream_options".into(),
            serde_json::json!({ "include_usage": true }),
        );
    }
    if let Some(t) = options.temperature.filter(|_| model.capabilities.temperature) {
        body.insert("temperature".into(), serde_json::json!(t));
    }
    if let Some(global) = options.max_tokens {
        body.insert(
            "max_tokens".into(),
            Value::from(max_output_tokens(model.limit.output, global)),
        );
    }
    if !options.tools.is_empty() {
        let mut tools = serde_json::to_value(&options.tools)?;
        if let Some(list) = tools.as_array_mut() {
            for tool in list.iter_mut() {
                if let Some(params) = tool.pointer_mut("/function/parameters") {
                    *params = clean_schema(params);
                }
            }
        }
        body.insert("tools".into(), tools);
    }
    if let Some(choice) = &options.tool_choice {
        body.insert("tool_choice".into(), choice.clone());
    }
    for (key, value) in &options.extra {
        body.insert(key.clone(), value.clone());
    }
    Ok(Value::Object(body))
}
