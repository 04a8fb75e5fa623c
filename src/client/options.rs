use crate::types::ToolDefinition;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Per-call settings for [`Dispatcher::dispatch`](super::Dispatcher::dispatch).
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub stream: bool,
    /// Ignored for models without temperature support.
    pub temperature: Option<f64>,
    /// Global output budget; capped further by the model's own limit.
    pub max_tokens: Option<u64>,
    pub tools: Vec<ToolDefinition>,
    pub tool_choice: Option<Value>,
    /// Extra top-level body fields, applied last.
    pub extra: Map<String, Value>,
    pub cancel: Option<CancellationToken>,
    /// Overrides the provider `timeout` option for this call.
    pub timeout: Option<Duration>,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn streaming() -> Self {
        Self {
            stream: true,
            ..Self::default()
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn tool_choice(mut self, choice: Value) -> Self {
        self.tool_choice = Some(choice);
        self
    }

    pub fn extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
