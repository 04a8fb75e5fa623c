use crate::config::EnvSnapshot;
use crate::{Error, ErrorContext, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Proxy;
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

/// Process-level HTTP knobs (env-overridable).
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub connect_timeout: Duration,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout: Duration,
    pub proxy_url: Option<String>,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
            proxy_url: None,
        }
    }
}

impl HttpSettings {
    /// - `AI_HTTP_CONNECT_TIMEOUT_SECS` (default 30)
    /// - `AI_HTTP_POOL_MAX_IDLE_PER_HOST` (default 32)
    /// - `AI_HTTP_POOL_IDLE_TIMEOUT_SECS` (default 90)
    /// - `AI_PROXY_URL`
    pub fn from_env(env: &EnvSnapshot) -> Self {
        let defaults = Self::default();
        Self {
            connect_timeout: env
                .number("AI_HTTP_CONNECT_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.connect_timeout),
            pool_max_idle_per_host: env
                .number("AI_HTTP_POOL_MAX_IDLE_PER_HOST")
                .map(|n| n as usize)
                .unwrap_or(defaults.pool_max_idle_per_host),
            pool_idle_timeout: env
                .number("AI_HTTP_POOL_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.pool_idle_timeout),
            proxy_url: env.get("AI_PROXY_URL").map(|s| s.to_string()),
        }
    }
}

/// A reusable client bound to one effective provider configuration.
///
/// Recognized option keys: `baseURL` (required), `apiKey`, `headers`
/// (string map) and `timeout` (milliseconds, or `false` to disable).
/// Fractional timeouts are rounded to the nearest millisecond; zero or
/// negative values disable it, as does any non-numeric value (with a warning).
/// Other keys only take part in the fingerprint.
pub struct HttpTransport {
    client: reqwest::Client,
    provider_id: String,
    base_url: Url,
    api_key: Option<String>,
    headers: HeaderMap,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("provider_id", &self.provider_id)
            .field("base_url", &self.base_url.as_str())
            .field("has_api_key", &self.api_key.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpTransport {
    pub fn from_options(
        provider_id: &str,
        options: &Map<String, Value>,
        settings: &HttpSettings,
    ) -> Result<Self> {
        let base_url = parse_base_url(provider_id, options)?;
        let api_key = options
            .get("apiKey")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());
        let headers = parse_headers(provider_id, options.get("headers"))?;
        let timeout = parse_timeout(provider_id, options.get("timeout"));

        let mut builder = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(settings.pool_max_idle_per_host)
            .pool_idle_timeout(Some(settings.pool_idle_timeout))
            // Conservative HTTP/2 keepalive defaults for long-lived streams.
            .http2_adaptive_window(true)
            .http2_keep_alive_interval(Some(Duration::from_secs(30)))
            .http2_keep_alive_timeout(Duration::from_secs(10));

        if let Some(proxy_url) = &settings.proxy_url {
            match Proxy::all(proxy_url) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => tracing::warn!(error = %e, "ignoring invalid AI_PROXY_URL"),
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::Transport(TransportError::Other(e.to_string())))?;

        Ok(Self {
            client,
            provider_id: provider_id.to_string(),
            base_url,
            api_key,
            headers,
            timeout,
        })
    }

    pub fn provider_id(&self) -> &str {
        &self.provider_id
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Request timeout from the `timeout` option, if enabled.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// `<baseURL>/<path>`; the base path is kept (a missing trailing slash is not a file name).
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// POST a JSON body. Only connection-level failures are errors here; the
    /// status code is left to the caller.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        client_request_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        let mut req = self.client.post(&url).headers(self.headers.clone()).json(body);

        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        if body.get("stream").and_then(|v| v.as_bool()) == Some(true) {
            req = req.header(ACCEPT, "text/event-stream");
        }
        if let Some(id) = client_request_id {
            req = req.header("x-client-request-id", id);
        }

        req.send()
            .await
            .map_err(|e| Error::Transport(TransportError::Http(e)))
    }
}

fn parse_timeout(provider_id: &str, value: Option<&Value>) -> Option<Duration> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => None,
        Some(Value::Number(n)) => n
            .as_f64()
            .map(f64::round)
            .filter(|ms| *ms >= 1.0)
            .map(|ms| Duration::from_millis(ms as u64)),
        Some(other) => {
            tracing::warn!(
                provider_id,
                timeout = %other,
                "ignoring non-numeric timeout option"
            );
            None
        }
    }
}

fn parse_base_url(provider_id: &str, options: &Map<String, Value>) -> Result<Url> {
    let field = format!("provider.{}.options.baseURL", provider_id);
    let raw = options
        .get("baseURL")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            Error::configuration_with_context(
                "missing base URL",
                ErrorContext::new().with_field_path(field.clone()),
            )
        })?;
    let url = Url::parse(raw).map_err(|e| {
        Error::configuration_with_context(
            format!("invalid base URL: {}", e),
            ErrorContext::new()
                .with_field_path(field.clone())
                .with_details(raw.to_string()),
        )
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::configuration_with_context(
            format!("unsupported URL scheme '{}'", url.scheme()),
            ErrorContext::new().with_field_path(field),
        ));
    }
    Ok(url)
}

fn parse_headers(provider_id: &str, raw: Option<&Value>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let Some(raw) = raw else {
        return Ok(headers);
    };
    let field = format!("provider.{}.options.headers", provider_id);
    let map = raw.as_object().ok_or_else(|| {
        Error::configuration_with_context(
            "headers must be an object",
            ErrorContext::new().with_field_path(field.clone()),
        )
    })?;
    for (name, value) in map {
        let value = value.as_str().ok_or_else(|| {
            Error::configuration_with_context(
                "header values must be strings",
                ErrorContext::new().with_field_path(format!("{}.{}", field, name)),
            )
        })?;
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid header name: {}", e),
                ErrorContext::new().with_field_path(field.clone()),
            )
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid header value: {}", e),
                ErrorContext::new().with_field_path(format!("{}.{}", field, name)),
            )
        })?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
