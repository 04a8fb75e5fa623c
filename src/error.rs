use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "provider.corethink.options.baseURL")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_loader", "credential_store")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for the provider runtime.
///
/// Per-line stream anomalies are deliberately absent: a malformed event line is
/// passed through by the rewriter and never becomes an `Error`.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport construction failed. The underlying cause is logged, not displayed,
    /// so upstream error text never reaches the user.
    #[error("Failed to initialize provider '{provider_id}'")]
    Init { provider_id: String },

    #[error("Model not found: {provider_id}/{model_id}{}", format_suggestions(.suggestions))]
    ModelNotFound {
        provider_id: String,
        model_id: String,
        suggestions: Vec<String>,
    },

    #[error("Network transport error: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("Remote error: HTTP {status} ({class}): {message}")]
    Remote {
        status: u16,
        class: String,
        message: String,
        retryable: bool,
    },

    #[error("Request cancelled")]
    Cancelled,

    #[error("Request timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Credential store error: {0}")]
    Credential(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML syntax error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean: {})", suggestions.join(", "))
    }
}

impl Error {
    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::configuration_with_context(msg, ErrorContext::new())
    }

    pub fn init(provider_id: impl Into<String>) -> Self {
        Error::Init {
            provider_id: provider_id.into(),
        }
    }

    pub fn model_not_found(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        Error::ModelNotFound {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            suggestions,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Whether the caller may reasonably retry the same request.
    ///
    /// Resolution failures never are; network failures and retryable remote
    /// statuses are. Retrying is left to the calling layer.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) | Error::Timeout { .. } => true,
            Error::Remote { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_not_found_lists_suggestions() {
        let err = Error::model_not_found("corethink", "gpt", vec!["corethink".into()]);
        assert_eq!(
            err.to_string(),
            "Model not found: corethink/gpt (did you mean: corethink)"
        );
    }

    #[test]
    fn init_error_only_names_provider() {
        let err = Error::init("corethink");
        assert_eq!(err.to_string(), "Failed to initialize provider 'corethink'");
        assert!(!err.is_retryable());
    }

    #[test]
    fn configuration_context_is_rendered() {
        let err = Error::configuration_with_context(
            "invalid base url",
            ErrorContext::new()
                .with_field_path("provider.corethink.options.baseURL")
                .with_source("config_loader"),
        );
        let text = err.to_string();
        assert!(text.contains("field: provider.corethink.options.baseURL"));
        assert!(text.contains("source: config_loader"));
        assert!(err.context().is_some());
    }
}
