//! Error classification logic

use crate::Error;
use serde_json::Value;

const MAX_MESSAGE_CHARS: usize = 500;

/// Standard error class for an HTTP status.
pub fn classify_status(status: u16) -> &'static str {
    match status {
        400 | 422 => "invalid_request",
        401 => "authentication",
        403 => "permission_denied",
        404 => "not_found",
        408 | 504 => "timeout",
        409 => "conflict",
        413 => "request_too_large",
        429 => "rate_limited",
        503 | 529 => "overloaded",
        500..=599 => "server_error",
        _ => "unknown",
    }
}

/// Whether a request that failed with `error_class` may succeed if repeated.
pub fn is_retryable_class(error_class: &str) -> bool {
    matches!(
        error_class,
        "rate_limited" | "overloaded" | "server_error" | "timeout" | "conflict"
    )
}

/// Build an [`Error::Remote`] from a non-success response.
///
/// The message is the upstream `error.message` (or top-level `message`) when
/// the body is JSON, else the trimmed body text, capped in length.
pub(crate) fn remote_error(status: u16, body: &[u8]) -> Error {
    let class = classify_status(status);
    Error::Remote {
        status,
        class: class.to_string(),
        message: extract_message(body),
        retryable: is_retryable_class(class),
    }
}

fn extract_message(body: &[u8]) -> String {
    let from_json = serde_json::from_slice::<Value>(body).ok().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("message"))
            .or_else(|| v.get("error").filter(|e| e.is_string()))
            .and_then(Value::as_str)
            .map(str::to_string)
    });
    let message = from_json.unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    if message.chars().count() > MAX_MESSAGE_CHARS {
        let cut: String = message.chars().take(MAX_MESSAGE_CHARS).collect();
        format!("{}…", cut)
    } else {
        message
    }
}
