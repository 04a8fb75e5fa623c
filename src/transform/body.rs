//! Wire-level normalization of serialized chat bodies.

use serde_json::Value;

/// Apply the blank-tool-call rule to an already serialized chat request body.
///
/// Every `messages[*]` entry with `role == "assistant"`, a non-empty
/// `tool_calls` array and a whitespace-only string `content` gets
/// `content: null`. Bodies without a `messages` array are returned unchanged.
pub fn sanitize_request_body(mut body: Value) -> Value {
    let Some(messages) = body.get_mut("messages").and_then(Value::as_array_mut) else {
        return body;
    };
    for msg in messages.iter_mut() {
        let Some(obj) = msg.as_object_mut() else {
            continue;
        };
        let is_assistant = obj.get("role").and_then(Value::as_str) == Some("assistant");
        let has_tool_calls = obj
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| !calls.is_empty())
            .unwrap_or(false);
        let blank = obj
            .get("content")
            .and_then(Value::as_str)
            .map(|s| s.trim().is_empty())
            .unwrap_or(false);
        if is_assistant && has_tool_calls && blank {
            obj.insert("content".into(), Value::Null);
        }
    }
    body
}
