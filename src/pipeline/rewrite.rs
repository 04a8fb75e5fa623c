//! Event-stream line rewriter (Bytes -> Bytes)
//!
//! Upstream OpenAI-compatible endpoints may send two kinds of events that
//! downstream consumers reject:
//! - usage-only accounting events (`usage` set, no `choices`), which are dropped
//! - deltas that carry text under `reasoning` instead of `content`, which are renamed
//!
//! Every other line is forwarded byte for byte, terminator included.

use crate::BoxStream;
use bytes::Bytes;
use futures::{stream, StreamExt};
use serde_json::{Map, Value};

/// Longest line buffered before it is forwarded unmodified.
pub const MAX_PENDING_LINE: usize = 4 * 1024 * 1024;

/// Incremental, chunk-boundary-safe line rewriter.
///
/// Bytes are buffered until a `\n` arrives, so a chunk may end anywhere,
/// including inside a multi-byte UTF-8 sequence. Only complete lines are
/// emitted, in input order, except that a line outgrowing the buffer limit
/// is forwarded as-is through its terminator.
#[derive(Debug)]
pub struct EventStreamRewriter {
    pending: Vec<u8>,
    max_line: usize,
    overflowed: bool,
}

impl Default for EventStreamRewriter {
    fn default() -> Self {
        Self::with_max_line(MAX_PENDING_LINE)
    }
}

impl EventStreamRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line,
            overflowed: false,
        }
    }

    /// Feed one chunk and return the rewritten bytes of every line it completed.
    pub fn push(&mut self, mut chunk: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        if self.overflowed {
            let Some(end) = chunk.iter().position(|b| *b == b'\n') else {
                return chunk.to_vec();
            };
            out.extend_from_slice(&chunk[..=end]);
            chunk = &chunk[end + 1..];
            self.overflowed = false;
        }

        self.pending.extend_from_slice(chunk);
        if let Some(last_newline) = self.pending.iter().rposition(|b| *b == b'\n') {
            let partial = self.pending.split_off(last_newline + 1);
            let complete = std::mem::replace(&mut self.pending, partial);
            out.reserve(complete.len());
            for line in complete.split_inclusive(|b| *b == b'\n') {
                rewrite_line(line, &mut out);
            }
        }

        if self.pending.len() > self.max_line {
            tracing::warn!(
                bytes = self.pending.len(),
                limit = self.max_line,
                "event line exceeds buffer limit, forwarding unmodified"
            );
            out.append(&mut self.pending);
            self.overflowed = true;
        }
        out
    }

    /// Bytes buffered without a terminating line break.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// End of input. An unterminated final line is incomplete and is dropped;
    /// returns how many bytes were discarded.
    pub fn finish(&mut self) -> usize {
        let discarded = self.pending.len();
        if discarded > 0 {
            tracing::debug!(bytes = discarded, "discarding unterminated final event line");
        }
        self.pending.clear();
        self.overflowed = false;
        discarded
    }
}

/// Wrap a raw event-stream body with [`EventStreamRewriter`].
///
/// Pull-based: a chunk is read from `input` only when the consumer polls.
/// Upstream errors are forwarded in place and do not end the stream.
pub fn rewrite_event_stream(input: BoxStream<'static, Bytes>) -> BoxStream<'static, Bytes> {
    let stream = stream::unfold(
        (input, EventStreamRewriter::new()),
        |(mut input, mut rewriter)| async move {
            loop {
                match input.next().await {
                    Some(Ok(chunk)) => {
                        let out = rewriter.push(&chunk);
                        if out.is_empty() {
                            continue;
                        }
                        return Some((Ok(Bytes::from(out)), (input, rewriter)));
                    }
                    Some(Err(e)) => return Some((Err(e), (input, rewriter))),
                    None => {
                        rewriter.finish();
                        return None;
                    }
                }
            }
        },
    );
    Box::pin(stream)
}

/// Rewrite one complete line (terminator included) into `out`.
fn rewrite_line(line: &[u8], out: &mut Vec<u8>) {
    let (body, terminator) = split_terminator(line);

    let Some(value) = parse_data_payload(body) else {
        out.extend_from_slice(line);
        return;
    };
    let Value::Object(mut event) = value else {
        out.extend_from_slice(line);
        return;
    };

    if is_usage_only(&event) {
        return;
    }
    if rename_reasoning(&mut event) {
        match serde_json::to_vec(&Value::Object(event)) {
            Ok(json) => {
                out.extend_from_slice(b"data: ");
                out.extend_from_slice(&json);
                out.extend_from_slice(terminator);
            }
            Err(_) => out.extend_from_slice(line),
        }
        return;
    }
    out.extend_from_slice(line);
}

fn split_terminator(line: &[u8]) -> (&[u8], &[u8]) {
    if line.ends_with(b"\r\n") {
        line.split_at(line.len() - 2)
    } else if line.ends_with(b"\n") {
        line.split_at(line.len() - 1)
    } else {
        (line, &[])
    }
}

/// JSON payload of a `data:` line; `None` for anything else, including
/// the `[DONE]` terminator and payloads that fail to parse.
fn parse_data_payload(body: &[u8]) -> Option<Value> {
    let text = std::str::from_utf8(body).ok()?.trim();
    let data = text.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    serde_json::from_str(data).ok()
}

fn is_usage_only(event: &Map<String, Value>) -> bool {
    truthy(event.get("usage")) && !truthy(event.get("choices"))
}

/// Move `choices[0].delta.reasoning` to `content` when content is empty.
/// The key keeps its position; returns whether anything changed.
fn rename_reasoning(event: &mut Map<String, Value>) -> bool {
    let Some(delta) = event
        .get_mut("choices")
        .and_then(|c| c.get_mut(0))
        .and_then(|c| c.get_mut("delta"))
        .and_then(Value::as_object_mut)
    else {
        return false;
    };
    if !truthy(delta.get("reasoning")) || truthy(delta.get("content")) {
        return false;
    }

    // Rebuild so `content` takes the slot `reasoning` occupied.
    let entries = std::mem::take(delta);
    for (key, value) in entries {
        match key.as_str() {
            "reasoning" => {
                delta.insert("content".into(), value);
            }
            "content" => {}
            _ => {
                delta.insert(key, value);
            }
        }
    }
    true
}

/// JavaScript-style truthiness of an optional JSON value.
fn truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
