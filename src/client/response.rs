use crate::{BoxStream, Result};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::fmt;

/// A successful upstream response.
///
/// For event streams `body` is already rewritten; otherwise it is the raw body.
/// Either way it stops with one error item if the call is cancelled or times out.
pub struct DispatchResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub is_event_stream: bool,
    pub body: BoxStream<'static, Bytes>,
    pub request_id: String,
}

impl DispatchResponse {
    pub fn into_stream(self) -> BoxStream<'static, Bytes> {
        self.body
    }

    /// Collect the whole body.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.body.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    pub async fn json(self) -> Result<Value> {
        let bytes = self.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl fmt::Debug for DispatchResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchResponse")
            .field("status", &self.status)
            .field("is_event_stream", &self.is_event_stream)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}
