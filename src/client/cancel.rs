//! Merged cancellation: caller token plus optional deadline.

use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{stream, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Fires when either the caller's token is cancelled or the deadline passes.
///
/// The deadline is fixed when the scope is created, so it bounds the whole
/// exchange: connect, response headers and every body chunk.
#[derive(Debug, Clone)]
pub(crate) struct CancelScope {
    token: Option<CancellationToken>,
    deadline: Option<(Instant, u64)>,
}

impl CancelScope {
    pub(crate) fn new(token: Option<CancellationToken>, timeout: Option<Duration>) -> Self {
        Self {
            token,
            deadline: timeout.map(|t| (Instant::now() + t, t.as_millis() as u64)),
        }
    }

    async fn fired(&self) -> Error {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some((at, _)) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = cancelled => Error::Cancelled,
            _ = expired => Error::Timeout {
                after_ms: self.deadline.map(|(_, ms)| ms).unwrap_or_default(),
            },
        }
    }

    /// Run `fut` unless the scope fires first; the losing future is dropped.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            err = self.fired() => Err(err),
            out = fut => out,
        }
    }

    /// Forward `inner` until it ends or the scope fires. On firing, one
    /// cancellation error is yielded and `inner` is dropped.
    pub(crate) fn guard_stream(self, inner: BoxStream<'static, Bytes>) -> BoxStream<'static, Bytes> {
        let stream = stream::unfold(Some((inner, self)), |state| async move {
            let (mut inner, scope) = state?;
            tokio::select! {
                biased;
                err = scope.fired() => Some((Err(err), None)),
                item = inner.next() => item.map(|item| (item, Some((inner, scope)))),
            }
        });
        Box::pin(stream)
    }
}
