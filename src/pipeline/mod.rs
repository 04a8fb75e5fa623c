//! # Streaming pipeline
//!
//! Byte-level stage applied to event-stream response bodies before they reach
//! the caller.
//!
//! ```text
//! HTTP body chunks → EventStreamRewriter → caller
//!       │                   │
//!   arbitrary splits    complete lines only:
//!                       drop usage-only events,
//!                       rename reasoning → content
//! ```
//!
//! | Item | Description |
//! |------|-------------|
//! | [`EventStreamRewriter`] | Incremental line rewriter with a bounded pending buffer |
//! | [`rewrite_event_stream`] | Pull-based stream adapter around the rewriter |
//!
//! ## Example
//!
//! ```rust
//! use ai_provider_runtime::pipeline::EventStreamRewriter;
//!
//! let mut rewriter = EventStreamRewriter::new();
//! let mut out = rewriter.push(b"data: {\"choices\":[{\"delta\":{\"reaso");
//! out.extend(rewriter.push(b"ning\":\"hi\"}}]}\n"));
//! assert_eq!(out, b"data: {\"choices\":[{\"delta\":{\"content\":\"hi\"}}]}\n");
//! ```

pub mod rewrite;

pub use rewrite::{rewrite_event_stream, EventStreamRewriter};
