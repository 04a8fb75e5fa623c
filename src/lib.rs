//! # ai-provider-runtime
//!
//! Provider transport runtime for OpenAI-compatible chat endpoints: resolves a
//! logical model reference into a cached HTTP transport, normalizes outgoing
//! payloads and rewrites incremental event-stream responses into the shape
//! downstream consumers expect.
//!
//! ## Overview
//!
//! - **Provider resolution**: credentials from environment, credential store
//!   or configuration (in that order), option overrides deep-merged over the
//!   built-in catalog
//! - **Transport cache**: one client per effective configuration, keyed by a
//!   key-order independent fingerprint and built at most once
//! - **Payload sanitizing**: blank tool-call turns become `content: null`,
//!   unreadable attachments become text notices
//! - **Stream rewriting**: usage-only events dropped, `reasoning` deltas
//!   renamed to `content`, everything else forwarded byte for byte
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_provider_runtime::{DispatchOptions, Dispatcher, Message};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> ai_provider_runtime::Result<()> {
//!     let dispatcher = Dispatcher::from_env()?;
//!     let (provider_id, model_id) = dispatcher.default_model().await?;
//!     let model = dispatcher.resolve_model(&provider_id, &model_id).await?;
//!
//!     let response = dispatcher
//!         .dispatch(&model, &[Message::user("Hello!")], DispatchOptions::streaming())
//!         .await?;
//!     let mut body = response.into_stream();
//!     while let Some(chunk) = body.next().await {
//!         print!("{}", String::from_utf8_lossy(&chunk?));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`provider`] | Provider state, credential resolution, model lookup |
//! | [`client`] | Request dispatcher |
//! | [`transport`] | Fingerprints, transport cache, HTTP client |
//! | [`transform`] | Outgoing payload sanitizing |
//! | [`pipeline`] | Event-stream rewriting |
//! | [`model`] | Model descriptors and the built-in catalog |
//! | [`auth`] | Credential stores |
//! | [`config`] | Configuration and environment |
//! | [`types`] | Wire types (messages, tools) |

pub mod auth;
pub mod client;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod provider;
pub mod transform;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{DispatchOptions, DispatchResponse, Dispatcher};
pub use model::ModelDescriptor;
pub use provider::{ProviderInfo, ProviderState};
pub use types::{
    message::{ContentPart, Message, MessageRole},
    tool::{ToolCall, ToolDefinition},
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A specialized Result for stream items
pub type PipeResult<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `PipeResult<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = PipeResult<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
