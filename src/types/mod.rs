//! # Types Module
//!
//! Wire-level data types shared by the sanitizer and the dispatcher.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat message with role, content and tool calls |
//! | [`MessageRole`] | Message role (system, user, assistant, tool) |
//! | [`ContentPart`] | Typed content part (text, image, file) |
//! | [`ToolCall`] | Tool call directive on an assistant turn |
//! | [`ToolDefinition`] | Tool definition sent with a request |
//!
//! ## Example
//!
//! ```rust
//! use ai_provider_runtime::types::{ContentPart, Message, ToolCall};
//!
//! let user = Message::user_parts(vec![
//!     ContentPart::text("What is in this picture?"),
//!     ContentPart::image_url("https://example.com/cat.png"),
//! ]);
//! let assistant = Message::assistant_tool_calls(
//!     "",
//!     vec![ToolCall::function("call_1", "describe", "{}")],
//! );
//! assert!(assistant.has_tool_calls());
//! # let _ = user;
//! ```

pub mod message;
pub mod tool;

pub use message::{ContentPart, FilePart, ImageUrl, Message, MessageContent, MessageRole};
pub use tool::{FunctionCall, FunctionDefinition, ToolCall, ToolDefinition};
