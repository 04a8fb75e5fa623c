//! Message-level normalization before a request is serialized.

use crate::model::{ModelDescriptor, Modality};
use crate::types::message::data_uri_media_type;
use crate::types::{ContentPart, Message, MessageContent, MessageRole};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

pub const EMPTY_IMAGE_NOTICE: &str =
    "ERROR: Image file is empty or corrupted. Please provide a valid image.";

static DATA_URI: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^data:([^;]+);base64,(.*)$").unwrap());

/// Notice substituted for an attachment the model cannot read.
pub fn unsupported_notice(filename: Option<&str>, modality: Modality) -> String {
    let name = match filename {
        Some(f) if !f.is_empty() => format!("\"{}\"", f),
        _ => modality.to_string(),
    };
    format!(
        "ERROR: Cannot read {} (this model does not support {} input). Inform the user.",
        name, modality
    )
}

/// Normalize a message list for `model`. The input is not modified.
///
/// - An assistant turn that carries tool calls and whose text is blank gets
///   `content: None`, which goes out as JSON `null`.
/// - In user turns, an image whose base64 payload is empty, and any attachment
///   whose modality the model does not accept, is replaced by a text notice.
///
/// Applying this twice gives the same result as applying it once.
pub fn sanitize_messages(messages: &[Message], model: &ModelDescriptor) -> Vec<Message> {
    messages
        .iter()
        .map(|msg| match msg.role {
            MessageRole::Assistant if has_blank_tool_call_content(msg) => Message {
                content: None,
                ..msg.clone()
            },
            MessageRole::User => match &msg.content {
                Some(MessageContent::Parts(parts)) => Message {
                    content: Some(MessageContent::Parts(
                        parts.iter().map(|p| sanitize_part(p, model).into_owned()).collect(),
                    )),
                    ..msg.clone()
                },
                _ => msg.clone(),
            },
            _ => msg.clone(),
        })
        .collect()
}

fn has_blank_tool_call_content(msg: &Message) -> bool {
    msg.has_tool_calls()
        && matches!(&msg.content, Some(MessageContent::Text(t)) if t.trim().is_empty())
}

fn sanitize_part<'a>(part: &'a ContentPart, model: &ModelDescriptor) -> Cow<'a, ContentPart> {
    let (media_type, filename) = match part {
        ContentPart::Text { .. } => return Cow::Borrowed(part),
        ContentPart::Image { image_url } => {
            if is_empty_base64_image(&image_url.url) {
                return Cow::Owned(ContentPart::text(EMPTY_IMAGE_NOTICE));
            }
            (data_uri_media_type(&image_url.url), None)
        }
        ContentPart::File { file } => (file.media_type(), file.filename.as_deref()),
    };

    let Some(modality) = media_type.and_then(Modality::from_media_type) else {
        return Cow::Borrowed(part);
    };
    if model.capabilities.input.supports(modality) {
        return Cow::Borrowed(part);
    }
    tracing::debug!(
        model = %model.full_id(),
        modality = %modality,
        "replacing unsupported attachment with notice"
    );
    Cow::Owned(ContentPart::text(unsupported_notice(filename, modality)))
}

fn is_empty_base64_image(url: &str) -> bool {
    DATA_URI
        .captures(url)
        .and_then(|caps| caps.get(2))
        .map(|payload| payload.as_str().is_empty())
        .unwrap_or(false)
}
