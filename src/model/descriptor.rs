//! Model descriptor records

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Identifies one model of one provider, plus what it can do.
///
/// Field names follow the JSON records the catalog is published in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub id: String,
    #[serde(rename = "providerID")]
    pub provider_id: String,
    pub api: ApiInfo,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    pub capabilities: Capabilities,
    #[serde(default)]
    pub cost: Cost,
    pub limit: Limit,
    #[serde(default)]
    pub status: ModelStatus,
    #[serde(default)]
    pub options: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<BTreeMap<String, serde_json::Map<String, serde_json::Value>>>,
}

impl ModelDescriptor {
    /// `provider/model` form used in configuration and suggestions.
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.provider_id, self.id)
    }
}

/// Upstream endpoint identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    /// Model id as the upstream API knows it
    pub id: String,
    /// Endpoint base URL
    pub url: String,
    /// Implementation tag of the client library speaking to the endpoint
    pub npm: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub temperature: bool,
    pub reasoning: bool,
    pub attachment: bool,
    pub toolcall: bool,
    pub input: Modalities,
    pub output: Modalities,
    #[serde(default)]
    pub interleaved: Interleaved,
}

/// Whether reasoning is interleaved with output, and under which field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interleaved {
    Enabled(bool),
    Field { field: String },
}

impl Default for Interleaved {
    fn default() -> Self {
        Interleaved::Enabled(false)
    }
}

/// Per-modality support flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modalities {
    pub text: bool,
    pub audio: bool,
    pub image: bool,
    pub video: bool,
    pub pdf: bool,
}

impl Modalities {
    pub fn text_only() -> Self {
        Self {
            text: true,
            ..Self::default()
        }
    }

    pub fn supports(&self, modality: Modality) -> bool {
        match modality {
            Modality::Text => self.text,
            Modality::Audio => self.audio,
            Modality::Image => self.image,
            Modality::Video => self.video,
            Modality::Pdf => self.pdf,
        }
    }
}

/// A content kind a model may accept or produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    Text,
    Audio,
    Image,
    Video,
    Pdf,
}

impl Modality {
    /// Classify a media type. Text is never derived from a media type: only
    /// attachment kinds are.
    pub fn from_media_type(mime: &str) -> Option<Self> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(Modality::Image)
        } else if mime.starts_with("audio/") {
            Some(Modality::Audio)
        } else if mime.starts_with("video/") {
            Some(Modality::Video)
        } else if mime == "application/pdf" {
            Some(Modality::Pdf)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Audio => "audio",
            Modality::Image => "image",
            Modality::Video => "video",
            Modality::Pdf => "pdf",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Price per million tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cost {
    pub input: f64,
    pub output: f64,
    #[serde(default)]
    pub cache: CacheCost,
    #[serde(
        default,
        rename = "experimentalOver200K",
        skip_serializing_if = "Option::is_none"
    )]
    pub experimental_over_200k: Option<Box<Cost>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheCost {
    pub read: f64,
    pub write: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limit {
    pub context: u64,
    pub output: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Alpha,
    Beta,
    Deprecated,
    #[default]
    Active,
}

/// Output token budget: the model limit capped by the global one.
/// A zero model limit means "unknown" and yields the global limit.
pub fn max_output_tokens(model_limit: u64, global_limit: u64) -> u64 {
    let limit = if model_limit == 0 {
        global_limit
    } else {
        model_limit
    };
    limit.min(global_limit)
}
