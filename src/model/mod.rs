//! Model metadata: descriptors, capability flags and the built-in catalog.

pub mod catalog;
pub mod descriptor;

pub use catalog::{builtin_providers, CatalogProvider};
pub use descriptor::{
    max_output_tokens, ApiInfo, Capabilities, Cost, Interleaved, Limit, Modalities, Modality,
    ModelDescriptor, ModelStatus,
};
