//! Transport layer: fingerprints, the per-fingerprint client cache and the
//! reqwest-backed HTTP client.

pub mod cache;
pub mod fingerprint;
pub mod http;

pub use cache::TransportCache;
pub use fingerprint::Fingerprint;
pub use http::{HttpSettings, HttpTransport, TransportError};
