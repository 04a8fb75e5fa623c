//! # Provider resolution
//!
//! Turns the static catalog into the set of usable providers. Credentials are
//! taken, in order, from the provider's environment variables, the credential
//! store (API-key entries only) and `provider.<id>.options.apiKey` in the
//! configuration. Option overrides from the configuration are deep-merged over
//! the catalog defaults. Providers without a credential are left out.
//!
//! Resolution runs once per [`ProviderState`] generation, on first access.

mod info;
mod state;

pub use info::{ProviderInfo, ProviderSource};
pub use state::{effective_options, parse_model, ProviderState, Providers};
