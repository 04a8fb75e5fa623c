//! Request dispatch.
//!
//! [`Dispatcher`] resolves a transport for the model, sanitizes the payload,
//! sends it with merged cancellation and, for event streams, rewrites the
//! body on the way back. Implementation details are split into submodules
//! under `src/client/`.

mod cancel;
mod dispatcher;
pub mod error_classification;
mod options;
mod response;

pub use dispatcher::Dispatcher;
pub use options::DispatchOptions;
pub use response::DispatchResponse;
