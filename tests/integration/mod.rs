//! Integration tests with mock HTTP server

pub mod mock_server;
pub mod credentials;
pub mod dispatch;
pub mod error_handling;
pub mod streaming;
