//! extrelay-server - HTTP surface of the extension transformation relay
//!
//! Exposes three routes:
//!
//! - `POST /extension/transformation/trigger/{extension_id}`
//! - `POST /extension/transformation/callback/{token}`
//! - `GET /public/hc`
//!
//! and maps relay failures onto `{"response": ..., "code": ...}` bodies.

/// Relay configuration loading and validation
pub mod config;

/// Error to HTTP response mapping
pub mod error;

/// HTTP handlers and router
pub mod handlers;

/// Server instance management
pub mod server;

pub use config::RelayConfig;
pub use error::{ErrorResponse, HandlerResult};
pub use handlers::{AppState, create_router};
pub use server::{RelayServer, RunningRelayServer, shutdown_signal};
