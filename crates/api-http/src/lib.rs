//! HTTP API Layer
//!
//! Maps the queue's admission results directly onto wire responses:
//! 201 accepted, 400 invalid, 429 full or throttled, 503 draining/stopped.
//! The status endpoint is always 200; processor unhealthiness is reported
//! in the payload, never via an HTTP error.

pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use server::{build_router, serve, HttpServerConfig};
pub use types::AppState;
