//! Authenticated HTTP gateway for the Huddle REST API.
//!
//! Every request passes through the same pipeline: a connectivity check, bearer-token
//! and correlation-id attachment, and response classification. A 401 triggers a single
//! shared token refresh and a one-time replay of each affected request.

pub mod api;
pub mod classify;
mod client;
pub mod config;
pub mod connectivity;
pub mod errors;
pub mod ledger;
pub mod refresh;
pub mod request_context;
pub mod status;
pub mod telemetry;
pub mod token;
pub mod types;

pub use client::{Gateway, GatewayBuilder, GatewayResponse, RequestOptions};
pub use config::Config;
pub use errors::Error;

#[cfg(test)]
mod tests;
