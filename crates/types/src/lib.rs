//! Relay Types
//!
//! Shared models and traits for the relay gateway.
//! This crate contains the domain model organized by concern: requests,
//! routes, upstream callers and the results flowing between them.

pub mod errors;
pub mod models;
pub mod requests;
pub mod results;
pub mod routes;
pub mod test_utils;
pub mod upstreams;

// Re-export chrono and serde_json for convenience
pub use chrono;
pub use serde_json;

pub use errors::{ErrorKind, GatewayError, GatewayResult};
pub use models::SecretString;
pub use requests::{ProxyRequest, QueryParams};
pub use results::{JsonPayload, ProxyResult, UpstreamPayload};
pub use routes::{ParamSchema, ParamSpec, ResponseKind, RouteSpec};
pub use upstreams::{
	Capability, UpstreamCaller, UpstreamError, UpstreamInfo, UpstreamResult, UpstreamRuntimeConfig,
	DEFAULT_MAX_BODY_BYTES,
};
