//! Relay API
//!
//! Axum router, handlers and response envelope for the relay gateway.

pub mod envelope;
pub mod handlers;
pub mod rate_limit;
pub mod router;
pub mod security;
pub mod state;

pub use envelope::EnvelopeBuilder;
pub use rate_limit::{with_rate_limit, RequestRateLimiter};
pub use router::create_router;
pub use state::AppState;
