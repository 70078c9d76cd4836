//! Relay service
//!
//! The proxy pipeline: route table, request adapter, concurrency gates and
//! error sanitizing around a single upstream call.

pub mod gate;
pub mod gateway;
pub mod request_adapter;
pub mod routes;
pub mod sanitizer;

pub use gate::CapabilityGates;
pub use gateway::{GatewayService, GatewayTrait};
pub use request_adapter::{extract_request, parse_query};
pub use routes::{default_routes, RouteTable, RouteTableError, STATS_PATH};
pub use sanitizer::ErrorSanitizer;
