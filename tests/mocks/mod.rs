//! Shared mocks and fixtures for integration tests

pub mod configs;
pub mod test_server;
pub mod upstreams;

#[allow(unused_imports)]
pub use configs::MockConfigs;
#[allow(unused_imports)]
pub use test_server::TestServer;
#[allow(unused_imports)]
pub use upstreams::MockUpstreams;
