//! Relay Gateway Server
//!
//! Main entry point for the gateway server

use relay_gateway::GatewayBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	GatewayBuilder::new().start_server().await
}
