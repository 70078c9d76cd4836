use std::sync::Arc;
use std::time::Instant;

use relay_service::GatewayTrait;

use crate::envelope::EnvelopeBuilder;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
	pub gateway: Arc<dyn GatewayTrait>,
	pub envelope: Arc<EnvelopeBuilder>,
	pub started_at: Instant,
}

impl AppState {
	pub fn new(gateway: Arc<dyn GatewayTrait>, envelope: EnvelopeBuilder) -> Self {
		Self {
			gateway,
			envelope: Arc::new(envelope),
			started_at: Instant::now(),
		}
	}
}
