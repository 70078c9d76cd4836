//! Test doubles for upstream callers
//!
//! `StubUpstream` stands in for any real upstream: it counts calls, can
//! return a fixed payload or a fixed failure, and can be slowed down to
//! exercise concurrency gates.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
	Capability, JsonPayload, ProxyRequest, UpstreamCaller, UpstreamError, UpstreamInfo,
	UpstreamPayload, UpstreamResult,
};

/// How the stub answers
#[derive(Debug, Clone)]
pub enum StubBehavior {
	/// Return this payload
	Respond(UpstreamPayload),
	/// Echo every argument (params and bindings) back as a JSON object
	Echo,
	/// Fail with an upstream error carrying this message
	Fail(String),
	/// Fail with a malformed-response error carrying this reason
	Malformed(String),
}

/// Deterministic upstream with call tracking
#[derive(Debug, Clone)]
pub struct StubUpstream {
	info: UpstreamInfo,
	behavior: StubBehavior,
	delay: Duration,
	calls: Arc<AtomicUsize>,
	in_flight: Arc<AtomicUsize>,
	max_in_flight: Arc<AtomicUsize>,
	last_request: Arc<Mutex<Option<ProxyRequest>>>,
}

impl StubUpstream {
	pub fn new(id: &str, capability: Capability, behavior: StubBehavior) -> Self {
		Self {
			info: UpstreamInfo::new(id, format!("{} stub", id), capability, "stub://local"),
			behavior,
			delay: Duration::ZERO,
			calls: Arc::new(AtomicUsize::new(0)),
			in_flight: Arc::new(AtomicUsize::new(0)),
			max_in_flight: Arc::new(AtomicUsize::new(0)),
			last_request: Arc::new(Mutex::new(None)),
		}
	}

	/// Stub answering with a single JSON field
	pub fn json(id: &str, capability: Capability, key: &str, value: &str) -> Self {
		Self::new(
			id,
			capability,
			StubBehavior::Respond(UpstreamPayload::field(key, value)),
		)
	}

	pub fn echo(id: &str, capability: Capability) -> Self {
		Self::new(id, capability, StubBehavior::Echo)
	}

	pub fn failing(id: &str, capability: Capability, message: &str) -> Self {
		Self::new(id, capability, StubBehavior::Fail(message.to_string()))
	}

	pub fn binary(id: &str, capability: Capability, media_type: &str, bytes: &[u8]) -> Self {
		Self::new(
			id,
			capability,
			StubBehavior::Respond(UpstreamPayload::binary(media_type, bytes.to_vec())),
		)
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay = delay;
		self
	}

	/// Number of completed or in-progress calls
	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	/// Highest number of calls observed running at the same time
	pub fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}

	pub fn last_request(&self) -> Option<ProxyRequest> {
		self.last_request
			.lock()
			.ok()
			.and_then(|guard| guard.clone())
	}
}

#[async_trait]
impl UpstreamCaller for StubUpstream {
	fn upstream_info(&self) -> &UpstreamInfo {
		&self.info
	}

	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
		self.max_in_flight.fetch_max(current, Ordering::SeqCst);
		if let Ok(mut last) = self.last_request.lock() {
			*last = Some(request.clone());
		}

		if !self.delay.is_zero() {
			tokio::time::sleep(self.delay).await;
		}
		self.in_flight.fetch_sub(1, Ordering::SeqCst);

		match &self.behavior {
			StubBehavior::Respond(payload) => Ok(payload.clone()),
			StubBehavior::Echo => {
				let mut map = JsonPayload::new();
				for (key, value) in request.params.iter().chain(request.bindings.iter()) {
					map.insert(key.clone(), value.clone().into());
				}
				Ok(UpstreamPayload::Json(map))
			},
			StubBehavior::Fail(message) => Err(UpstreamError::HttpStatusError {
				status_code: 500,
				message: message.clone(),
			}),
			StubBehavior::Malformed(reason) => Err(UpstreamError::invalid_response(reason.clone())),
		}
	}
}
