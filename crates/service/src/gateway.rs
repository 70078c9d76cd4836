//! Gateway pipeline: route lookup, request adapter, gate, upstream call

use async_trait::async_trait;
use relay_types::{
	GatewayError, ProxyRequest, ProxyResult, ResponseKind, RouteSpec, UpstreamCaller,
	UpstreamPayload,
};
use relay_upstreams::UpstreamRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::gate::CapabilityGates;
use crate::request_adapter::{extract_request, parse_query};
use crate::routes::{RouteTable, RouteTableError};
use crate::sanitizer::ErrorSanitizer;

/// Entry point used by the HTTP layer
#[async_trait]
pub trait GatewayTrait: Send + Sync {
	/// Resolve `path`, validate `raw_query` and perform the upstream call
	async fn dispatch(&self, path: &str, raw_query: Option<&str>) -> ProxyResult;

	/// Registered routes, in registration order
	fn routes(&self) -> Vec<RouteSpec>;
}

/// The generic proxy pipeline
///
/// Upstream calls run in a detached task: if the client goes away the call
/// still completes and its permit is released normally.
#[derive(Debug, Clone)]
pub struct GatewayService {
	routes: Arc<RouteTable>,
	registry: Arc<UpstreamRegistry>,
	gates: CapabilityGates,
	sanitizer: Arc<ErrorSanitizer>,
}

impl GatewayService {
	/// Build the service; fails if a route points at an unregistered upstream
	pub fn new(
		routes: RouteTable,
		registry: UpstreamRegistry,
		gates: CapabilityGates,
		sanitizer: ErrorSanitizer,
	) -> Result<Self, RouteTableError> {
		routes.validate(&registry)?;
		info!(
			"Gateway ready with {} routes over {} upstreams",
			routes.len(),
			registry.len()
		);
		Ok(Self {
			routes: Arc::new(routes),
			registry: Arc::new(registry),
			gates,
			sanitizer: Arc::new(sanitizer),
		})
	}

	pub fn route_table(&self) -> &RouteTable {
		&self.routes
	}

	pub fn registry(&self) -> &UpstreamRegistry {
		&self.registry
	}

	async fn call_upstream(
		&self,
		route: &RouteSpec,
		caller: Arc<dyn UpstreamCaller>,
		request: ProxyRequest,
	) -> Result<UpstreamPayload, GatewayError> {
		let gates = self.gates.clone();
		let task = tokio::spawn(async move {
			let _permit = gates
				.acquire(caller.capability())
				.await
				.map_err(|e| GatewayError::upstream(format!("Concurrency gate closed: {}", e)))?;
			caller.call(&request).await.map_err(GatewayError::from)
		});

		let payload = task
			.await
			.map_err(|e| GatewayError::upstream(format!("Upstream task failed: {}", e)))??;

		conform_payload(&route.response, payload)
	}
}

/// Check the payload against the route's declared kind, pinning the media type if set
fn conform_payload(kind: &ResponseKind, payload: UpstreamPayload) -> Result<UpstreamPayload, GatewayError> {
	match (kind, payload) {
		(ResponseKind::Json, payload @ UpstreamPayload::Json(_)) => Ok(payload),
		(ResponseKind::Binary { media_type }, UpstreamPayload::Binary { media_type: produced, bytes }) => {
			if bytes.is_empty() {
				return Err(GatewayError::UpstreamMalformedResponse {
					reason: "empty binary payload".to_string(),
				});
			}
			Ok(UpstreamPayload::Binary {
				media_type: media_type.clone().unwrap_or(produced),
				bytes,
			})
		},
		(ResponseKind::Json, UpstreamPayload::Binary { media_type, .. }) => {
			Err(GatewayError::UpstreamMalformedResponse {
				reason: format!("expected JSON, got {}", media_type),
			})
		},
		(ResponseKind::Binary { .. }, UpstreamPayload::Json(_)) => {
			Err(GatewayError::UpstreamMalformedResponse {
				reason: "expected binary content, got JSON".to_string(),
			})
		},
	}
}

#[async_trait]
impl GatewayTrait for GatewayService {
	async fn dispatch(&self, path: &str, raw_query: Option<&str>) -> ProxyResult {
		let Some(route) = self.routes.lookup(path) else {
			debug!("No route for {}", path);
			return ProxyResult::Failure(GatewayError::NotFound);
		};

		let request = match extract_request(route, &parse_query(raw_query)) {
			Ok(request) => request,
			Err(err) => {
				debug!("Rejected {}: {}", path, err);
				return ProxyResult::Failure(err);
			},
		};

		let Some(caller) = self.registry.get(&route.upstream) else {
			warn!("Route {} has no upstream '{}'", path, route.upstream);
			return ProxyResult::Failure(GatewayError::upstream(format!(
				"Upstream '{}' is not available",
				route.upstream
			)));
		};

		let started = Instant::now();
		let upstream_id = caller.id().to_string();
		match self.call_upstream(route, caller, request).await {
			Ok(payload) => {
				debug!(
					"{} via {} succeeded in {}ms",
					path,
					upstream_id,
					started.elapsed().as_millis()
				);
				ProxyResult::Success(payload)
			},
			Err(err) => {
				let err = err.map_message(|message| self.sanitizer.sanitize(&message));
				warn!(
					"{} via {} failed after {}ms: {}",
					path,
					upstream_id,
					started.elapsed().as_millis(),
					err
				);
				ProxyResult::Failure(err)
			},
		}
	}

	fn routes(&self) -> Vec<RouteSpec> {
		self.routes.routes().into_iter().cloned().collect()
	}
}
