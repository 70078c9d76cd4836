//! Core upstream caller trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::{Capability, UpstreamInfo, UpstreamResult};
use crate::{ProxyRequest, UpstreamPayload};

/// Core trait for upstream caller implementations
///
/// A caller performs exactly one outbound call per invocation (a network
/// request or a local library call) and never retries. Custom upstreams,
/// including test doubles, are added by implementing this trait and
/// registering the caller under its id.
#[async_trait]
pub trait UpstreamCaller: Send + Sync + Debug {
	/// Static description; the only required accessor
	fn upstream_info(&self) -> &UpstreamInfo;

	/// Registry id (referenced by routes)
	fn id(&self) -> &str {
		&self.upstream_info().upstream_id
	}

	/// Capability this caller belongs to
	fn capability(&self) -> Capability {
		self.upstream_info().capability
	}

	/// Human-readable name
	fn name(&self) -> &str {
		&self.upstream_info().name
	}

	/// Perform the outbound call for a validated request
	///
	/// Route bindings (e.g. a pinned model) are available through
	/// [`ProxyRequest::arg`] alongside the client's parameters.
	async fn call(&self, request: &ProxyRequest) -> UpstreamResult<UpstreamPayload>;
}
