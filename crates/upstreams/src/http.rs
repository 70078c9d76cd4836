//! Shared outbound HTTP plumbing
//!
//! One `reqwest::Client` is built at startup and cloned into every caller,
//! so all upstreams share the same connection pool.

use bytes::{Bytes, BytesMut};
use relay_types::{UpstreamError, UpstreamResult};
use reqwest::{
	header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT},
	Client, RequestBuilder, Response,
};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Settings for the shared outbound client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
	pub request_timeout_ms: u64,
	pub connect_timeout_ms: u64,
	/// Connections kept idle per upstream host
	pub max_idle_per_host: usize,
	pub user_agent: String,
}

impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			request_timeout_ms: 60_000,
			connect_timeout_ms: 10_000,
			max_idle_per_host: 10,
			user_agent: format!("relay-gateway/{}", env!("CARGO_PKG_VERSION")),
		}
	}
}

impl ClientConfig {
	pub fn with_timeouts(mut self, request_timeout_ms: u64, connect_timeout_ms: u64) -> Self {
		self.request_timeout_ms = request_timeout_ms;
		self.connect_timeout_ms = connect_timeout_ms;
		self
	}
}

/// Build the process-wide outbound client
pub fn build_client(config: &ClientConfig) -> UpstreamResult<Client> {
	let mut headers = HeaderMap::new();
	headers.insert(ACCEPT, HeaderValue::from_static("application/json, image/*;q=0.9, */*;q=0.8"));

	let user_agent = HeaderValue::from_str(&config.user_agent)
		.unwrap_or_else(|_| HeaderValue::from_static("relay-gateway"));
	headers.insert(USER_AGENT, user_agent);

	Client::builder()
		.default_headers(headers)
		.timeout(Duration::from_millis(config.request_timeout_ms))
		.connect_timeout(Duration::from_millis(config.connect_timeout_ms))
		.pool_max_idle_per_host(config.max_idle_per_host)
		.build()
		.map_err(UpstreamError::HttpError)
}

/// Turn a non-2xx response into an error carrying the upstream's message
pub async fn ensure_success(response: Response) -> UpstreamResult<Response> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	debug!("Upstream answered {} with {} bytes", status, body.len());
	Err(UpstreamError::from_status(status.as_u16(), &body))
}

/// Send a request and decode the JSON body into `T`
///
/// Decoding failures are reported as malformed upstream responses.
pub async fn send_json<T>(request: RequestBuilder) -> UpstreamResult<T>
where
	T: DeserializeOwned,
{
	let response = ensure_success(request.send().await?).await?;
	let body = response.bytes().await?;
	debug!("Upstream responded successfully with {} bytes", body.len());

	serde_json::from_slice(&body).map_err(|e| UpstreamError::InvalidResponse {
		reason: format!("unexpected response shape: {}", e),
	})
}

/// Read a response body, failing once it grows past `max_bytes`
///
/// A declared `Content-Length` over the limit is rejected before any chunk is read.
pub async fn read_body_limited(mut response: Response, max_bytes: usize) -> UpstreamResult<Bytes> {
	let too_large = || UpstreamError::BodyTooLarge { limit: max_bytes };

	if response.content_length().is_some_and(|len| len > max_bytes as u64) {
		return Err(too_large());
	}

	let mut body = BytesMut::new();
	while let Some(chunk) = response.chunk().await? {
		if body.len() + chunk.len() > max_bytes {
			return Err(too_large());
		}
		body.extend_from_slice(&chunk);
	}
	Ok(body.freeze())
}

/// Send a request and return the raw body with its declared media type
///
/// Bodies larger than `max_bytes` are rejected with `BodyTooLarge`.
pub async fn send_bytes(request: RequestBuilder, max_bytes: usize) -> UpstreamResult<(String, Bytes)> {
	let response = ensure_success(request.send().await?).await?;
	let media_type = response
		.headers()
		.get(CONTENT_TYPE)
		.and_then(|v| v.to_str().ok())
		.unwrap_or("application/octet-stream")
		.to_string();

	let bytes = read_body_limited(response, max_bytes).await?;
	if bytes.is_empty() {
		return Err(UpstreamError::invalid_response("upstream returned an empty body"));
	}
	Ok((media_type, bytes))
}
